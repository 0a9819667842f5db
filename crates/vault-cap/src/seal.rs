//! Capability sealing.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use vault_common::constants::MAC_SIZE;
use vault_common::platform::RandomSource;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CapError, CapResult};
use crate::token::Capability;

type HmacSha256 = Hmac<Sha256>;

/// Size of the sealed field layout in bytes.
pub const SEAL_INPUT_SIZE: usize = 40;

/// The secret capabilities are sealed under.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; MAC_SIZE]);

impl SealKey {
    /// Draws a fresh key from `rng`.
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let mut key = [0u8; MAC_SIZE];
        rng.fill(&mut key);
        Self(key)
    }

    /// Computes the seal for `cap`'s current fields.
    pub fn seal(&self, cap: &Capability) -> CapResult<[u8; MAC_SIZE]> {
        let mut mac = self.mac()?;
        mac.update(&cap.seal_input());
        Ok(mac.finalize().into_bytes().into())
    }

    /// Recomputes the seal and compares it to `cap.seal` in constant time.
    ///
    /// Fails closed: any error is reported as an invalid seal.
    pub fn verify(&self, cap: &Capability) -> bool {
        match self.mac() {
            Ok(mut mac) => {
                mac.update(&cap.seal_input());
                mac.verify_slice(&cap.seal).is_ok()
            }
            Err(_) => false,
        }
    }

    fn mac(&self) -> CapResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.0)
            .map_err(|e| CapError::Crypto(format!("HMAC init failed: {e}")))
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{ObjectType, Rights};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vault_common::types::{CapId, ProcessId};

    fn sealed(key: &SealKey) -> Capability {
        let mut cap = Capability {
            cap_id: CapId::new(2),
            object_id: 7,
            object_type: ObjectType::Table,
            owner_pid: ProcessId::new(10),
            rights: Rights::READ,
            seal: [0; MAC_SIZE],
            parent: CapId::new(1),
            created_at: 0,
            expires_at: 0,
            revoked: false,
        };
        cap.seal = key.seal(&cap).unwrap();
        cap
    }

    #[test]
    fn test_seal_verifies() {
        let key = SealKey::generate(&mut StdRng::seed_from_u64(1));
        assert!(key.verify(&sealed(&key)));
    }

    #[test]
    fn test_any_sealed_field_mutation_detected() {
        let key = SealKey::generate(&mut StdRng::seed_from_u64(1));
        let base = sealed(&key);

        let mutations: Vec<Box<dyn Fn(&mut Capability)>> = vec![
            Box::new(|c| c.cap_id = CapId::new(3)),
            Box::new(|c| c.object_id = 8),
            Box::new(|c| c.owner_pid = ProcessId::new(11)),
            Box::new(|c| c.rights = Rights::ALL),
            Box::new(|c| c.object_type = ObjectType::System),
            Box::new(|c| c.parent = CapId::NONE),
            Box::new(|c| c.seal[31] ^= 1),
        ];
        for mutate in mutations {
            let mut cap = base.clone();
            mutate(&mut cap);
            assert!(!key.verify(&cap));
        }
    }

    #[test]
    fn test_other_key_rejects() {
        let a = SealKey::generate(&mut StdRng::seed_from_u64(1));
        let b = SealKey::generate(&mut StdRng::seed_from_u64(2));
        assert!(!b.verify(&sealed(&a)));
    }
}
