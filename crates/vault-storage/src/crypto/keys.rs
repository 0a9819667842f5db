//! Key material.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use vault_common::constants::{CIPHER_KEY_SIZE, MAC_SIZE, MASTER_KEY_SIZE};
use vault_common::platform::RandomSource;
use vault_common::types::TableId;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// The engine-wide master secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_SIZE]);

impl MasterKey {
    /// Draws a fresh master secret from `rng`.
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let mut bytes = [0u8; MASTER_KEY_SIZE];
        rng.fill(&mut bytes);
        Self(bytes)
    }

    /// Wraps existing key bytes.
    pub fn from_bytes(bytes: [u8; MASTER_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derives the key pair for `table_id`.
    pub fn derive(&self, table_id: TableId) -> StorageResult<TableKeys> {
        let enc_full = self.prf(b"AES", table_id)?;
        let mut enc = [0u8; CIPHER_KEY_SIZE];
        enc.copy_from_slice(&enc_full[..CIPHER_KEY_SIZE]);
        let mac = *self.prf(b"MAC", table_id)?;
        Ok(TableKeys { enc, mac })
    }

    fn prf(&self, label: &[u8], table_id: TableId) -> StorageResult<Zeroizing<[u8; MAC_SIZE]>> {
        let mut mac = HmacSha256::new_from_slice(&self.0)
            .map_err(|e| StorageError::Crypto(format!("HMAC init failed: {e}")))?;
        mac.update(label);
        mac.update(&table_id.as_u32().to_le_bytes());
        Ok(Zeroizing::new(mac.finalize().into_bytes().into()))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Cipher and MAC keys of one table.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TableKeys {
    pub(crate) enc: [u8; CIPHER_KEY_SIZE],
    pub(crate) mac: [u8; MAC_SIZE],
}

impl fmt::Debug for TableKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TableKeys(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_derivation_is_deterministic() {
        let master = MasterKey::from_bytes([7; MASTER_KEY_SIZE]);
        let a = master.derive(TableId::new(1)).unwrap();
        let b = master.derive(TableId::new(1)).unwrap();
        assert_eq!(a.enc, b.enc);
        assert_eq!(a.mac, b.mac);
    }

    #[test]
    fn test_derivation_separates_tables_and_labels() {
        let master = MasterKey::from_bytes([7; MASTER_KEY_SIZE]);
        let a = master.derive(TableId::new(1)).unwrap();
        let b = master.derive(TableId::new(2)).unwrap();
        assert_ne!(a.enc, b.enc);
        assert_ne!(a.mac, b.mac);
        assert_ne!(a.enc[..], a.mac[..CIPHER_KEY_SIZE]);
    }

    #[test]
    fn test_derivation_matches_hmac() {
        let master = MasterKey::from_bytes([1; MASTER_KEY_SIZE]);
        let keys = master.derive(TableId::new(5)).unwrap();

        let mut mac = HmacSha256::new_from_slice(&[1; MASTER_KEY_SIZE]).unwrap();
        mac.update(b"MAC");
        mac.update(&5u32.to_le_bytes());
        let expected: [u8; MAC_SIZE] = mac.finalize().into_bytes().into();
        assert_eq!(keys.mac, expected);
    }

    #[test]
    fn test_generate_uses_rng() {
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let a = MasterKey::generate(&mut rng_a);
        let b = MasterKey::generate(&mut rng_b);
        assert_ne!(a.0, b.0);
        assert_eq!(format!("{a:?}"), "MasterKey(..)");
    }
}
