//! Random byte sources.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A source of cryptographically secure random bytes.
///
/// Used for master key generation, IVs and capability nonces.
pub trait RandomSource: Send {
    /// Fills `dest` with random bytes.
    fn fill(&mut self, dest: &mut [u8]);
}

impl<R: RngCore + CryptoRng + Send> RandomSource for R {
    fn fill(&mut self, dest: &mut [u8]) {
        self.fill_bytes(dest);
    }
}

/// The operating system's entropy source.
pub type OsRandom = OsRng;
