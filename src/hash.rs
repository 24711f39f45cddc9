//! Hash provider for cache key computation

use sha2::Digest;
use sha2::Sha256;

/// Computes a fixed-width digest over a byte buffer.
///
/// The key builder delegates collision behavior entirely to the provider.
/// Implementations must be pure: the same input always yields the same
/// digest, with no internal state.
pub trait HashProvider: Send + Sync {
    /// Hashes the given bytes into a fixed-width digest.
    fn digest(&self, bytes: &[u8]) -> Vec<u8>;
}

/// The default hash provider, backed by SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256HashProvider;

impl HashProvider for Sha256HashProvider {
    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        Sha256::digest(bytes).to_vec()
    }
}
