//! Zeroizing wrapper for derived symmetric keys.

use zeroize::Zeroize;

use super::kdf::KEY_LEN;

/// A 32-byte symmetric key that automatically zeroes its memory when
/// dropped.
///
/// Both the master-password-derived key and the answer-derived key live
/// in this type, so neither can linger in memory after it is no longer
/// needed.  The unlocked session holds exactly one of these; locking
/// drops it.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Create a new `VaultKey` from raw derived bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to seal/open).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
