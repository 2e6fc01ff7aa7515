//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! A deliberately slow, salted derivation so that brute-forcing the
//! master password (or the security answer) from a stolen vault is
//! computationally expensive.  The iteration count is configurable via
//! `KdfParams` (loaded from `.vaultkeeper.toml` or sensible defaults).

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::{Result, VaultKeeperError};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum allowed iteration count to prevent dangerously weak settings.
const MIN_ITERATIONS: u32 = 10_000;

/// Configurable PBKDF2 parameters.
///
/// Maps 1:1 to the `kdf_iterations` field in `Settings` so the CLI can
/// pass whatever the user configured in `.vaultkeeper.toml`.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations (default: 250 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: 250_000,
        }
    }
}

/// Derive a 32-byte key from a secret (master password or security
/// answer) and a 16-byte salt.
///
/// The same secret + salt + params will always produce the same key.
/// A salt of the wrong length is a caller bug, surfaced as a
/// derivation error rather than silently accepted.
pub fn derive_key(secret: &[u8], salt: &[u8], params: &KdfParams) -> Result<[u8; KEY_LEN]> {
    if salt.len() != SALT_LEN {
        return Err(VaultKeeperError::KeyDerivationFailed(format!(
            "salt must be {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if params.iterations < MIN_ITERATIONS {
        return Err(VaultKeeperError::KeyDerivationFailed(format!(
            "kdf_iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, params.iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
