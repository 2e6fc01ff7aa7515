//! Cryptographic primitives for VaultKeeper.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption into `Envelope`s (`encryption`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - The zeroizing `VaultKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use encryption::{open, seal, Envelope};
pub use kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
pub use keys::VaultKey;
