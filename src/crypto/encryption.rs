//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte IV and returns
//! a self-describing `Envelope { iv, ciphertext }` with the 16-byte
//! auth tag appended to the ciphertext.  `open` verifies the tag and
//! collapses every failure — wrong key, truncated IV, flipped bytes —
//! into a single authentication error, never partial plaintext.
//!
//! That authentication error is the only signal the vault uses to
//! detect an incorrect master password or security answer; there is no
//! separate password hash anywhere.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultKeeperError};

/// Size of the AES-256-GCM IV in bytes.
const IV_LEN: usize = 12;

/// A sealed unit of ciphertext together with the IV it was produced
/// under.  Serializes to JSON with both fields base64-encoded, which is
/// also the persisted on-disk form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// The random 12-byte IV (base64 in JSON). Unique per seal call;
    /// never reused with the same key.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    /// Ciphertext with the 16-byte GCM tag appended (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize to the persisted JSON byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| VaultKeeperError::SerializationError(format!("envelope: {e}")))
    }

    /// Parse an envelope back from its persisted JSON byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| VaultKeeperError::InvalidFormat(format!("envelope JSON: {e}")))
    }
}

/// Encrypt `plaintext` with a 32-byte `key` into a fresh envelope.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Envelope> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultKeeperError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let iv = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&iv, plaintext)
        .map_err(|e| VaultKeeperError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(Envelope {
        iv: iv.to_vec(),
        ciphertext,
    })
}

/// Decrypt an envelope produced by `seal`.
///
/// Returns `AuthenticationFailed` when the key is wrong or the envelope
/// was tampered with in any way.
pub fn open(key: &[u8], envelope: &Envelope) -> Result<Vec<u8>> {
    // A malformed IV can only mean tampering; treat it as an auth failure.
    if envelope.iv.len() != IV_LEN {
        return Err(VaultKeeperError::AuthenticationFailed);
    }
    let iv = Nonce::from_slice(&envelope.iv);

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| VaultKeeperError::AuthenticationFailed)?;

    cipher
        .decrypt(iv, envelope.ciphertext.as_ref())
        .map_err(|_| VaultKeeperError::AuthenticationFailed)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
