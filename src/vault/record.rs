//! Persisted vault records and their encodings.
//!
//! One installation persists a fixed set of named records through the
//! `RecordStore` interface:
//!
//! - `username` — UTF-8 string, set once at setup.
//! - `master_salt`, `answer_salt` — base64-encoded 16 random bytes,
//!   one per derivable key, never shared between the two.
//! - `security_question` — plaintext UTF-8 string shown during recovery.
//! - `recovery_envelope` — the current master password sealed under the
//!   answer-derived key.
//! - `verification_envelope` — a fixed known payload sealed under the
//!   master-derived key; decrypting it is the only proof a candidate
//!   master password is correct.
//! - `entries_envelope` — the serialized credential entry list sealed
//!   under the master-derived key.
//! - `kdf_iterations` — decimal string; the PBKDF2 cost the vault was
//!   created with, so unlock always derives with the same parameters.
//!
//! This module is the (de)serialization boundary: everything read from
//! the store is validated here before the rest of the vault trusts it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::{Envelope, SALT_LEN};
use crate::errors::{Result, VaultKeeperError};
use crate::storage::RecordStore;

pub const USERNAME: &str = "username";
pub const MASTER_SALT: &str = "master_salt";
pub const ANSWER_SALT: &str = "answer_salt";
pub const SECURITY_QUESTION: &str = "security_question";
pub const RECOVERY_ENVELOPE: &str = "recovery_envelope";
pub const VERIFICATION_ENVELOPE: &str = "verification_envelope";
pub const ENTRIES_ENVELOPE: &str = "entries_envelope";
pub const KDF_ITERATIONS: &str = "kdf_iterations";

/// Every record belonging to one installation, in a stable order.
pub const ALL_RECORDS: [&str; 8] = [
    USERNAME,
    MASTER_SALT,
    ANSWER_SALT,
    SECURITY_QUESTION,
    RECOVERY_ENVELOPE,
    VERIFICATION_ENVELOPE,
    ENTRIES_ENVELOPE,
    KDF_ITERATIONS,
];

/// Read a record that must exist.
fn load_required<S: RecordStore>(store: &S, key: &str) -> Result<Vec<u8>> {
    store
        .get(key)?
        .ok_or_else(|| VaultKeeperError::MissingData(key.to_string()))
}

/// Read a required UTF-8 string record.
pub fn load_string<S: RecordStore>(store: &S, key: &str) -> Result<String> {
    let bytes = load_required(store, key)?;
    String::from_utf8(bytes)
        .map_err(|_| VaultKeeperError::InvalidFormat(format!("record '{key}' is not valid UTF-8")))
}

/// Write a UTF-8 string record.
pub fn save_string<S: RecordStore>(store: &mut S, key: &str, value: &str) -> Result<()> {
    store.set(key, value.as_bytes())
}

/// Read a required 16-byte salt record (stored base64-encoded).
pub fn load_salt<S: RecordStore>(store: &S, key: &str) -> Result<[u8; SALT_LEN]> {
    let text = load_string(store, key)?;
    let bytes = BASE64
        .decode(&text)
        .map_err(|_| VaultKeeperError::InvalidFormat(format!("record '{key}' is not valid base64")))?;
    bytes.as_slice().try_into().map_err(|_| {
        VaultKeeperError::InvalidFormat(format!(
            "record '{key}' must decode to {SALT_LEN} bytes (got {})",
            bytes.len()
        ))
    })
}

/// Write a 16-byte salt record (base64-encoded).
pub fn save_salt<S: RecordStore>(store: &mut S, key: &str, salt: &[u8; SALT_LEN]) -> Result<()> {
    store.set(key, BASE64.encode(salt).as_bytes())
}

/// Read a required envelope record from its JSON form.
pub fn load_envelope<S: RecordStore>(store: &S, key: &str) -> Result<Envelope> {
    let bytes = load_required(store, key)?;
    Envelope::from_bytes(&bytes)
}

/// Read an envelope record that may legitimately be absent.
pub fn load_envelope_opt<S: RecordStore>(store: &S, key: &str) -> Result<Option<Envelope>> {
    match store.get(key)? {
        Some(bytes) => Envelope::from_bytes(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Write an envelope record in its JSON form.
pub fn save_envelope<S: RecordStore>(store: &mut S, key: &str, envelope: &Envelope) -> Result<()> {
    store.set(key, &envelope.to_bytes()?)
}

/// Read the persisted KDF iteration count, if the vault has one.
///
/// Vaults written before the count was persisted fall back to the
/// caller's configured default.
pub fn load_iterations<S: RecordStore>(store: &S) -> Result<Option<u32>> {
    match store.get(KDF_ITERATIONS)? {
        Some(bytes) => {
            let text = String::from_utf8(bytes).map_err(|_| {
                VaultKeeperError::InvalidFormat("record 'kdf_iterations' is not valid UTF-8".into())
            })?;
            let n = text.trim().parse::<u32>().map_err(|_| {
                VaultKeeperError::InvalidFormat("record 'kdf_iterations' is not a number".into())
            })?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

/// Write the KDF iteration count as a decimal string.
pub fn save_iterations<S: RecordStore>(store: &mut S, iterations: u32) -> Result<()> {
    store.set(KDF_ITERATIONS, iterations.to_string().as_bytes())
}

/// Whether the store holds a set-up vault.
///
/// The vault counts as initialized when the username, master salt,
/// verification envelope, and security question are all present.
pub fn is_initialized<S: RecordStore>(store: &S) -> Result<bool> {
    Ok(store.get(USERNAME)?.is_some()
        && store.get(MASTER_SALT)?.is_some()
        && store.get(VERIFICATION_ENVELOPE)?.is_some()
        && store.get(SECURITY_QUESTION)?.is_some())
}

/// Remove every record belonging to this installation.
pub fn delete_all<S: RecordStore>(store: &mut S) -> Result<()> {
    for key in ALL_RECORDS {
        store.delete(key)?;
    }
    Ok(())
}
