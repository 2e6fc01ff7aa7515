//! Credential entries and the master-password rekey transaction.
//!
//! The entry list lives decrypted in memory only while a session is
//! unlocked, and is persisted as a single JSON array sealed inside
//! `entries_envelope`.  Decoding is strict: unknown or malformed fields
//! are rejected at the boundary rather than silently defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::{self, KdfParams, VaultKey};
use crate::errors::{Result, VaultKeeperError};
use crate::storage::RecordStore;

use super::controller::verify_master_password;
use super::record;

/// A single credential stored in the vault.
///
/// `id` is assigned on creation and never changes; every other field is
/// replaced wholesale on update.  Timestamps are managed by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialEntry {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied fields of an entry; the vault fills in the rest.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub name: String,
    pub username: String,
    pub password: String,
    pub website: Option<String>,
    pub notes: Option<String>,
}

/// The decrypted entry collection held by an unlocked session.
///
/// Mutations return a new `EntryStore` so the caller can persist the
/// sealed result first and only then commit the change in memory — a
/// failed save must leave the session's view untouched.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<CredentialEntry>,
}

impl EntryStore {
    /// A store with no entries (the state right after setup).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strictly decode the entries plaintext (a JSON array).
    pub fn decode(plaintext: &[u8]) -> Result<Self> {
        let entries: Vec<CredentialEntry> = serde_json::from_slice(plaintext)
            .map_err(|e| VaultKeeperError::InvalidFormat(format!("entries JSON: {e}")))?;
        Ok(Self { entries })
    }

    /// Encode the entry list to its plaintext JSON form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.entries)
            .map_err(|e| VaultKeeperError::SerializationError(format!("entries: {e}")))
    }

    /// All entries, in insertion order.
    pub fn list(&self) -> &[CredentialEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look up an entry by its display name (first match).
    pub fn find_by_name(&self, name: &str) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of this store with a new entry appended.
    ///
    /// Assigns a fresh unique id and both timestamps.
    pub fn with_added(&self, draft: EntryDraft) -> (Self, CredentialEntry) {
        let now = Utc::now();
        let entry = CredentialEntry {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            username: draft.username,
            password: draft.password,
            website: draft.website,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };

        let mut entries = self.entries.clone();
        entries.push(entry.clone());
        (Self { entries }, entry)
    }

    /// A copy of this store with the entry matching `id` replaced by
    /// the draft's fields.  Keeps the id and `created_at`.
    pub fn with_updated(&self, id: &str, draft: EntryDraft) -> Result<(Self, CredentialEntry)> {
        let mut entries = self.entries.clone();
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| VaultKeeperError::EntryNotFound(id.to_string()))?;

        slot.name = draft.name;
        slot.username = draft.username;
        slot.password = draft.password;
        slot.website = draft.website;
        slot.notes = draft.notes;
        slot.updated_at = Utc::now();

        let updated = slot.clone();
        Ok((Self { entries }, updated))
    }

    /// A copy of this store without the entry matching `id`.
    pub fn with_removed(&self, id: &str) -> Result<Self> {
        if self.get(id).is_none() {
            return Err(VaultKeeperError::EntryNotFound(id.to_string()));
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        Ok(Self { entries })
    }
}

/// What a successful rekey hands back to the session.
pub(crate) struct RekeyOutcome {
    pub key: VaultKey,
    pub entries: EntryStore,
}

/// Replace the master password, re-sealing every dependent envelope.
///
/// The delicate part of the whole vault: three envelopes must stay
/// consistent and the entry data must never be lost.  Ordering:
///
/// 1. Authenticate `current_attempt` against the verification envelope.
/// 2. Open the recovery envelope with `current_answer` and require the
///    recovered plaintext to equal `current_attempt` — the recovery
///    path must remain valid for the password being replaced.
/// 3. Decrypt the current entries envelope.  If this fails, abort with
///    nothing written: the old entries encryption is never destroyed
///    before the new one is proven derivable from readable plaintext.
/// 4. Derive the new master key from the existing master salt (the
///    salt is not rotated) and seal the new verification, entries, and
///    recovery envelopes.
/// 5. Persist all three, only now.
///
/// Any failure in steps 1-4 leaves every persisted record untouched.
pub(crate) fn rekey<S: RecordStore>(
    store: &mut S,
    params: &KdfParams,
    current_attempt: &str,
    new_password: &str,
    current_answer: &str,
) -> Result<RekeyOutcome> {
    // Step 1: the attempt must open the verification envelope.
    let current_key = verify_master_password(store, params, current_attempt)?;

    // Step 2: the answer must recover exactly the password being replaced.
    let answer_salt = record::load_salt(store, record::ANSWER_SALT)?;
    let answer_key = VaultKey::new(crypto::derive_key(
        current_answer.as_bytes(),
        &answer_salt,
        params,
    )?);

    let recovery_envelope = record::load_envelope(store, record::RECOVERY_ENVELOPE)?;
    let mut recovered = crypto::open(answer_key.as_bytes(), &recovery_envelope)?;
    let matches = bool::from(recovered.ct_eq(current_attempt.as_bytes()));
    recovered.zeroize();
    if !matches {
        return Err(VaultKeeperError::DataInconsistency(
            "recovery envelope does not correspond to the current master password".into(),
        ));
    }

    // Step 3: the entries must be readable before anything is replaced.
    let mut entries_plain = match record::load_envelope_opt(store, record::ENTRIES_ENVELOPE)? {
        Some(envelope) => {
            crypto::open(current_key.as_bytes(), &envelope).map_err(|_| {
                VaultKeeperError::DataInconsistency(
                    "entries envelope cannot be decrypted with the verified master password".into(),
                )
            })?
        }
        None => b"[]".to_vec(),
    };
    let entries = match EntryStore::decode(&entries_plain) {
        Ok(entries) => entries,
        Err(e) => {
            entries_plain.zeroize();
            return Err(e);
        }
    };

    // Step 4: seal everything under the new key. Master salt is kept.
    let master_salt = record::load_salt(store, record::MASTER_SALT)?;
    let new_key = VaultKey::new(crypto::derive_key(
        new_password.as_bytes(),
        &master_salt,
        params,
    )?);

    let new_entries_envelope = crypto::seal(new_key.as_bytes(), &entries_plain)?;
    entries_plain.zeroize();
    let new_verification_envelope =
        crypto::seal(new_key.as_bytes(), super::controller::VERIFICATION_PAYLOAD)?;
    let new_recovery_envelope = crypto::seal(answer_key.as_bytes(), new_password.as_bytes())?;

    // Step 5: all crypto succeeded; now write.
    record::save_envelope(store, record::ENTRIES_ENVELOPE, &new_entries_envelope)?;
    record::save_envelope(store, record::VERIFICATION_ENVELOPE, &new_verification_envelope)?;
    record::save_envelope(store, record::RECOVERY_ENVELOPE, &new_recovery_envelope)?;

    Ok(RekeyOutcome {
        key: new_key,
        entries,
    })
}
