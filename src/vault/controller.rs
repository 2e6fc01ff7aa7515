//! The vault lifecycle state machine.
//!
//! `Vault` owns the injected record store and the in-memory session.
//! The session master key exists only inside an `Unlocked` session and
//! is dropped (and zeroized) on lock, reset, or rekey; it is never
//! persisted and never handed out.
//!
//! Mutating operations take `&mut self`, so exclusive borrowing is the
//! per-vault serialization the protocol requires — two re-keys cannot
//! interleave.  Processes sharing one vault wrap it in a mutex.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{self, KdfParams, VaultKey};
use crate::errors::{Result, VaultKeeperError};
use crate::storage::RecordStore;

use super::entries::{self, CredentialEntry, EntryDraft, EntryStore};
use super::record;
use super::recovery;

/// Fixed plaintext sealed under the master key at setup.  Decrypting
/// the verification envelope back to exactly these bytes is the sole
/// proof that a candidate master password is correct.
pub(crate) const VERIFICATION_PAYLOAD: &[u8] = b"VAULTKEEPER_OK_CHECK";

/// Derive a key from a master-password attempt and prove it correct
/// against the verification envelope.
///
/// Returns the derived key on success so callers never re-derive.
pub(crate) fn verify_master_password<S: RecordStore>(
    store: &S,
    params: &KdfParams,
    attempt: &str,
) -> Result<VaultKey> {
    let master_salt = record::load_salt(store, record::MASTER_SALT)?;
    let key = VaultKey::new(crypto::derive_key(attempt.as_bytes(), &master_salt, params)?);

    let envelope = record::load_envelope(store, record::VERIFICATION_ENVELOPE)?;
    let mut payload = crypto::open(key.as_bytes(), &envelope)?;
    let ok = bool::from(payload.ct_eq(VERIFICATION_PAYLOAD));
    payload.zeroize();

    if !ok {
        return Err(VaultKeeperError::AuthenticationFailed);
    }
    Ok(key)
}

/// Observable lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No vault has been set up in the store.
    Uninitialized,
    /// A vault exists but no session key is held.
    Locked,
    /// A session key is held and entries are decrypted in memory.
    Unlocked,
    /// Recovery started; the security answer has not been verified yet.
    RecoveryPending,
    /// The answer was verified; awaiting the new master password.
    RecoveryVerified,
}

/// In-memory session state.  Everything here is gone after `lock`.
enum Session {
    Locked,
    Unlocked {
        key: VaultKey,
        entries: EntryStore,
        /// Set when the entries envelope existed but could not be
        /// decrypted or decoded with the proven master key.  The
        /// session opens with an empty list and the corrupt envelope
        /// is left on disk untouched; callers surface this as a
        /// warning.
        entries_tainted: bool,
    },
    RecoveryPending,
    RecoveryVerified {
        recovered_password: Zeroizing<String>,
        answer: Zeroizing<String>,
    },
}

/// The vault controller.  Create one over a record store with
/// `Vault::new`, then drive it through setup/unlock/lock and the
/// recovery and rekey flows.
pub struct Vault<S: RecordStore> {
    store: S,
    params: KdfParams,
    session: Session,
}

impl<S: RecordStore> Vault<S> {
    /// Wrap a record store.
    ///
    /// If the store already holds a vault that recorded its KDF cost,
    /// that persisted cost wins over `params` so unlock always derives
    /// with the parameters the vault was created with.
    pub fn new(store: S, params: KdfParams) -> Result<Self> {
        let params = match record::load_iterations(&store)? {
            Some(iterations) => KdfParams { iterations },
            None => params,
        };
        Ok(Self {
            store,
            params,
            session: Session::Locked,
        })
    }

    /// Tear down the controller and hand the record store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// The current lifecycle state.
    pub fn state(&self) -> Result<VaultState> {
        Ok(match &self.session {
            Session::Unlocked { .. } => VaultState::Unlocked,
            Session::RecoveryPending => VaultState::RecoveryPending,
            Session::RecoveryVerified { .. } => VaultState::RecoveryVerified,
            Session::Locked => {
                if record::is_initialized(&self.store)? {
                    VaultState::Locked
                } else {
                    VaultState::Uninitialized
                }
            }
        })
    }

    /// The username chosen at setup.
    pub fn username(&self) -> Result<String> {
        record::load_string(&self.store, record::USERNAME)
    }

    /// The stored security question (readable without authentication —
    /// it is shown to start recovery).
    pub fn security_question(&self) -> Result<String> {
        record::load_string(&self.store, record::SECURITY_QUESTION)
    }

    // ------------------------------------------------------------------
    // Setup / unlock / lock
    // ------------------------------------------------------------------

    /// Create the vault and open the first session.
    ///
    /// Generates both salts, seals the verification payload and an
    /// empty entry list under the master key and the master password
    /// under the answer key, persists every record, and leaves the
    /// vault unlocked.
    pub fn setup(
        &mut self,
        username: &str,
        master_password: &str,
        security_question: &str,
        security_answer: &str,
    ) -> Result<()> {
        if record::is_initialized(&self.store)? {
            return Err(VaultKeeperError::AlreadyInitialized);
        }

        let master_salt = crypto::generate_salt();
        let answer_salt = crypto::generate_salt();

        let master_key = VaultKey::new(crypto::derive_key(
            master_password.as_bytes(),
            &master_salt,
            &self.params,
        )?);
        let answer_key = VaultKey::new(crypto::derive_key(
            security_answer.as_bytes(),
            &answer_salt,
            &self.params,
        )?);

        let recovery_envelope = crypto::seal(answer_key.as_bytes(), master_password.as_bytes())?;
        let verification_envelope = crypto::seal(master_key.as_bytes(), VERIFICATION_PAYLOAD)?;
        let entries = EntryStore::empty();
        let entries_envelope = crypto::seal(master_key.as_bytes(), &entries.encode()?)?;

        record::save_string(&mut self.store, record::USERNAME, username)?;
        record::save_salt(&mut self.store, record::MASTER_SALT, &master_salt)?;
        record::save_salt(&mut self.store, record::ANSWER_SALT, &answer_salt)?;
        record::save_string(&mut self.store, record::SECURITY_QUESTION, security_question)?;
        record::save_envelope(&mut self.store, record::RECOVERY_ENVELOPE, &recovery_envelope)?;
        record::save_envelope(
            &mut self.store,
            record::VERIFICATION_ENVELOPE,
            &verification_envelope,
        )?;
        record::save_envelope(&mut self.store, record::ENTRIES_ENVELOPE, &entries_envelope)?;
        record::save_iterations(&mut self.store, self.params.iterations)?;

        self.session = Session::Unlocked {
            key: master_key,
            entries,
            entries_tainted: false,
        };
        Ok(())
    }

    /// Open a session with a master-password attempt.
    ///
    /// A wrong password fails with `AuthenticationFailed` and the vault
    /// stays locked.  An entries envelope that exists but cannot be
    /// decrypted with the now-proven key does not block the unlock: the
    /// session opens with an empty list, the corrupt envelope stays on
    /// disk untouched, and `entries_tainted` reports the condition so
    /// callers can warn before anything overwrites it.
    pub fn unlock(&mut self, attempt: &str) -> Result<()> {
        if !matches!(self.session, Session::Locked) {
            return Err(VaultKeeperError::InvalidState(
                "vault session is already open".into(),
            ));
        }

        let key = verify_master_password(&self.store, &self.params, attempt)?;

        let mut entries_tainted = false;
        let entries = match record::load_envelope_opt(&self.store, record::ENTRIES_ENVELOPE)? {
            Some(envelope) => match crypto::open(key.as_bytes(), &envelope) {
                Ok(mut plain) => {
                    let decoded = EntryStore::decode(&plain);
                    plain.zeroize();
                    match decoded {
                        Ok(entries) => entries,
                        Err(_) => {
                            entries_tainted = true;
                            EntryStore::empty()
                        }
                    }
                }
                Err(_) => {
                    entries_tainted = true;
                    EntryStore::empty()
                }
            },
            None => {
                // A vault written before any entries existed; reseed an
                // empty sealed list so the record is always present.
                let entries = EntryStore::empty();
                let envelope = crypto::seal(key.as_bytes(), &entries.encode()?)?;
                record::save_envelope(&mut self.store, record::ENTRIES_ENVELOPE, &envelope)?;
                entries
            }
        };

        self.session = Session::Unlocked {
            key,
            entries,
            entries_tainted,
        };
        Ok(())
    }

    /// Whether the current session's entries envelope was unreadable at
    /// unlock time (the list in memory is empty and the corrupt
    /// envelope is still on disk).
    pub fn entries_tainted(&self) -> bool {
        matches!(
            self.session,
            Session::Unlocked {
                entries_tainted: true,
                ..
            }
        )
    }

    /// Discard the session key and decrypted entries.  No persisted
    /// state changes.
    pub fn lock(&mut self) {
        self.session = Session::Locked;
    }

    /// Delete every persisted record.  Destructive and irreversible;
    /// callers confirm upstream.
    pub fn full_reset(&mut self) -> Result<()> {
        record::delete_all(&mut self.store)?;
        self.session = Session::Locked;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Recovery flow
    // ------------------------------------------------------------------

    /// Start recovery: returns the security question to put to the
    /// user and moves the session to `RecoveryPending`.
    pub fn begin_recovery(&mut self) -> Result<String> {
        if !matches!(self.session, Session::Locked) {
            return Err(VaultKeeperError::InvalidState(
                "recovery can only start from a locked vault".into(),
            ));
        }
        let question = self.security_question()?;
        self.session = Session::RecoveryPending;
        Ok(question)
    }

    /// Verify a security-answer attempt.
    ///
    /// On success the session carries the recovered old password and
    /// the verified answer forward, awaiting `complete_password_reset`.
    /// On failure the session stays in `RecoveryPending` for a retry.
    pub fn verify_security_answer(&mut self, answer_attempt: &str) -> Result<()> {
        if !matches!(self.session, Session::RecoveryPending) {
            return Err(VaultKeeperError::InvalidState(
                "no recovery in progress".into(),
            ));
        }

        let recovered =
            recovery::verify_security_answer(&self.store, &self.params, answer_attempt)?;

        self.session = Session::RecoveryVerified {
            recovered_password: recovered,
            answer: Zeroizing::new(answer_attempt.to_string()),
        };
        Ok(())
    }

    /// Finish recovery by setting a new master password.
    ///
    /// Runs the full rekey transaction using the recovered old password
    /// and verified answer as the proofs, then opens a session under
    /// the new key.
    pub fn complete_password_reset(&mut self, new_password: &str) -> Result<()> {
        let (recovered_password, answer) = match &self.session {
            Session::RecoveryVerified {
                recovered_password,
                answer,
            } => (recovered_password.clone(), answer.clone()),
            _ => {
                return Err(VaultKeeperError::InvalidState(
                    "security answer has not been verified".into(),
                ))
            }
        };

        let outcome = entries::rekey(
            &mut self.store,
            &self.params,
            &recovered_password,
            new_password,
            &answer,
        )?;

        self.session = Session::Unlocked {
            key: outcome.key,
            entries: outcome.entries,
            entries_tainted: false,
        };
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rekey / security Q&A
    // ------------------------------------------------------------------

    /// Change the master password.
    ///
    /// Requires the current password and the current security answer so
    /// the recovery envelope can be kept in lockstep.  On success the
    /// session is (re)opened under the new key; on any failure nothing
    /// was persisted and the prior session state is unchanged.
    pub fn change_master_password(
        &mut self,
        current_attempt: &str,
        new_password: &str,
        current_answer: &str,
    ) -> Result<()> {
        if matches!(
            self.session,
            Session::RecoveryPending | Session::RecoveryVerified { .. }
        ) {
            return Err(VaultKeeperError::InvalidState(
                "cannot change the master password during recovery".into(),
            ));
        }

        let outcome = entries::rekey(
            &mut self.store,
            &self.params,
            current_attempt,
            new_password,
            current_answer,
        )?;

        self.session = Session::Unlocked {
            key: outcome.key,
            entries: outcome.entries,
            entries_tainted: false,
        };
        Ok(())
    }

    /// Change the security question and answer.
    ///
    /// Authenticated by the master password alone (the answer is being
    /// replaced).  Rotates the answer salt and reseals the recovery
    /// envelope; the session is left as it was.
    pub fn change_security_qa(
        &mut self,
        master_attempt: &str,
        new_question: &str,
        new_answer: &str,
    ) -> Result<()> {
        if matches!(
            self.session,
            Session::RecoveryPending | Session::RecoveryVerified { .. }
        ) {
            return Err(VaultKeeperError::InvalidState(
                "cannot change the security question during recovery".into(),
            ));
        }

        recovery::change_security_qa(
            &mut self.store,
            &self.params,
            master_attempt,
            new_question,
            new_answer,
        )
    }

    // ------------------------------------------------------------------
    // Entry operations (unlocked sessions only)
    // ------------------------------------------------------------------

    /// The decrypted entries of the current session.
    pub fn entries(&self) -> Result<&[CredentialEntry]> {
        match &self.session {
            Session::Unlocked { entries, .. } => Ok(entries.list()),
            _ => Err(VaultKeeperError::InvalidState("vault is locked".into())),
        }
    }

    /// Look up one entry by id.
    pub fn entry(&self, id: &str) -> Result<&CredentialEntry> {
        match &self.session {
            Session::Unlocked { entries, .. } => entries
                .get(id)
                .ok_or_else(|| VaultKeeperError::EntryNotFound(id.to_string())),
            _ => Err(VaultKeeperError::InvalidState("vault is locked".into())),
        }
    }

    /// Look up one entry by display name (first match).
    pub fn entry_by_name(&self, name: &str) -> Result<&CredentialEntry> {
        match &self.session {
            Session::Unlocked { entries, .. } => entries
                .find_by_name(name)
                .ok_or_else(|| VaultKeeperError::EntryNotFound(name.to_string())),
            _ => Err(VaultKeeperError::InvalidState("vault is locked".into())),
        }
    }

    /// Add a credential entry; the vault assigns its id.
    pub fn add_entry(&mut self, draft: EntryDraft) -> Result<CredentialEntry> {
        let Session::Unlocked { key, entries, .. } = &mut self.session else {
            return Err(VaultKeeperError::InvalidState("vault is locked".into()));
        };

        let (next, added) = entries.with_added(draft);
        Self::persist_entries(&mut self.store, key, &next)?;
        *entries = next;
        Ok(added)
    }

    /// Replace every mutable field of the entry matching `id`.
    pub fn update_entry(&mut self, id: &str, draft: EntryDraft) -> Result<CredentialEntry> {
        let Session::Unlocked { key, entries, .. } = &mut self.session else {
            return Err(VaultKeeperError::InvalidState("vault is locked".into()));
        };

        let (next, updated) = entries.with_updated(id, draft)?;
        Self::persist_entries(&mut self.store, key, &next)?;
        *entries = next;
        Ok(updated)
    }

    /// Remove the entry matching `id`.
    pub fn delete_entry(&mut self, id: &str) -> Result<()> {
        let Session::Unlocked { key, entries, .. } = &mut self.session else {
            return Err(VaultKeeperError::InvalidState("vault is locked".into()));
        };

        let next = entries.with_removed(id)?;
        Self::persist_entries(&mut self.store, key, &next)?;
        *entries = next;
        Ok(())
    }

    /// Seal and persist an entry list under the session key.
    ///
    /// Called with the candidate list *before* it is committed to the
    /// session, so a failed save leaves the in-memory view unchanged.
    fn persist_entries(store: &mut S, key: &VaultKey, entries: &EntryStore) -> Result<()> {
        let mut plain = entries.encode()?;
        let envelope = crypto::seal(key.as_bytes(), &plain);
        plain.zeroize();
        record::save_envelope(store, record::ENTRIES_ENVELOPE, &envelope?)
    }
}
