//! Integration tests for the vault lifecycle and entry operations.

use vaultkeeper::crypto::{Envelope, KdfParams};
use vaultkeeper::errors::VaultKeeperError;
use vaultkeeper::storage::MemoryRecordStore;
use vaultkeeper::vault::{record, EntryDraft, Vault, VaultState};

const TEST_PARAMS: KdfParams = KdfParams { iterations: 10_000 };

const PASSWORD: &str = "CorrectH0rse!9";
const QUESTION: &str = "Pet name?";
const ANSWER: &str = "Rex123!";

/// Helper: a fresh vault over an in-memory store.
fn new_vault() -> Vault<MemoryRecordStore> {
    Vault::new(MemoryRecordStore::new(), TEST_PARAMS).expect("construct vault")
}

/// Helper: a vault already set up with the standard test credentials.
fn set_up_vault() -> Vault<MemoryRecordStore> {
    let mut vault = new_vault();
    vault
        .setup("alice", PASSWORD, QUESTION, ANSWER)
        .expect("setup");
    vault
}

/// Helper: a draft entry.
fn mail_draft() -> EntryDraft {
    EntryDraft {
        name: "Mail".to_string(),
        username: "a@b.com".to_string(),
        password: "x".to_string(),
        website: Some("https://mail.example".to_string()),
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Setup and unlock
// ---------------------------------------------------------------------------

#[test]
fn setup_unlocks_with_empty_entries() {
    let vault = set_up_vault();

    assert_eq!(vault.state().unwrap(), VaultState::Unlocked);
    assert_eq!(vault.username().unwrap(), "alice");
    assert_eq!(vault.security_question().unwrap(), QUESTION);
    assert!(vault.entries().unwrap().is_empty());
}

#[test]
fn lock_then_unlock_with_correct_password() {
    let mut vault = set_up_vault();

    vault.lock();
    assert_eq!(vault.state().unwrap(), VaultState::Locked);
    assert!(vault.entries().is_err(), "entries unavailable while locked");

    vault.unlock(PASSWORD).expect("unlock");
    assert_eq!(vault.state().unwrap(), VaultState::Unlocked);
    assert!(vault.entries().unwrap().is_empty());
}

#[test]
fn unlock_with_wrong_password_fails() {
    let mut vault = set_up_vault();
    vault.lock();

    let result = vault.unlock("wrong");
    assert!(matches!(result, Err(VaultKeeperError::AuthenticationFailed)));
    assert_eq!(vault.state().unwrap(), VaultState::Locked);
}

#[test]
fn setup_twice_is_rejected() {
    let mut vault = set_up_vault();
    let result = vault.setup("bob", "AnotherPass!1", "Q?", "A!");
    assert!(matches!(result, Err(VaultKeeperError::AlreadyInitialized)));
}

#[test]
fn unlock_uninitialized_vault_fails_with_missing_data() {
    let mut vault = new_vault();
    assert_eq!(vault.state().unwrap(), VaultState::Uninitialized);

    let result = vault.unlock(PASSWORD);
    assert!(matches!(result, Err(VaultKeeperError::MissingData(_))));
}

#[test]
fn master_and_answer_salts_are_distinct() {
    let vault = set_up_vault();
    let store = vault.into_store();

    let master_salt = record::load_salt(&store, record::MASTER_SALT).unwrap();
    let answer_salt = record::load_salt(&store, record::ANSWER_SALT).unwrap();
    assert_ne!(master_salt, answer_salt, "the two salts must never match");
}

// ---------------------------------------------------------------------------
// Entry CRUD
// ---------------------------------------------------------------------------

#[test]
fn add_entry_assigns_unique_ids() {
    let mut vault = set_up_vault();

    let first = vault.add_entry(mail_draft()).expect("add 1");
    let second = vault
        .add_entry(EntryDraft {
            name: "Bank".to_string(),
            username: "alice".to_string(),
            password: "y".to_string(),
            website: None,
            notes: Some("main account".to_string()),
        })
        .expect("add 2");

    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);
    assert_eq!(vault.entries().unwrap().len(), 2);
    assert_eq!(vault.entry(&first.id).unwrap().name, "Mail");
    assert_eq!(vault.entry_by_name("Bank").unwrap().id, second.id);
}

#[test]
fn entries_survive_lock_and_unlock() {
    let mut vault = set_up_vault();
    let added = vault.add_entry(mail_draft()).expect("add");

    vault.lock();
    vault.unlock(PASSWORD).expect("unlock");

    let entries = vault.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, added.id);
    assert_eq!(entries[0].name, "Mail");
    assert_eq!(entries[0].username, "a@b.com");
    assert_eq!(entries[0].password, "x");
}

#[test]
fn update_entry_replaces_fields_but_keeps_identity() {
    let mut vault = set_up_vault();
    let added = vault.add_entry(mail_draft()).expect("add");

    let updated = vault
        .update_entry(
            &added.id,
            EntryDraft {
                name: "Mail (work)".to_string(),
                username: "work@b.com".to_string(),
                password: "z".to_string(),
                website: None,
                notes: None,
            },
        )
        .expect("update");

    assert_eq!(updated.id, added.id, "id is immutable");
    assert_eq!(updated.created_at, added.created_at);
    assert_eq!(updated.name, "Mail (work)");
    assert_eq!(updated.website, None, "fields are replaced wholesale");
}

#[test]
fn update_unknown_id_fails() {
    let mut vault = set_up_vault();
    let result = vault.update_entry("no-such-id", mail_draft());
    assert!(matches!(result, Err(VaultKeeperError::EntryNotFound(_))));
}

#[test]
fn delete_entry_removes_it() {
    let mut vault = set_up_vault();
    let added = vault.add_entry(mail_draft()).expect("add");

    vault.delete_entry(&added.id).expect("delete");
    assert!(vault.entries().unwrap().is_empty());

    let result = vault.delete_entry(&added.id);
    assert!(matches!(result, Err(VaultKeeperError::EntryNotFound(_))));
}

#[test]
fn entry_operations_require_unlocked_session() {
    let mut vault = set_up_vault();
    vault.lock();

    assert!(matches!(
        vault.add_entry(mail_draft()),
        Err(VaultKeeperError::InvalidState(_))
    ));
    assert!(matches!(
        vault.delete_entry("any"),
        Err(VaultKeeperError::InvalidState(_))
    ));
}

// ---------------------------------------------------------------------------
// Master password change (rekey)
// ---------------------------------------------------------------------------

#[test]
fn rekey_preserves_entries() {
    let mut vault = set_up_vault();
    let added = vault.add_entry(mail_draft()).expect("add");

    vault
        .change_master_password(PASSWORD, "NewerH0rse!9", ANSWER)
        .expect("change password");

    vault.lock();

    // The old password no longer opens the vault.
    assert!(matches!(
        vault.unlock(PASSWORD),
        Err(VaultKeeperError::AuthenticationFailed)
    ));

    vault.unlock("NewerH0rse!9").expect("unlock with new");
    let entries = vault.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, added.id);
    assert_eq!(entries[0].username, "a@b.com");
    assert_eq!(entries[0].password, "x");
}

#[test]
fn rekey_with_wrong_current_password_fails_fast() {
    let mut vault = set_up_vault();

    let result = vault.change_master_password("wrong", "NewerH0rse!9", ANSWER);
    assert!(matches!(result, Err(VaultKeeperError::AuthenticationFailed)));

    // The vault is untouched; the original password still works.
    vault.lock();
    vault.unlock(PASSWORD).expect("unlock");
}

#[test]
fn rekey_with_wrong_answer_fails() {
    let mut vault = set_up_vault();

    let result = vault.change_master_password(PASSWORD, "NewerH0rse!9", "wrong answer");
    assert!(matches!(result, Err(VaultKeeperError::AuthenticationFailed)));

    vault.lock();
    vault.unlock(PASSWORD).expect("unlock");
}

#[test]
fn rekey_does_not_rotate_master_salt() {
    let vault = set_up_vault();
    let store = vault.into_store();
    let salt_before = record::load_salt(&store, record::MASTER_SALT).unwrap();

    let mut vault = Vault::new(store, TEST_PARAMS).unwrap();
    vault
        .change_master_password(PASSWORD, "NewerH0rse!9", ANSWER)
        .expect("change password");

    let store = vault.into_store();
    let salt_after = record::load_salt(&store, record::MASTER_SALT).unwrap();
    assert_eq!(salt_before, salt_after);
}

#[test]
fn rekey_aborts_on_corrupted_entries_without_touching_other_envelopes() {
    let mut vault = set_up_vault();
    vault.add_entry(mail_draft()).expect("add");

    // Tamper with the entries envelope behind the vault's back.
    let mut store = vault.into_store();
    let raw = store.raw(record::ENTRIES_ENVELOPE).unwrap().clone();
    let mut envelope = Envelope::from_bytes(&raw).unwrap();
    envelope.ciphertext[0] ^= 0xFF;
    store.set_raw(record::ENTRIES_ENVELOPE, envelope.to_bytes().unwrap());

    let verification_before = store.raw(record::VERIFICATION_ENVELOPE).unwrap().clone();
    let recovery_before = store.raw(record::RECOVERY_ENVELOPE).unwrap().clone();

    // The rekey must fail in the read phase with nothing persisted.
    let mut vault = Vault::new(store, TEST_PARAMS).unwrap();
    let result = vault.change_master_password(PASSWORD, "NewerH0rse!9", ANSWER);
    assert!(matches!(result, Err(VaultKeeperError::DataInconsistency(_))));

    let store = vault.into_store();
    assert_eq!(
        store.raw(record::VERIFICATION_ENVELOPE).unwrap(),
        &verification_before
    );
    assert_eq!(store.raw(record::RECOVERY_ENVELOPE).unwrap(), &recovery_before);

    // The original password still opens the vault; the unreadable
    // entries are reported, not silently replaced on disk.
    let mut vault = Vault::new(store, TEST_PARAMS).unwrap();
    vault.unlock(PASSWORD).expect("unlock after failed rekey");
    assert!(vault.entries_tainted());
    assert!(vault.entries().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Full reset
// ---------------------------------------------------------------------------

#[test]
fn full_reset_clears_everything() {
    let mut vault = set_up_vault();
    vault.add_entry(mail_draft()).expect("add");

    vault.full_reset().expect("reset");
    assert_eq!(vault.state().unwrap(), VaultState::Uninitialized);

    let store = vault.into_store();
    assert!(store.is_empty(), "no records may survive a full reset");

    // Setup runs again as if fresh.
    let mut vault = Vault::new(store, TEST_PARAMS).unwrap();
    vault
        .setup("alice", "BrandNewPass!1", QUESTION, ANSWER)
        .expect("setup after reset");
    assert_eq!(vault.state().unwrap(), VaultState::Unlocked);
}

// ---------------------------------------------------------------------------
// Persisted KDF parameters
// ---------------------------------------------------------------------------

#[test]
fn unlock_uses_the_iteration_count_the_vault_was_created_with() {
    let vault = set_up_vault();
    let store = vault.into_store();

    // A controller configured with a different cost must still derive
    // with the persisted one.
    let mut vault = Vault::new(store, KdfParams { iterations: 20_000 }).unwrap();
    vault.unlock(PASSWORD).expect("unlock with persisted params");
}

// ---------------------------------------------------------------------------
// Strict entry decoding
// ---------------------------------------------------------------------------

#[test]
fn malformed_entries_plaintext_is_reported_not_defaulted() {
    let mut vault = set_up_vault();
    vault.add_entry(mail_draft()).expect("add");

    // Replace the entries envelope with one sealing invalid JSON under
    // the correct master key.
    let store = vault.into_store();
    let master_salt = record::load_salt(&store, record::MASTER_SALT).unwrap();
    let key = vaultkeeper::crypto::derive_key(PASSWORD.as_bytes(), &master_salt, &TEST_PARAMS)
        .expect("derive");
    let bogus = vaultkeeper::crypto::seal(&key, b"{\"not\":\"a list\"}").expect("seal");

    let mut store = store;
    store.set_raw(record::ENTRIES_ENVELOPE, bogus.to_bytes().unwrap());

    let mut vault = Vault::new(store, TEST_PARAMS).unwrap();
    vault.unlock(PASSWORD).expect("unlock");
    assert!(vault.entries_tainted());
    assert!(vault.entries().unwrap().is_empty());
}
