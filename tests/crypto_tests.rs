//! Integration tests for the VaultKeeper crypto module.

use vaultkeeper::crypto::{derive_key, generate_salt, open, seal, Envelope, KdfParams, SALT_LEN};
use vaultkeeper::errors::VaultKeeperError;

const TEST_PARAMS: KdfParams = KdfParams { iterations: 10_000 };

// ---------------------------------------------------------------------------
// Seal / open round-trip
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"{\"name\":\"Mail\",\"password\":\"hunter2\"}";

    let envelope = seal(&key, plaintext).expect("seal should succeed");

    // Ciphertext carries the 16-byte tag; IV is 12 bytes.
    assert_eq!(envelope.iv.len(), 12);
    assert!(envelope.ciphertext.len() > plaintext.len());

    let recovered = open(&key, &envelope).expect("open should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn seal_produces_fresh_iv_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same plaintext";

    let env1 = seal(&key, plaintext).expect("seal 1");
    let env2 = seal(&key, plaintext).expect("seal 2");

    // A fresh random IV per call means neither field may repeat.
    assert_ne!(env1.iv, env2.iv, "IVs must never repeat");
    assert_ne!(env1.ciphertext, env2.ciphertext);
}

#[test]
fn open_with_wrong_key_fails() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];

    let envelope = seal(&key, b"TOP_SECRET").expect("seal");
    let result = open(&wrong_key, &envelope);

    assert!(
        matches!(result, Err(VaultKeeperError::AuthenticationFailed)),
        "wrong key must fail authentication, not return garbage"
    );
}

#[test]
fn open_with_corrupted_ciphertext_fails() {
    let key = [0xBBu8; 32];
    let mut envelope = seal(&key, b"credential data").expect("seal");

    // Flip one ciphertext byte; the GCM tag check must reject it.
    envelope.ciphertext[0] ^= 0xFF;

    assert!(matches!(
        open(&key, &envelope),
        Err(VaultKeeperError::AuthenticationFailed)
    ));
}

#[test]
fn open_with_corrupted_tag_fails() {
    let key = [0xBCu8; 32];
    let mut envelope = seal(&key, b"credential data").expect("seal");

    // The tag is the trailing 16 bytes of the ciphertext field.
    let last = envelope.ciphertext.len() - 1;
    envelope.ciphertext[last] ^= 0x01;

    assert!(matches!(
        open(&key, &envelope),
        Err(VaultKeeperError::AuthenticationFailed)
    ));
}

#[test]
fn open_with_bad_iv_length_fails() {
    let key = [0xAAu8; 32];
    let mut envelope = seal(&key, b"x").expect("seal");
    envelope.iv.truncate(5);

    assert!(matches!(
        open(&key, &envelope),
        Err(VaultKeeperError::AuthenticationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Envelope JSON encoding
// ---------------------------------------------------------------------------

#[test]
fn envelope_json_roundtrip() {
    let key = [0x42u8; 32];
    let envelope = seal(&key, b"payload").expect("seal");

    let bytes = envelope.to_bytes().expect("to_bytes");
    // Both fields are base64 strings in the JSON form.
    let text = String::from_utf8(bytes.clone()).expect("envelope JSON is UTF-8");
    assert!(text.contains("\"iv\""));
    assert!(text.contains("\"ciphertext\""));

    let parsed = Envelope::from_bytes(&bytes).expect("from_bytes");
    assert_eq!(parsed.iv, envelope.iv);
    assert_eq!(parsed.ciphertext, envelope.ciphertext);

    let recovered = open(&key, &parsed).expect("open after roundtrip");
    assert_eq!(recovered, b"payload");
}

#[test]
fn envelope_rejects_malformed_json() {
    assert!(Envelope::from_bytes(b"not json").is_err());
    assert!(Envelope::from_bytes(b"{\"iv\":\"!!!not-base64!!!\",\"ciphertext\":\"AA==\"}").is_err());
    assert!(Envelope::from_bytes(b"{\"iv\":\"AA==\"}").is_err());
}

// ---------------------------------------------------------------------------
// Key derivation (PBKDF2-HMAC-SHA256)
// ---------------------------------------------------------------------------

#[test]
fn derive_key_same_inputs_same_output() {
    let salt = generate_salt();

    let key1 = derive_key(b"my-secure-passphrase", &salt, &TEST_PARAMS).expect("derive 1");
    let key2 = derive_key(b"my-secure-passphrase", &salt, &TEST_PARAMS).expect("derive 2");

    assert_eq!(key1, key2, "same secret + salt must produce the same key");
}

#[test]
fn derive_key_different_salts_different_keys() {
    let salt1 = generate_salt();
    let salt2 = generate_salt();

    let key1 = derive_key(b"same-password", &salt1, &TEST_PARAMS).expect("derive 1");
    let key2 = derive_key(b"same-password", &salt2, &TEST_PARAMS).expect("derive 2");

    assert_ne!(key1, key2, "different salts must produce different keys");
}

#[test]
fn derive_key_different_secrets_different_keys() {
    let salt = generate_salt();

    let key1 = derive_key(b"password-one", &salt, &TEST_PARAMS).expect("derive 1");
    let key2 = derive_key(b"password-two", &salt, &TEST_PARAMS).expect("derive 2");

    assert_ne!(key1, key2);
}

#[test]
fn derive_key_iteration_count_changes_key() {
    let salt = generate_salt();

    let key1 = derive_key(b"pw", &salt, &KdfParams { iterations: 10_000 }).expect("derive 1");
    let key2 = derive_key(b"pw", &salt, &KdfParams { iterations: 20_000 }).expect("derive 2");

    assert_ne!(key1, key2);
}

#[test]
fn derive_key_rejects_bad_salt_length() {
    let result = derive_key(b"pw", &[0u8; 8], &TEST_PARAMS);
    assert!(matches!(
        result,
        Err(VaultKeeperError::KeyDerivationFailed(_))
    ));
}

#[test]
fn derive_key_rejects_weak_iteration_count() {
    let salt = generate_salt();
    let result = derive_key(b"pw", &salt, &KdfParams { iterations: 100 });
    assert!(matches!(
        result,
        Err(VaultKeeperError::KeyDerivationFailed(_))
    ));
}

#[test]
fn generate_salt_is_16_bytes_and_random() {
    let s1 = generate_salt();
    let s2 = generate_salt();
    assert_eq!(s1.len(), SALT_LEN);
    assert_ne!(s1, s2, "two salts must not collide");
}

// ---------------------------------------------------------------------------
// End-to-end: secret -> key -> seal/open
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt();

    let key = derive_key(b"CorrectH0rse!9", &salt, &TEST_PARAMS).expect("derive");

    let plaintext = b"[{\"id\":\"1\",\"name\":\"Mail\"}]";
    let envelope = seal(&key, plaintext).expect("seal");
    let recovered = open(&key, &envelope).expect("open");
    assert_eq!(recovered, plaintext.to_vec());

    // A key derived from a different secret cannot open it.
    let other = derive_key(b"WrongH0rse!9", &salt, &TEST_PARAMS).expect("derive other");
    assert!(open(&other, &envelope).is_err());
}
