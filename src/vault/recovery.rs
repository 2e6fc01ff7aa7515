//! Password recovery via the security answer.
//!
//! The recovery envelope holds the current master password sealed under
//! the answer-derived key.  Verifying an answer is therefore a decrypt,
//! but the recovered plaintext is never trusted on its own: it is
//! cross-checked by deriving a master key from it and opening the
//! verification envelope, so a stale or corrupted recovery envelope can
//! never hand out a wrong password as if it were valid.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{self, KdfParams, VaultKey};
use crate::errors::{Result, VaultKeeperError};
use crate::storage::RecordStore;

use super::controller::{verify_master_password, VERIFICATION_PAYLOAD};
use super::record;

/// Verify a security answer and recover the current master password.
///
/// Fails with `AuthenticationFailed` when the answer is wrong, and with
/// `DataInconsistency` when the answer opens the recovery envelope but
/// the recovered password fails the verification cross-check.
pub(crate) fn verify_security_answer<S: RecordStore>(
    store: &S,
    params: &KdfParams,
    answer_attempt: &str,
) -> Result<Zeroizing<String>> {
    let answer_salt = record::load_salt(store, record::ANSWER_SALT)?;
    let answer_key = VaultKey::new(crypto::derive_key(
        answer_attempt.as_bytes(),
        &answer_salt,
        params,
    )?);

    // A wrong answer fails the AEAD tag check here.
    let recovery_envelope = record::load_envelope(store, record::RECOVERY_ENVELOPE)?;
    let recovered_bytes = crypto::open(answer_key.as_bytes(), &recovery_envelope)?;

    let recovered = match String::from_utf8(recovered_bytes) {
        Ok(s) => Zeroizing::new(s),
        Err(e) => {
            let mut bad = e.into_bytes();
            bad.zeroize();
            return Err(VaultKeeperError::DataInconsistency(
                "recovery envelope did not decrypt to a valid password".into(),
            ));
        }
    };

    // Cross-check: the recovered password must actually open the vault.
    let master_salt = record::load_salt(store, record::MASTER_SALT)?;
    let candidate = VaultKey::new(crypto::derive_key(
        recovered.as_bytes(),
        &master_salt,
        params,
    )?);
    let verification = record::load_envelope(store, record::VERIFICATION_ENVELOPE)?;
    let mut payload = crypto::open(candidate.as_bytes(), &verification).map_err(|_| {
        VaultKeeperError::DataInconsistency(
            "security answer is correct but the recovered master password does not open the vault"
                .into(),
        )
    })?;
    let ok = bool::from(payload.ct_eq(VERIFICATION_PAYLOAD));
    payload.zeroize();
    if !ok {
        return Err(VaultKeeperError::DataInconsistency(
            "security answer is correct but the recovered master password does not open the vault"
                .into(),
        ));
    }

    Ok(recovered)
}

/// Replace the security question and answer.
///
/// The master password is the only possible guard here — the answer is
/// the thing being replaced.  A new answer salt is generated (the old
/// one must never key the new answer), the already-authenticated master
/// password is resealed under the new answer key, and question, salt,
/// and envelope are persisted only after all crypto succeeded.
pub(crate) fn change_security_qa<S: RecordStore>(
    store: &mut S,
    params: &KdfParams,
    master_attempt: &str,
    new_question: &str,
    new_answer: &str,
) -> Result<()> {
    verify_master_password(store, params, master_attempt)?;

    let new_answer_salt = crypto::generate_salt();
    let new_answer_key = VaultKey::new(crypto::derive_key(
        new_answer.as_bytes(),
        &new_answer_salt,
        params,
    )?);

    let new_recovery_envelope = crypto::seal(new_answer_key.as_bytes(), master_attempt.as_bytes())?;

    record::save_string(store, record::SECURITY_QUESTION, new_question)?;
    record::save_salt(store, record::ANSWER_SALT, &new_answer_salt)?;
    record::save_envelope(store, record::RECOVERY_ENVELOPE, &new_recovery_envelope)?;

    Ok(())
}
