//! `vaultkeeper change-password` — replace the master password.
//!
//! Requires the current master password *and* the current security
//! answer: the recovery envelope must be re-sealed for the new password
//! in the same transaction, so both proofs are needed up front.  The
//! vault core guarantees that nothing is persisted unless every step
//! succeeds.

use crate::cli::output;
use crate::cli::{open_vault, prompt_answer, prompt_new_password, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `change-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_vault(cli)?;

    output::info("Enter your current master password.");
    let current = prompt_password()?;

    let answer = prompt_answer("Enter your security answer")?;

    output::info("Choose your new master password.");
    let new_password = prompt_new_password()?;

    vault.change_master_password(&current, &new_password, &answer)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(
        &crate::cli::data_dir(cli)?,
        "change-password",
        None,
        Some("master password changed"),
    );

    output::success("Master password changed.");
    Ok(())
}
