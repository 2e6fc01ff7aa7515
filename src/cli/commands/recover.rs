//! `vaultkeeper recover` — regain access with the security answer.
//!
//! Shows the stored question, verifies the answer (including the
//! cross-check against the verification envelope), then walks the full
//! master-password reset.

use crate::cli::output;
use crate::cli::{open_vault, prompt_answer, prompt_new_password, Cli};
use crate::errors::Result;

/// Execute the `recover` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let question = vault.begin_recovery()?;
    output::info(&format!("Security question: {question}"));

    let answer = prompt_answer("Your answer")?;
    vault.verify_security_answer(&answer)?;
    output::success("Security answer verified.");

    output::info("Choose your new master password.");
    let new_password = prompt_new_password()?;
    vault.complete_password_reset(&new_password)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(
        &crate::cli::data_dir(cli)?,
        "recover",
        None,
        Some("master password reset via recovery"),
    );

    output::success("Master password reset. The vault is unlocked with the new password.");
    Ok(())
}
