//! `vaultkeeper init` — set up a new vault.

use crate::cli::output;
use crate::cli::{data_dir, open_vault, prompt_input, prompt_new_answer, prompt_new_password, Cli};
use crate::errors::{Result, VaultKeeperError};
use crate::vault::VaultState;

/// Execute the `init` command.
pub fn execute(cli: &Cli, username: Option<&str>, question: Option<&str>) -> Result<()> {
    let mut vault = open_vault(cli)?;

    if vault.state()? != VaultState::Uninitialized {
        output::tip("Use `vaultkeeper reset` first if you really want to start over.");
        return Err(VaultKeeperError::AlreadyInitialized);
    }

    let username = match username {
        Some(u) => u.to_string(),
        None => prompt_input("Choose a username")?,
    };

    let password = prompt_new_password()?;

    let question = match question {
        Some(q) => q.to_string(),
        None => prompt_input("Choose a security question")?,
    };
    let answer = prompt_new_answer()?;

    vault.setup(&username, &password, &question, &answer)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(&data_dir(cli)?, "init", None, Some("vault created"));

    output::success(&format!(
        "Vault created for '{username}' at {}",
        data_dir(cli)?.display()
    ));
    output::warning(
        "Remember your master password and security answer — there is no other way in.",
    );
    output::tip("Run `vaultkeeper add <name>` to add a credential.");
    output::tip("Run `vaultkeeper list` to see all entries.");

    Ok(())
}
