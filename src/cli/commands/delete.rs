//! `vaultkeeper delete` — remove an entry from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, prompt_password, Cli};
use crate::errors::{Result, VaultKeeperError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultKeeperError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut vault = open_vault(cli)?;

    let master = prompt_password()?;
    vault.unlock(&master)?;

    let id = vault.entry_by_name(name)?.id.clone();
    vault.delete_entry(&id)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(&crate::cli::data_dir(cli)?, "delete", Some(name), None);

    output::success(&format!("Deleted entry '{name}'"));
    Ok(())
}
