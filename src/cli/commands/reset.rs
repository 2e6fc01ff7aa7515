//! `vaultkeeper reset` — permanently delete the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultKeeperError};

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(
                "Completely reset the vault? All entries will be lost and cannot be recovered",
            )
            .default(false)
            .interact()
            .map_err(|e| VaultKeeperError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut vault = open_vault(cli)?;
    vault.full_reset()?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(&crate::cli::data_dir(cli)?, "reset", None, Some("vault deleted"));

    output::success("Vault deleted. Run `vaultkeeper init` to start fresh.");
    Ok(())
}
