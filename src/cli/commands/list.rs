//! `vaultkeeper list` — list all entries (no passwords).

use crate::cli::output;
use crate::cli::{open_vault, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let master = prompt_password()?;
    vault.unlock(&master)?;

    if vault.entries_tainted() {
        output::warning("Vault entries are corrupted or unreadable. Reset the vault if this persists.");
    }

    output::print_entries_table(vault.entries()?);
    Ok(())
}
