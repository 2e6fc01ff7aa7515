//! `vaultkeeper add` — add a credential entry.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, prompt_input, prompt_password, Cli};
use crate::errors::{Result, VaultKeeperError};
use crate::vault::EntryDraft;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    name: &str,
    username: Option<&str>,
    password: Option<&str>,
    website: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let master = prompt_password()?;
    vault.unlock(&master)?;

    let entry_username = match username {
        Some(u) => u.to_string(),
        None => prompt_input("Entry username/login")?,
    };

    let entry_password = match password {
        Some(p) => Zeroizing::new(p.to_string()),
        None => {
            let p = dialoguer::Password::new()
                .with_prompt("Entry password")
                .interact()
                .map_err(|e| VaultKeeperError::CommandFailed(format!("password prompt: {e}")))?;
            Zeroizing::new(p)
        }
    };

    let added = vault.add_entry(EntryDraft {
        name: name.to_string(),
        username: entry_username,
        password: entry_password.to_string(),
        website: website.map(str::to_string),
        notes: notes.map(str::to_string),
    })?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(&crate::cli::data_dir(cli)?, "add", Some(&added.name), None);

    output::success(&format!("Added entry '{}'", added.name));
    Ok(())
}
