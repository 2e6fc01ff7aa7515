//! `vaultkeeper show` — display a single entry.
//!
//! The stored password stays masked unless `--reveal` is passed;
//! `--copy` puts it on the clipboard without printing it at all.

use crate::cli::output;
use crate::cli::{open_vault, prompt_password, Cli};
use crate::errors::{Result, VaultKeeperError};

/// Execute the `show` command.
pub fn execute(cli: &Cli, name: &str, reveal: bool, copy: bool) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let master = prompt_password()?;
    vault.unlock(&master)?;

    let entry = vault.entry_by_name(name)?;

    println!("Name:     {}", entry.name);
    println!("Username: {}", entry.username);
    if reveal {
        println!("Password: {}", entry.password);
    } else {
        println!("Password: ********");
    }
    if let Some(website) = &entry.website {
        println!("Website:  {website}");
    }
    if let Some(notes) = &entry.notes {
        println!("Notes:    {notes}");
    }
    println!("Updated:  {}", entry.updated_at.format("%Y-%m-%d %H:%M:%S"));

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| VaultKeeperError::CommandFailed(format!("clipboard: {e}")))?;
        clipboard
            .set_text(entry.password.clone())
            .map_err(|e| VaultKeeperError::CommandFailed(format!("clipboard: {e}")))?;
        output::success("Password copied to clipboard.");
    } else if !reveal {
        output::tip("Pass --reveal to print the password, or --copy to copy it.");
    }

    Ok(())
}
