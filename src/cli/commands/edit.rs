//! `vaultkeeper edit` — replace fields of an existing entry.
//!
//! Only the flags that were passed change; everything else keeps its
//! current value.  The entry id and creation time never change.

use crate::cli::output;
use crate::cli::{open_vault, prompt_password, Cli};
use crate::errors::Result;
use crate::vault::EntryDraft;

/// Execute the `edit` command.
pub fn execute(
    cli: &Cli,
    name: &str,
    rename: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    website: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let master = prompt_password()?;
    vault.unlock(&master)?;

    let current = vault.entry_by_name(name)?;
    let id = current.id.clone();
    let draft = EntryDraft {
        name: rename.unwrap_or(&current.name).to_string(),
        username: username.unwrap_or(&current.username).to_string(),
        password: password.unwrap_or(&current.password).to_string(),
        website: website
            .map(str::to_string)
            .or_else(|| current.website.clone()),
        notes: notes.map(str::to_string).or_else(|| current.notes.clone()),
    };

    let updated = vault.update_entry(&id, draft)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(&crate::cli::data_dir(cli)?, "edit", Some(&updated.name), None);

    output::success(&format!("Updated entry '{}'", updated.name));
    Ok(())
}
