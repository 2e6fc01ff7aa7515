//! `vaultkeeper question` — print the stored security question.
//!
//! Readable without authentication; it has to be shown before the
//! answer can be asked for.

use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `question` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let question = vault.security_question()?;
    println!("{question}");
    Ok(())
}
