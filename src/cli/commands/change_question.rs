//! `vaultkeeper change-question` — replace the security question and
//! answer.
//!
//! Authorized by the master password alone; the old answer is being
//! replaced and cannot vouch for anything.

use crate::cli::output;
use crate::cli::{open_vault, prompt_input, prompt_new_answer, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `change-question` command.
pub fn execute(cli: &Cli, question: Option<&str>) -> Result<()> {
    let mut vault = open_vault(cli)?;

    output::info("Enter your master password to authorize the change.");
    let master = prompt_password()?;

    let new_question = match question {
        Some(q) => q.to_string(),
        None => prompt_input("New security question")?,
    };
    let new_answer = prompt_new_answer()?;

    vault.change_security_qa(&master, &new_question, &new_answer)?;

    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(
        &crate::cli::data_dir(cli)?,
        "change-question",
        None,
        Some("security question changed"),
    );

    output::success("Security question and answer changed.");
    Ok(())
}
