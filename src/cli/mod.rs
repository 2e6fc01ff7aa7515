//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultKeeperError};
use crate::storage::FileRecordStore;
use crate::vault::Vault;

/// Minimum master-password length to prevent trivially weak passwords.
/// Enforced at the prompt boundary only; the core imposes no policy.
const MIN_PASSWORD_LEN: usize = 8;

/// VaultKeeper CLI: encrypted credential vault with security-question
/// recovery.
#[derive(Parser)]
#[command(
    name = "vaultkeeper",
    about = "Encrypted credential vault with security-question recovery",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault data directory (default: .vaultkeeper, or `data_dir` from
    /// .vaultkeeper.toml)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Set up a new vault (username, master password, security question)
    Init {
        /// Username for this vault (omit for interactive prompt)
        #[arg(long)]
        username: Option<String>,

        /// Security question (omit for interactive prompt)
        #[arg(long)]
        question: Option<String>,
    },

    /// Add a credential entry
    Add {
        /// Display name of the entry (e.g. "Mail")
        name: String,

        /// Username/login stored in the entry (omit for interactive prompt)
        #[arg(long)]
        username: Option<String>,

        /// Password stored in the entry (omit for interactive prompt)
        #[arg(long)]
        password: Option<String>,

        /// Website URL
        #[arg(long)]
        website: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all entries (names and metadata, no passwords)
    List,

    /// Show a single entry
    Show {
        /// Display name of the entry
        name: String,

        /// Print the stored password instead of masking it
        #[arg(long)]
        reveal: bool,

        /// Copy the stored password to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Edit an entry (replaces the given fields)
    Edit {
        /// Display name of the entry to edit
        name: String,

        /// New display name
        #[arg(long)]
        rename: Option<String>,

        /// New username/login
        #[arg(long)]
        username: Option<String>,

        /// New password (omit to keep, pass empty prompt to re-enter)
        #[arg(long)]
        password: Option<String>,

        /// New website URL
        #[arg(long)]
        website: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Display name of the entry
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the vault's master password
    ChangePassword,

    /// Change the security question and answer
    ChangeQuestion {
        /// New security question (omit for interactive prompt)
        #[arg(long)]
        question: Option<String>,
    },

    /// Recover access with the security answer and set a new master password
    Recover,

    /// Show the security question for this vault
    Question,

    /// Permanently delete the vault and all entries
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View the audit log of vault operations
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault data directory: `--data-dir` flag, then
/// `.vaultkeeper.toml`, then the built-in default.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => Settings::load(&cwd)?.data_dir,
    };
    Ok(cwd.join(dir))
}

/// Open the vault over the file-backed store.
///
/// The KDF cost comes from `.vaultkeeper.toml` for new vaults; an
/// existing vault always re-derives with the cost it was created with.
pub fn open_vault(cli: &Cli) -> Result<Vault<FileRecordStore>> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let store = FileRecordStore::open(&data_dir(cli)?)?;
    Vault::new(store, settings.kdf_params())
}

/// Get the master password, trying in order:
/// 1. `VAULTKEEPER_PASSWORD` env var (CI/scripting)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("VAULTKEEPER_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultKeeperError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during
/// `init`, `change-password`, and `recover`).
///
/// Also respects `VAULTKEEPER_NEW_PASSWORD` for scripted usage.
/// Enforces the minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("VAULTKEEPER_NEW_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultKeeperError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation("Confirm master password", "Passwords do not match, try again")
            .interact()
            .map_err(|e| VaultKeeperError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Get the current security answer, trying `VAULTKEEPER_ANSWER` first.
pub fn prompt_answer(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(answer) = std::env::var("VAULTKEEPER_ANSWER") {
        if !answer.is_empty() {
            return Ok(Zeroizing::new(answer));
        }
    }

    let answer = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultKeeperError::CommandFailed(format!("answer prompt: {e}")))?;
    Ok(Zeroizing::new(answer))
}

/// Prompt for a new security answer with confirmation.
///
/// Respects `VAULTKEEPER_NEW_ANSWER` for scripted usage.
pub fn prompt_new_answer() -> Result<Zeroizing<String>> {
    if let Ok(answer) = std::env::var("VAULTKEEPER_NEW_ANSWER") {
        if !answer.is_empty() {
            return Ok(Zeroizing::new(answer));
        }
    }

    let answer = dialoguer::Password::new()
        .with_prompt("Choose security answer")
        .with_confirmation("Confirm security answer", "Answers do not match, try again")
        .interact()
        .map_err(|e| VaultKeeperError::CommandFailed(format!("answer prompt: {e}")))?;
    Ok(Zeroizing::new(answer))
}

/// Prompt for a free-text value (username, question, etc.) when it was
/// not passed as a flag.
pub fn prompt_input(prompt: &str) -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| VaultKeeperError::CommandFailed(format!("input prompt: {e}")))
}
