//! Vault module — the credential-vault state machine.
//!
//! This module provides:
//! - Persisted record names and their typed encodings (`record`)
//! - `CredentialEntry`, the in-session `EntryStore`, and the rekey
//!   transaction (`entries`)
//! - Security-answer verification and Q&A rotation (`recovery`)
//! - The `Vault` lifecycle controller (`controller`)

pub mod controller;
pub mod entries;
pub mod record;
pub mod recovery;

// Re-export the most commonly used items.
pub use controller::{Vault, VaultState};
pub use entries::{CredentialEntry, EntryDraft};
