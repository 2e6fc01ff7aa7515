use thiserror::Error;

/// All errors that can occur in VaultKeeper.
///
/// Messages never carry key material, passwords, answers, or decrypted
/// entry data — only which step failed.
#[derive(Debug, Error)]
pub enum VaultKeeperError {
    // --- Authentication / consistency ---
    #[error("Authentication failed — master password or security answer is incorrect")]
    AuthenticationFailed,

    #[error("Vault data is inconsistent: {0}")]
    DataInconsistency(String),

    #[error("Vault record '{0}' is missing — the vault may need to be set up or reset")]
    MissingData(String),

    // --- Crypto primitive errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Vault is already set up")]
    AlreadyInitialized,

    #[error("Operation not allowed: {0}")]
    InvalidState(String),

    #[error("Invalid vault data format: {0}")]
    InvalidFormat(String),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for VaultKeeper results.
pub type Result<T> = std::result::Result<T, VaultKeeperError>;
