use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultKeeperError};

/// User-level configuration, loaded from `.vaultkeeper.toml`.
///
/// Every field has a sensible default so VaultKeeper works
/// out-of-the-box without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory where vault records are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// PBKDF2 iteration count used when creating a vault
    /// (default: 250 000).  Existing vaults always open with the count
    /// they were created with.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".vaultkeeper".to_string()
}

fn default_kdf_iterations() -> u32 {
    250_000
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".vaultkeeper.toml";

    /// Load settings from `<dir>/.vaultkeeper.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultKeeperError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the full path to the data directory.
    pub fn data_dir_path(&self, base: &Path) -> PathBuf {
        base.join(&self.data_dir)
    }

    /// Convert the configured iteration count into crypto-layer params.
    pub fn kdf_params(&self) -> crate::crypto::KdfParams {
        crate::crypto::KdfParams {
            iterations: self.kdf_iterations,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.data_dir, ".vaultkeeper");
        assert_eq!(s.kdf_iterations, 250_000);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, ".vaultkeeper");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
data_dir = "secrets"
kdf_iterations = 300000
"#;
        fs::write(tmp.path().join(".vaultkeeper.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "secrets");
        assert_eq!(settings.kdf_iterations, 300_000);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let config = "data_dir = \"vault-data\"\n";
        fs::write(tmp.path().join(".vaultkeeper.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "vault-data");
        assert_eq!(settings.kdf_iterations, 250_000);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".vaultkeeper.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn data_dir_path_builds_correct_path() {
        let s = Settings::default();
        let base = Path::new("/home/user");
        assert_eq!(
            s.data_dir_path(base),
            PathBuf::from("/home/user/.vaultkeeper")
        );
    }
}
