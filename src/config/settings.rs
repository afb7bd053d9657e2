use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.securevault.toml`.
///
/// Every field has a sensible default so SecureVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Key file used when `--key` is not given.
    #[serde(default = "default_key_path")]
    pub key_path: String,

    /// Vault file used when `--vault` is not given.
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// Entries written into every newly created vault, in order.
    #[serde(default)]
    pub seed: Vec<SeedEntry>,
}

/// One `[[seed]]` table.
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    pub site: String,
    pub password: String,
}

impl fmt::Debug for SeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedEntry")
            .field("site", &self.site)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_path() -> String {
    "vault.key".to_string()
}

fn default_vault_path() -> String {
    "passwords.txt".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            vault_path: default_vault_path(),
            seed: Vec::new(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".securevault.toml";

    /// Load settings from `<dir>/.securevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    ///
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load_file(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            VaultError::ConfigError(format!("cannot read {}: {e}", config_path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        for entry in &settings.seed {
            crate::vault::format::validate_site(&entry.site).map_err(|e| {
                VaultError::ConfigError(format!("{}: seed entry: {e}", config_path.display()))
            })?;
        }

        Ok(settings)
    }

    /// Resolve the key path: CLI/env override first, then the config.
    pub fn resolve_key_path(&self, dir: &Path, cli_override: Option<&Path>) -> PathBuf {
        resolve(dir, cli_override, &self.key_path)
    }

    /// Resolve the vault path: CLI/env override first, then the config.
    pub fn resolve_vault_path(&self, dir: &Path, cli_override: Option<&Path>) -> PathBuf {
        resolve(dir, cli_override, &self.vault_path)
    }

    /// Seed entries as `(site, password)` pairs.
    pub fn seed_pairs(&self) -> Vec<(String, String)> {
        self.seed
            .iter()
            .map(|e| (e.site.clone(), e.password.clone()))
            .collect()
    }
}

fn resolve(dir: &Path, cli_override: Option<&Path>, configured: &str) -> PathBuf {
    match cli_override {
        Some(p) => p.to_path_buf(),
        None => dir.join(configured),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
