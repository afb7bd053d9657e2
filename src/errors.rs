use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SecureVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Key errors ---
    #[error("No key loaded — generate or load a key first")]
    KeyNotLoaded,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // --- Token errors ---
    #[error("Authentication failed — wrong key or tampered token")]
    AuthenticationFailed,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    // --- Vault errors ---
    #[error("File not found at {0}")]
    FileNotFound(PathBuf),

    #[error("File already exists at {0} (pass --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid site name: {0}")]
    InvalidSite(String),

    #[error("Site '{0}' not found in the vault")]
    EntryNotFound(String),

    #[error("Entry for '{0}' could not be decrypted when the vault was loaded")]
    EntryUnreadable(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Returns `true` for errors that only affect a single record.
    ///
    /// These are recovered locally during a load; everything else aborts
    /// the whole-file operation.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::MalformedToken(_)
                | Self::MalformedRecord(_)
                | Self::InvalidKey(_)
        )
    }
}

/// Convenience type alias for SecureVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
