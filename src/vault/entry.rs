//! In-memory vault entries and the reports returned by store operations.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Text shown in place of a password that could not be decrypted.
pub const DECRYPTION_FAILED_MARKER: &str = "[DECRYPTION FAILED]";

/// The value held for a site in memory.
#[derive(Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// The decrypted password.
    Password(Zeroizing<String>),

    /// A record for this site was present but could not be decrypted.
    DecryptionFailed,
}

impl EntryValue {
    /// Returns the password, or `None` for the failure sentinel.
    pub fn as_password(&self) -> Option<&str> {
        match self {
            Self::Password(p) => Some(p.as_str()),
            Self::DecryptionFailed => None,
        }
    }

    /// Returns `true` for the failure sentinel.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::DecryptionFailed)
    }
}

impl fmt::Debug for EntryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password([REDACTED])"),
            Self::DecryptionFailed => f.write_str("DecryptionFailed"),
        }
    }
}

/// A site's value plus when its record was written, if known.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: EntryValue,
    pub written_at: Option<DateTime<Utc>>,
}

/// Lightweight metadata about an entry (no password).
///
/// Returned by `VaultStore::list_entries` so callers can display site
/// names without touching plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub site: String,
    pub readable: bool,
    pub written_at: Option<DateTime<Utc>>,
}

/// Whether an added entry reached the vault file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Encrypted and appended to the active vault file.
    Written,

    /// Stored in memory only; no vault file is bound.
    MemoryOnly,
}

/// Result of writing one initial entry while creating a vault.
#[derive(Debug)]
pub struct AppendOutcome {
    pub site: String,
    pub result: Result<()>,
}

/// A record that could not be turned into a readable entry on load.
#[derive(Debug)]
pub struct RecordFailure {
    /// 1-based line number in the vault file.
    pub line: usize,
    pub site: String,
    pub error: VaultError,
}

/// Summary of a vault load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Lines that had a delimiter and were processed as records.
    pub records: usize,

    /// Lines ignored because they had no delimiter.
    pub skipped_lines: usize,

    /// Records that failed, in file order.
    pub failures: Vec<RecordFailure>,
}

impl LoadReport {
    /// Returns `true` if every record decrypted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Sites with at least one failed record, in file order, deduplicated.
    pub fn failed_sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !sites.contains(&failure.site.as_str()) {
                sites.push(&failure.site);
            }
        }
        sites
    }
}
