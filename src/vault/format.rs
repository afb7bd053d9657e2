//! Line-oriented vault file format.
//!
//! A vault file is UTF-8 text with one record per line:
//!
//! ```text
//! <site>:<token>\n
//! ```
//!
//! - **Site**: the entry name.  Must be non-empty, must not contain the
//!   `:` delimiter or a line break, and must not start or end with
//!   whitespace (lines are trimmed on load).
//! - **Token**: a URL-safe base64 token from `CipherEngine`.
//!
//! There is no header, footer, or file-level checksum.  The file is an
//! append-only log: the same site may appear on several lines and the
//! last one wins when loading.  Lines without a delimiter are ignored.

use crate::errors::{Result, VaultError};

/// Separator between the site and the token.
pub const DELIMITER: char = ':';

/// Maximum accepted site length in bytes.
const MAX_SITE_LEN: usize = 256;

/// One parsed record line, borrowing from the file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub site: &'a str,
    pub token: &'a str,
}

/// Parse one line of a vault file.
///
/// Returns `None` for lines without a delimiter (blank lines, comments,
/// truncated writes).  Otherwise the trimmed line is split on the
/// **first** delimiter; the token part is returned as-is.
pub fn parse_line(line: &str) -> Option<Record<'_>> {
    let (site, token) = line.trim().split_once(DELIMITER)?;
    Some(Record { site, token })
}

/// Render a record as a newline-terminated line.
pub fn format_record(site: &str, token: &str) -> Result<String> {
    validate_site(site)?;
    Ok(format!("{site}{DELIMITER}{token}\n"))
}

/// Check that a site name can be written without making the line
/// ambiguous.
pub fn validate_site(site: &str) -> Result<()> {
    if site.is_empty() {
        return Err(VaultError::InvalidSite("site name cannot be empty".into()));
    }
    if site.len() > MAX_SITE_LEN {
        return Err(VaultError::InvalidSite(format!(
            "site name cannot exceed {MAX_SITE_LEN} bytes"
        )));
    }
    if site.contains(DELIMITER) {
        return Err(VaultError::InvalidSite(format!(
            "'{site}' contains the '{DELIMITER}' delimiter"
        )));
    }
    if site.contains(['\n', '\r']) {
        return Err(VaultError::InvalidSite(
            "site name cannot contain line breaks".into(),
        ));
    }
    if site.trim() != site {
        return Err(VaultError::InvalidSite(format!(
            "'{site}' cannot start or end with whitespace"
        )));
    }
    Ok(())
}
