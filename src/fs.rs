//! File-system capability used by the key manager and the vault store.
//!
//! The core never touches `std::fs` directly; it goes through `VaultFs`
//! so callers (and tests) can swap the backing storage.  A missing file
//! must be reported as `io::ErrorKind::NotFound` so the store can tell
//! "not found" apart from every other I/O failure.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Byte-level file operations the vault needs.
pub trait VaultFs {
    /// Read the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate `path` and write `bytes` to it.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Append `bytes` to the end of `path`, creating it if needed.
    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

impl<T: VaultFs + ?Sized> VaultFs for &T {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write(path, bytes)
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).append(path, bytes)
    }
}

/// The real file system.
///
/// Newly created files get owner-only permissions on Unix since both
/// the key file and the vault file are sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl OsFs {
    fn ensure_parent(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn open_options() -> OpenOptions {
        #[allow(unused_mut)]
        let mut options = OpenOptions::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
    }
}

impl VaultFs for OsFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        Self::ensure_parent(path)?;
        let mut file = Self::open_options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = Self::open_options().append(true).create(true).open(path)?;
        // One write call per record keeps lines whole for a single writer.
        file.write_all(bytes)?;
        file.flush()
    }
}
