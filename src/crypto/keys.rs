//! Vault key generation, persistence, and loading.
//!
//! A key is 32 random bytes stored as URL-safe base64 text (44 bytes).
//! The first 16 decoded bytes are the HMAC signing key and the last 16
//! are the AES-128 encryption key.
//!
//! The key file holds the key bytes verbatim: no header, no checksum.
//! Loading does not validate the shape of the key; a malformed key is
//! only detected when a `CipherEngine` is built from it.

use std::fmt;
use std::io;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, VaultError};
use crate::fs::{OsFs, VaultFs};

/// Length of the decoded key material (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of each half of the decoded key (signing, encryption).
pub const HALF_LEN: usize = KEY_LEN / 2;

/// The vault key, zeroed in memory when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Key {
    bytes: Vec<u8>,
}

/// Decoded key halves, zeroed on drop.
pub(crate) struct KeyHalves {
    pub signing: Zeroizing<[u8; HALF_LEN]>,
    pub encryption: Zeroizing<[u8; HALF_LEN]>,
}

impl Key {
    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        rand::rngs::OsRng.fill_bytes(&mut raw[..]);
        Self {
            bytes: URL_SAFE.encode(&raw[..]).into_bytes(),
        }
    }

    /// Wrap key bytes exactly as they appear in a key file.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The key bytes as written to the key file.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the key to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_with(&OsFs, path)
    }

    /// Write the key through an explicit file-system capability.
    pub fn save_with<F: VaultFs + ?Sized>(&self, fs: &F, path: &Path) -> Result<()> {
        fs.write(path, &self.bytes)?;
        tracing::debug!(path = %path.display(), "key saved");
        Ok(())
    }

    /// Read a key from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(&OsFs, path)
    }

    /// Read a key through an explicit file-system capability.
    pub fn load_with<F: VaultFs + ?Sized>(fs: &F, path: &Path) -> Result<Self> {
        let bytes = fs.read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => VaultError::FileNotFound(path.to_path_buf()),
            _ => VaultError::Io(e),
        })?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "key loaded");
        Ok(Self { bytes })
    }

    /// Decode the key into its signing and encryption halves.
    ///
    /// Surrounding whitespace (e.g. a trailing newline added by an
    /// editor) is ignored.
    pub(crate) fn halves(&self) -> Result<KeyHalves> {
        let text = self.bytes.trim_ascii();
        let mut decoded = URL_SAFE
            .decode(text)
            .map_err(|_| VaultError::InvalidKey("key is not URL-safe base64".into()))?;

        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(VaultError::InvalidKey(format!(
                "key must decode to {KEY_LEN} bytes, got {len}"
            )));
        }

        let mut signing = Zeroizing::new([0u8; HALF_LEN]);
        let mut encryption = Zeroizing::new([0u8; HALF_LEN]);
        signing.copy_from_slice(&decoded[..HALF_LEN]);
        encryption.copy_from_slice(&decoded[HALF_LEN..]);
        decoded.zeroize();

        Ok(KeyHalves {
            signing,
            encryption,
        })
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key([REDACTED {} bytes])", self.bytes.len())
    }
}
