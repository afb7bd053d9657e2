//! Authenticated encryption of single vault entries.
//!
//! Tokens use the Fernet layout so vault files stay readable by any
//! Fernet implementation.  Before URL-safe base64 encoding a token is:
//!
//! ```text
//! [0x80: 1 byte][timestamp: 8 bytes BE][IV: 16 bytes][AES-128-CBC ciphertext][HMAC-SHA256: 32 bytes]
//! ```
//!
//! The HMAC is computed with the signing half of the key over every
//! byte before it.  `decrypt` verifies it in constant time before any
//! decryption is attempted, so a wrong key and a tampered token fail
//! the same way.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::keys::{Key, HALF_LEN};
use crate::errors::{Result, VaultError};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Token format version byte.
const VERSION: u8 = 0x80;

const TIMESTAMP_LEN: usize = 8;

/// AES block size, also the IV length.
const IV_LEN: usize = 16;

const HMAC_LEN: usize = 32;

/// Version + timestamp + IV.
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;

/// Encrypts and decrypts tokens under one key.
pub struct CipherEngine {
    mac: HmacSha256,
    encryption: Zeroizing<[u8; HALF_LEN]>,
}

impl CipherEngine {
    /// Build an engine from a key.
    ///
    /// Fails with `InvalidKey` if the key is not 32 bytes of URL-safe
    /// base64.
    pub fn new(key: &Key) -> Result<Self> {
        let halves = key.halves()?;
        let mac = <HmacSha256 as Mac>::new_from_slice(&halves.signing[..])
            .map_err(|e| VaultError::InvalidKey(format!("HMAC init failed: {e}")))?;

        Ok(Self {
            mac,
            encryption: halves.encryption,
        })
    }

    /// Encrypt `plaintext` with a fresh IV, stamped with the current time.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        self.encrypt_at(plaintext, now)
    }

    /// Encrypt `plaintext` with a fresh IV and an explicit timestamp
    /// (Unix seconds).
    pub fn encrypt_at(&self, plaintext: &str, timestamp: u64) -> String {
        let mut iv = [0u8; IV_LEN];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        self.seal(plaintext.as_bytes(), timestamp, &iv)
    }

    fn seal(&self, plaintext: &[u8], timestamp: u64, iv: &[u8; IV_LEN]) -> String {
        let cipher = Aes128CbcEnc::new(
            GenericArray::from_slice(&self.encryption[..]),
            GenericArray::from_slice(iv),
        );
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(iv);
        token.extend_from_slice(&ciphertext);

        let mut mac = self.mac.clone();
        mac.update(&token);
        token.extend_from_slice(&mac.finalize().into_bytes());

        URL_SAFE.encode(&token)
    }

    /// Verify and decrypt a token.
    pub fn decrypt(&self, token: &str) -> Result<String> {
        self.decrypt_with_timestamp(token)
            .map(|(plaintext, _)| plaintext)
    }

    /// Verify and decrypt a token, also returning when it was issued.
    pub fn decrypt_with_timestamp(&self, token: &str) -> Result<(String, DateTime<Utc>)> {
        let data = decode_token(token)?;
        let (signed, tag) = data.split_at(data.len() - HMAC_LEN);

        let mut mac = self.mac.clone();
        mac.update(signed);
        let expected = mac.finalize().into_bytes();

        // Constant-time comparison to avoid timing side channels.
        if !bool::from(expected.as_slice().ct_eq(tag)) {
            return Err(VaultError::AuthenticationFailed);
        }

        let issued_at = timestamp_of(signed)?;
        let iv = &signed[1 + TIMESTAMP_LEN..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];

        let cipher = Aes128CbcDec::new(
            GenericArray::from_slice(&self.encryption[..]),
            GenericArray::from_slice(iv),
        );
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| VaultError::AuthenticationFailed)?;

        let plaintext = String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            VaultError::MalformedToken("plaintext is not valid UTF-8".into())
        })?;

        Ok((plaintext, issued_at))
    }
}

/// Read the issue time of a token without verifying it.
///
/// The value is unauthenticated; use it for display only.
pub fn token_timestamp(token: &str) -> Result<DateTime<Utc>> {
    let data = decode_token(token)?;
    timestamp_of(&data)
}

/// Base64-decode a token and check its framing.
fn decode_token(token: &str) -> Result<Vec<u8>> {
    let data = URL_SAFE
        .decode(token.trim())
        .map_err(|e| VaultError::MalformedToken(format!("invalid base64: {e}")))?;

    if data.len() < HEADER_LEN + HMAC_LEN {
        return Err(VaultError::MalformedToken(format!(
            "token too short ({} bytes)",
            data.len()
        )));
    }
    if data[0] != VERSION {
        return Err(VaultError::MalformedToken(format!(
            "unsupported token version 0x{:02x}",
            data[0]
        )));
    }

    Ok(data)
}

fn timestamp_of(data: &[u8]) -> Result<DateTime<Utc>> {
    let mut raw = [0u8; TIMESTAMP_LEN];
    raw.copy_from_slice(&data[1..1 + TIMESTAMP_LEN]);
    let seconds = i64::try_from(u64::from_be_bytes(raw))
        .map_err(|_| VaultError::MalformedToken("timestamp out of range".into()))?;

    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| VaultError::MalformedToken("timestamp out of range".into()))
}
