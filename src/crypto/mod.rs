//! Cryptographic primitives for SecureVault.
//!
//! This module provides:
//! - Vault key generation, persistence, and loading (`keys`)
//! - Fernet-compatible authenticated token encryption (`token`)

pub mod keys;
pub mod token;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Key, CipherEngine};
pub use keys::Key;
pub use token::{token_timestamp, CipherEngine};
