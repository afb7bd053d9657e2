//! Vault module — encrypted password storage.
//!
//! This module provides:
//! - Entry values, metadata, and operation reports (`entry`)
//! - The line-oriented vault file format (`format`)
//! - High-level `VaultStore` for creating, loading, and adding entries (`store`)
//! - A mutex-guarded `SharedVault` for multi-threaded callers (`shared`)

pub mod entry;
pub mod format;
pub mod shared;
pub mod store;

// Re-export the most commonly used items.
pub use entry::{
    AppendOutcome, Entry, EntryMetadata, EntryValue, LoadReport, Persistence, RecordFailure,
    DECRYPTION_FAILED_MARKER,
};
pub use shared::SharedVault;
pub use store::{VaultState, VaultStore};
