//! Thread-safe wrapper around `VaultStore`.
//!
//! Each call holds one lock for its whole read-modify-write, so two
//! threads appending at once can never interleave their records in the
//! vault file.  This does not protect against other processes writing
//! to the same file.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::crypto::Key;
use crate::errors::Result;
use crate::fs::{OsFs, VaultFs};

use super::entry::{AppendOutcome, EntryMetadata, EntryValue, LoadReport, Persistence};
use super::store::{VaultState, VaultStore};

/// A `VaultStore` behind a single mutex.
pub struct SharedVault<F: VaultFs = OsFs> {
    inner: Mutex<VaultStore<F>>,
}

impl<F: VaultFs> SharedVault<F> {
    pub fn new(store: VaultStore<F>) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Lock the store for a sequence of operations.
    ///
    /// A poisoned lock is recovered: the store's methods leave it
    /// consistent even if a caller panicked mid-way.
    pub fn lock(&self) -> MutexGuard<'_, VaultStore<F>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_key(&self, key: Key) {
        self.lock().set_key(key);
    }

    pub fn initialize_empty<S, P>(&self, path: &Path, initial: &[(S, P)]) -> Result<Vec<AppendOutcome>>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        self.lock().initialize_empty(path, initial)
    }

    pub fn load(&self, path: &Path) -> Result<LoadReport> {
        self.lock().load(path)
    }

    pub fn append_entry(&self, site: &str, password: &str) -> Result<Persistence> {
        self.lock().append_entry(site, password)
    }

    /// Look up a site, returning an owned copy of its value.
    pub fn get(&self, site: &str) -> Option<EntryValue> {
        self.lock().get(site).cloned()
    }

    pub fn list_entries(&self) -> Vec<EntryMetadata> {
        self.lock().list_entries()
    }

    pub fn state(&self) -> VaultState {
        self.lock().state()
    }

    /// Unwrap the inner store.
    pub fn into_inner(self) -> VaultStore<F> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
