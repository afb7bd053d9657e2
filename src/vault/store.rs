//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` owns the key, the active vault file path, and the
//! in-memory map of site -> password.  Every record written goes
//! through `CipherEngine::encrypt`; every record loaded goes through
//! `CipherEngine::decrypt`, one line at a time, so a single corrupted
//! line never takes the rest of the vault down with it.
//!
//! The store moves through three states:
//!
//! ```text
//! Uninitialized --set_key--> KeyReady --initialize_empty/load--> FileBound
//!                                         FileBound --initialize_empty/load--> FileBound
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::{CipherEngine, Key};
use crate::errors::{Result, VaultError};
use crate::fs::{OsFs, VaultFs};

use super::entry::{
    AppendOutcome, Entry, EntryMetadata, EntryValue, LoadReport, Persistence, RecordFailure,
};
use super::format;

/// Where a `VaultStore` is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No key set.
    Uninitialized,
    /// Key set, no vault file bound.
    KeyReady,
    /// Key set and a vault file is active.
    FileBound,
}

/// The main vault handle.
pub struct VaultStore<F: VaultFs = OsFs> {
    /// File-system capability used for every read and write.
    fs: F,

    /// The vault key (zeroized on drop).
    key: Option<Key>,

    /// The active vault file, if any.
    path: Option<PathBuf>,

    /// In-memory map of site -> entry.
    entries: HashMap<String, Entry>,
}

impl VaultStore<OsFs> {
    /// Create an empty store backed by the real file system.
    pub fn new() -> Self {
        Self::with_fs(OsFs)
    }
}

impl Default for VaultStore<OsFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: VaultFs> VaultStore<F> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty store over an explicit file-system capability.
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            key: None,
            path: None,
            entries: HashMap::new(),
        }
    }

    /// Set (or replace) the vault key.
    ///
    /// A vault file only ever holds records under one key, so replacing
    /// the key of a bound store unbinds the file and clears the map: the
    /// store goes back to `KeyReady` and a vault has to be created or
    /// loaded again under the new key.
    pub fn set_key(&mut self, key: Key) {
        if let Some(path) = self.path.take() {
            self.entries.clear();
            tracing::debug!(path = %path.display(), "key replaced; vault file unbound");
        }
        self.key = Some(key);
        tracing::debug!("vault key set");
    }

    // ------------------------------------------------------------------
    // File operations
    // ------------------------------------------------------------------

    /// Create (or truncate) the vault file at `path` and bind it.
    ///
    /// The in-memory map is cleared, then each `(site, password)` pair
    /// is encrypted and appended in order.  Pairs are independent: a
    /// failure on one does not undo the ones before it, and the
    /// returned list has one outcome per pair.
    pub fn initialize_empty<S, P>(
        &mut self,
        path: &Path,
        initial: &[(S, P)],
    ) -> Result<Vec<AppendOutcome>>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let engine = self.engine()?;

        self.fs.write(path, b"")?;
        self.path = Some(path.to_path_buf());
        self.entries.clear();
        tracing::debug!(path = %path.display(), "vault file initialized");

        let outcomes = initial
            .iter()
            .map(|(site, password)| {
                let site = site.as_ref();
                let result = self.write_record(&engine, path, site, password.as_ref());
                if let Err(ref e) = result {
                    tracing::warn!(site, error = %e, "initial entry not written");
                }
                AppendOutcome {
                    site: site.to_string(),
                    result,
                }
            })
            .collect();

        Ok(outcomes)
    }

    /// Load and decrypt every record of the vault file at `path`.
    ///
    /// On success the in-memory map is replaced by the file's contents
    /// and `path` becomes the active file.  Records that fail to
    /// decrypt are stored as `EntryValue::DecryptionFailed` and listed
    /// in the returned report; they never abort the load.
    pub fn load(&mut self, path: &Path) -> Result<LoadReport> {
        let key = self.key.as_ref().ok_or(VaultError::KeyNotLoaded)?;

        let bytes = self.fs.read(path).map_err(|e| not_found_or_io(e, path))?;
        let text = String::from_utf8_lossy(&bytes);

        // A malformed key makes every record fail; report it per record.
        let engine = CipherEngine::new(key).map_err(|e| match e {
            VaultError::InvalidKey(msg) => msg,
            other => other.to_string(),
        });

        self.entries.clear();
        self.path = Some(path.to_path_buf());

        let mut report = LoadReport::default();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;

            let Some(record) = format::parse_line(line) else {
                report.skipped_lines += 1;
                continue;
            };
            report.records += 1;

            // An empty site is still a record; it is only refused at write time.
            let decrypted = match &engine {
                Ok(engine) => engine
                    .decrypt_with_timestamp(record.token)
                    .map_err(|e| match e {
                        VaultError::MalformedToken(msg) => {
                            VaultError::MalformedRecord(format!("line {line_no}: {msg}"))
                        }
                        other => other,
                    }),
                Err(msg) => Err(VaultError::InvalidKey(msg.clone())),
            };

            match decrypted {
                Ok((password, written_at)) => {
                    self.entries.insert(
                        record.site.to_string(),
                        Entry {
                            value: EntryValue::Password(Zeroizing::new(password)),
                            written_at: Some(written_at),
                        },
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        site = record.site,
                        line = line_no,
                        error = %error,
                        "could not decrypt entry; data may be corrupted or the key is wrong"
                    );
                    self.entries.insert(
                        record.site.to_string(),
                        Entry {
                            value: EntryValue::DecryptionFailed,
                            written_at: None,
                        },
                    );
                    report.failures.push(RecordFailure {
                        line: line_no,
                        site: record.site.to_string(),
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            records = report.records,
            skipped = report.skipped_lines,
            failed = report.failures.len(),
            "vault loaded"
        );

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add or replace the password for `site`.
    ///
    /// The in-memory map is always updated first.  If a vault file is
    /// bound the entry is also encrypted and appended to it; if that
    /// write fails the error is returned but the in-memory value stays.
    pub fn append_entry(&mut self, site: &str, password: &str) -> Result<Persistence> {
        if self.key.is_none() {
            return Err(VaultError::KeyNotLoaded);
        }
        format::validate_site(site)?;

        self.insert_password(site, password);

        let Some(path) = self.path.clone() else {
            tracing::debug!(site, "entry added to memory only");
            return Ok(Persistence::MemoryOnly);
        };

        let engine = self.engine()?;
        let token = engine.encrypt(password);
        let line = format::format_record(site, &token)?;
        self.fs.append(&path, line.as_bytes())?;

        tracing::debug!(site, path = %path.display(), "entry appended");
        Ok(Persistence::Written)
    }

    /// Look up a site.  No decryption happens here.
    ///
    /// `None` means the site is not in the vault.
    pub fn get(&self, site: &str) -> Option<&EntryValue> {
        self.entries.get(site).map(|entry| &entry.value)
    }

    /// Look up a site's password, turning the sentinel into an error.
    pub fn get_password(&self, site: &str) -> Result<&str> {
        match self.get(site) {
            Some(EntryValue::Password(p)) => Ok(p.as_str()),
            Some(EntryValue::DecryptionFailed) => Err(VaultError::EntryUnreadable(site.into())),
            None => Err(VaultError::EntryNotFound(site.into())),
        }
    }

    /// List metadata for all entries, sorted by site.
    pub fn list_entries(&self) -> Vec<EntryMetadata> {
        let mut list: Vec<EntryMetadata> = self
            .entries
            .iter()
            .map(|(site, entry)| EntryMetadata {
                site: site.clone(),
                readable: !entry.value.is_failed(),
                written_at: entry.written_at,
            })
            .collect();

        list.sort_by(|a, b| a.site.cmp(&b.site));
        list
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        match (&self.key, &self.path) {
            (None, _) => VaultState::Uninitialized,
            (Some(_), None) => VaultState::KeyReady,
            (Some(_), Some(_)) => VaultState::FileBound,
        }
    }

    /// Returns `true` once a key has been set.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// The active vault file, if one is bound.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of sites in memory (including failed ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no sites are in memory.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the site is in memory.
    pub fn contains(&self, site: &str) -> bool {
        self.entries.contains_key(site)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn engine(&self) -> Result<CipherEngine> {
        let key = self.key.as_ref().ok_or(VaultError::KeyNotLoaded)?;
        CipherEngine::new(key)
    }

    fn insert_password(&mut self, site: &str, password: &str) {
        self.entries.insert(
            site.to_string(),
            Entry {
                value: EntryValue::Password(Zeroizing::new(password.to_string())),
                written_at: Some(Utc::now()),
            },
        );
    }

    /// Encrypt and append one record, then mirror it in memory.
    fn write_record(
        &mut self,
        engine: &CipherEngine,
        path: &Path,
        site: &str,
        password: &str,
    ) -> Result<()> {
        let line = format::format_record(site, &engine.encrypt(password))?;
        self.fs.append(path, line.as_bytes())?;
        self.insert_password(site, password);
        Ok(())
    }
}

fn not_found_or_io(e: io::Error, path: &Path) -> VaultError {
    match e.kind() {
        io::ErrorKind::NotFound => VaultError::FileNotFound(path.to_path_buf()),
        _ => VaultError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory file system that can be told to fail appends.
    #[derive(Default)]
    struct MemFs {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
        fail_appends: bool,
    }

    impl VaultFs for MemFs {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), bytes.to_vec());
            Ok(())
        }

        fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
            if self.fail_appends {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.files
                .borrow_mut()
                .entry(path.to_path_buf())
                .or_default()
                .extend_from_slice(bytes);
            Ok(())
        }
    }

    fn keyed(fs: MemFs) -> VaultStore<MemFs> {
        let mut store = VaultStore::with_fs(fs);
        store.set_key(Key::generate());
        store
    }

    #[test]
    fn state_machine_transitions() {
        let mut store = VaultStore::with_fs(MemFs::default());
        assert_eq!(store.state(), VaultState::Uninitialized);

        store.set_key(Key::generate());
        assert_eq!(store.state(), VaultState::KeyReady);

        let empty: &[(&str, &str)] = &[];
        store.initialize_empty(Path::new("a.txt"), empty).unwrap();
        assert_eq!(store.state(), VaultState::FileBound);
        assert_eq!(store.path(), Some(Path::new("a.txt")));

        store.initialize_empty(Path::new("b.txt"), empty).unwrap();
        assert_eq!(store.path(), Some(Path::new("b.txt")));
    }

    #[test]
    fn operations_require_a_key() {
        let mut store = VaultStore::with_fs(MemFs::default());
        let empty: &[(&str, &str)] = &[];

        assert!(matches!(
            store.initialize_empty(Path::new("v.txt"), empty),
            Err(VaultError::KeyNotLoaded)
        ));
        assert!(matches!(
            store.load(Path::new("v.txt")),
            Err(VaultError::KeyNotLoaded)
        ));
        assert!(matches!(
            store.append_entry("mail", "pw"),
            Err(VaultError::KeyNotLoaded)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn write_failure_keeps_memory_value() {
        let mut store = keyed(MemFs::default());
        let empty: &[(&str, &str)] = &[];
        store.initialize_empty(Path::new("v.txt"), empty).unwrap();
        store.fs.fail_appends = true;

        let result = store.append_entry("mail", "secret");
        assert!(matches!(result, Err(VaultError::Io(_))));
        assert_eq!(store.get_password("mail").unwrap(), "secret");
        assert!(store.fs.read(Path::new("v.txt")).unwrap().is_empty());
    }

    #[test]
    fn initialize_reports_each_entry() {
        let mut store = keyed(MemFs::default());
        let initial = [("mail", "abc"), ("bad:site", "x"), ("bank", "def")];

        let outcomes = store
            .initialize_empty(Path::new("v.txt"), &initial)
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(VaultError::InvalidSite(_))
        ));
        assert!(outcomes[2].result.is_ok());
        assert_eq!(store.len(), 2);

        let text = String::from_utf8(store.fs.read(Path::new("v.txt")).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn initialize_with_failing_appends_is_partial() {
        let fs = MemFs {
            fail_appends: true,
            ..MemFs::default()
        };
        let mut store = keyed(fs);

        let outcomes = store
            .initialize_empty(Path::new("v.txt"), &[("mail", "abc")])
            .unwrap();

        assert!(matches!(outcomes[0].result, Err(VaultError::Io(_))));
        assert!(store.get("mail").is_none());
        assert_eq!(store.state(), VaultState::FileBound);
    }

    #[test]
    fn initialize_truncates_and_clears() {
        let mut store = keyed(MemFs::default());
        store
            .fs
            .write(Path::new("v.txt"), b"old:junk\n")
            .unwrap();
        store.append_entry("memory-only", "pw").unwrap();

        let empty: &[(&str, &str)] = &[];
        store.initialize_empty(Path::new("v.txt"), empty).unwrap();

        assert!(store.is_empty());
        assert!(store.fs.read(Path::new("v.txt")).unwrap().is_empty());
    }

    #[test]
    fn invalid_key_rejects_initialize_before_truncating() {
        let mut store = VaultStore::with_fs(MemFs::default());
        store.fs.write(Path::new("v.txt"), b"keep:me\n").unwrap();
        store.set_key(Key::from_bytes(b"garbage".to_vec()));

        let empty: &[(&str, &str)] = &[];
        let result = store.initialize_empty(Path::new("v.txt"), empty);

        assert!(matches!(result, Err(VaultError::InvalidKey(_))));
        assert_eq!(store.fs.read(Path::new("v.txt")).unwrap(), b"keep:me\n");
    }

    #[test]
    fn invalid_key_fails_every_record_on_load() {
        let mut writer = keyed(MemFs::default());
        writer
            .initialize_empty(Path::new("v.txt"), &[("a", "1"), ("b", "2")])
            .unwrap();
        let fs = writer.fs;

        let mut reader = VaultStore::with_fs(fs);
        reader.set_key(Key::from_bytes(b"garbage".to_vec()));
        let report = reader.load(Path::new("v.txt")).unwrap();

        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, VaultError::InvalidKey(_))));
        assert_eq!(reader.get("a"), Some(&EntryValue::DecryptionFailed));
    }

    #[test]
    fn empty_site_line_loads_under_empty_name() {
        let mut store = keyed(MemFs::default());
        let empty: &[(&str, &str)] = &[];
        store.initialize_empty(Path::new("v.txt"), empty).unwrap();
        let token = store.engine().unwrap().encrypt("blank");
        let line = format!(":{token}\n");
        store.fs.append(Path::new("v.txt"), line.as_bytes()).unwrap();

        let report = store.load(Path::new("v.txt")).unwrap();
        assert_eq!(report.records, 1);
        assert!(report.is_clean());
        assert_eq!(store.get_password("").unwrap(), "blank");

        // Still refused when writing.
        assert!(matches!(
            store.append_entry("", "x"),
            Err(VaultError::InvalidSite(_))
        ));
    }

    #[test]
    fn undecodable_token_gets_sentinel_and_malformed_record() {
        let mut store = keyed(MemFs::default());
        store
            .fs
            .write(Path::new("v.txt"), b"mail:gAAAAA==\n")
            .unwrap();

        let report = store.load(Path::new("v.txt")).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            VaultError::MalformedRecord(_)
        ));
        assert_eq!(store.get("mail"), Some(&EntryValue::DecryptionFailed));
    }

    #[test]
    fn replacing_key_unbinds_vault_file() {
        let mut store = keyed(MemFs::default());
        store
            .initialize_empty(Path::new("v.txt"), &[("a", "1")])
            .unwrap();
        let original = store.key.clone().unwrap();

        store.set_key(Key::generate());
        assert_eq!(store.state(), VaultState::KeyReady);
        assert!(store.path().is_none());
        assert!(store.is_empty());

        // Nothing more reaches the old file under the new key.
        assert_eq!(store.append_entry("b", "2").unwrap(), Persistence::MemoryOnly);
        let fs = store.fs;
        let mut reader = VaultStore::with_fs(fs);
        reader.set_key(original);
        let report = reader.load(Path::new("v.txt")).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.records, 1);
        assert!(!reader.contains("b"));
    }

    #[test]
    fn append_without_file_touches_no_storage() {
        let mut store = keyed(MemFs::default());
        assert_eq!(store.state(), VaultState::KeyReady);

        let persistence = store.append_entry("mail", "abc").unwrap();

        assert_eq!(persistence, Persistence::MemoryOnly);
        assert_eq!(store.get_password("mail").unwrap(), "abc");
        assert!(store.fs.files.borrow().is_empty());
    }

    #[test]
    fn load_missing_file_keeps_previous_state() {
        let mut store = keyed(MemFs::default());
        store.append_entry("mail", "pw").unwrap();

        let result = store.load(Path::new("missing.txt"));
        assert!(matches!(result, Err(VaultError::FileNotFound(_))));
        assert_eq!(store.get_password("mail").unwrap(), "pw");
        assert_eq!(store.state(), VaultState::KeyReady);
    }
}
