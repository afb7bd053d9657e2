//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::config::Settings;
use crate::crypto::Key;
use crate::errors::{Result, VaultError};
use crate::vault::VaultStore;

/// SecureVault CLI: a file-backed password vault.
#[derive(Parser)]
#[command(
    name = "securevault",
    about = "Local password vault with per-entry authenticated encryption",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Key file (default: vault.key, or `key_path` from .securevault.toml)
    #[arg(short, long, env = "SECUREVAULT_KEY", global = true)]
    pub key: Option<PathBuf>,

    /// Vault file (default: passwords.txt, or `vault_path` from .securevault.toml)
    #[arg(long, env = "SECUREVAULT_FILE", global = true)]
    pub vault: Option<PathBuf>,

    /// Config file (default: ./.securevault.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show diagnostic logs (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a new key file
    Keygen {
        /// Overwrite an existing key file (entries under the old key become unreadable)
        #[arg(short, long)]
        force: bool,
    },

    /// Create a new, empty vault file
    Create {
        /// Initial entry to write (repeatable), after any config seeds
        #[arg(long = "seed", value_name = "SITE=PASSWORD")]
        seeds: Vec<String>,

        /// Overwrite an existing vault file
        #[arg(short, long)]
        force: bool,
    },

    /// Add or replace a password
    Add {
        /// Site or service name
        site: String,
        /// Password (omit for interactive prompt)
        password: Option<String>,
    },

    /// Print a password
    Get {
        /// Site or service name
        site: String,
    },

    /// List all sites in the vault
    List,

    /// Interactive menu
    Menu,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Default tracing filter for a `-v` count, used when `RUST_LOG` is unset.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "securevault=warn",
        1 => "securevault=debug",
        _ => "securevault=trace",
    }
}

/// Load settings from `--config` or the working directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_file(path),
        None => Settings::load(&std::env::current_dir()?),
    }
}

/// Resolve the key file path from CLI args and settings.
pub fn key_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(settings.resolve_key_path(&cwd, cli.key.as_deref()))
}

/// Resolve the vault file path from CLI args and settings.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(settings.resolve_vault_path(&cwd, cli.vault.as_deref()))
}

/// Load the key file, with a hint if it is missing.
pub fn load_key(path: &Path) -> Result<Key> {
    Key::load(path).inspect_err(|e| {
        if matches!(e, VaultError::FileNotFound(_)) {
            output::tip("Run `securevault keygen` to create a key first.");
        }
    })
}

/// Load the key and the vault file into a fresh store.
///
/// Records that fail to decrypt are reported as warnings; the store is
/// still returned.
pub fn open_store(cli: &Cli) -> Result<VaultStore> {
    let settings = load_settings(cli)?;
    let key = load_key(&key_path(cli, &settings)?)?;
    let path = vault_path(cli, &settings)?;

    let mut store = VaultStore::new();
    store.set_key(key);
    let report = store.load(&path).inspect_err(|e| {
        if matches!(e, VaultError::FileNotFound(_)) {
            output::tip("Run `securevault create` to create a vault first.");
        }
    })?;
    output::report_load(&report);

    Ok(store)
}

/// Parse a `SITE=PASSWORD` seed argument.
///
/// Splits on the first `=`, so the password may contain `=`.
pub fn parse_seed(arg: &str) -> Result<(String, String)> {
    let (site, password) = arg.split_once('=').ok_or_else(|| {
        VaultError::CommandFailed(format!("seed '{arg}' must look like SITE=PASSWORD"))
    })?;
    crate::vault::format::validate_site(site)?;
    Ok((site.to_string(), password.to_string()))
}
