//! `securevault menu` — interactive menu over one long-lived store.
//!
//! Unlike the one-shot subcommands, the menu keeps a single
//! `VaultStore` for the whole session, so a key can be loaded once and
//! entries can be added to memory before any vault file is chosen.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::output;
use crate::cli::{key_path, load_settings, vault_path, Cli};
use crate::config::Settings;
use crate::crypto::Key;
use crate::errors::{Result, VaultError};
use crate::vault::{EntryValue, Persistence, VaultStore};

const ITEMS: &[&str] = &[
    "Create a NEW key (overwrites an existing key file)",
    "Load an EXISTING key",
    "Create a NEW vault file (overwrites an existing file)",
    "Load an EXISTING vault file",
    "Add a password",
    "Get a password",
    "List sites",
    "Quit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NewKey,
    LoadKey,
    NewVault,
    LoadVault,
    Add,
    Get,
    List,
    Quit,
}

impl Action {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::NewKey,
            1 => Self::LoadKey,
            2 => Self::NewVault,
            3 => Self::LoadVault,
            4 => Self::Add,
            5 => Self::Get,
            6 => Self::List,
            _ => Self::Quit,
        }
    }
}

/// Execute the `menu` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let default_key = key_path(cli, &settings)?;
    let default_vault = vault_path(cli, &settings)?;

    let mut store = VaultStore::new();

    loop {
        let choice = Select::new()
            .with_prompt("What do you want to do?")
            .items(ITEMS)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        let action = Action::from_index(choice);
        if action == Action::Quit {
            output::info("Bye!");
            return Ok(());
        }

        // Failures are reported and the menu keeps running.
        let result = match action {
            Action::NewKey => new_key(&mut store, &default_key),
            Action::LoadKey => load_key(&mut store, &default_key),
            Action::NewVault => new_vault(&mut store, &default_vault, &settings),
            Action::LoadVault => load_vault(&mut store, &default_vault),
            Action::Add => add(&mut store),
            Action::Get => get(&store),
            Action::List => {
                output::print_entries_table(&store.list_entries());
                Ok(())
            }
            Action::Quit => Ok(()),
        };

        if let Err(e) = result {
            output::error(&e.to_string());
        }
    }
}

fn new_key(store: &mut VaultStore, default: &Path) -> Result<()> {
    let path = ask_path("Path to save the NEW key", default)?;
    if path.exists() && !confirm_overwrite(&path)? {
        return Ok(());
    }

    let key = Key::generate();
    key.save(&path)?;
    replace_key(store, key);
    output::success(&format!("New key created and saved to {}", path.display()));
    Ok(())
}

fn load_key(store: &mut VaultStore, default: &Path) -> Result<()> {
    let path = ask_path("Path of the EXISTING key", default)?;
    replace_key(store, Key::load(&path)?);
    output::success(&format!("Key loaded from {}", path.display()));
    Ok(())
}

/// Set the key, telling the user when that closes the active vault file.
fn replace_key(store: &mut VaultStore, key: Key) {
    let closed = store.path().map(Path::to_path_buf);
    store.set_key(key);
    if let Some(path) = closed {
        output::info(&format!(
            "Closed {}: its entries belong to the previous key.",
            path.display()
        ));
        output::tip("Create or load a vault file to continue with the new key.");
    }
}

fn new_vault(store: &mut VaultStore, default: &Path, settings: &Settings) -> Result<()> {
    if !store.has_key() {
        return Err(VaultError::KeyNotLoaded);
    }

    let path = ask_path("Path for the NEW vault file", default)?;
    if path.exists() && !confirm_overwrite(&path)? {
        return Ok(());
    }

    let outcomes = store.initialize_empty(&path, &settings.seed_pairs())?;
    let failed = output::report_outcomes(&outcomes);
    output::success(&format!(
        "Vault file created at {} ({} of {} initial entries written)",
        path.display(),
        outcomes.len() - failed,
        outcomes.len()
    ));
    Ok(())
}

fn load_vault(store: &mut VaultStore, default: &Path) -> Result<()> {
    let path = ask_path("Path of the EXISTING vault file", default)?;
    let report = store.load(&path)?;
    output::report_load(&report);
    output::success(&format!(
        "Loaded {} site(s) from {}",
        store.len(),
        path.display()
    ));
    Ok(())
}

fn add(store: &mut VaultStore) -> Result<()> {
    if !store.has_key() {
        return Err(VaultError::KeyNotLoaded);
    }

    let site: String = Input::new()
        .with_prompt("Site/service name")
        .interact_text()
        .map_err(prompt_error)?;
    let site = site.trim();
    crate::vault::format::validate_site(site)?;

    let password = zeroize::Zeroizing::new(
        Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_error)?,
    );

    match store.append_entry(site, &password)? {
        Persistence::Written => output::success(&format!("Added '{site}'.")),
        Persistence::MemoryOnly => {
            output::info(&format!("Added '{site}' to memory, but no vault file is set."));
            output::tip("Create or load a vault file to save entries persistently.");
        }
    }
    Ok(())
}

fn get(store: &VaultStore) -> Result<()> {
    let site: String = Input::new()
        .with_prompt("Which site/service")
        .interact_text()
        .map_err(prompt_error)?;
    let site = site.trim();

    match store.get(site) {
        Some(EntryValue::Password(p)) => {
            println!("Password for {site} is: {}", p.as_str());
            Ok(())
        }
        Some(EntryValue::DecryptionFailed) => Err(VaultError::EntryUnreadable(site.to_string())),
        None => Err(VaultError::EntryNotFound(site.to_string())),
    }
}

fn ask_path(prompt: &str, default: &Path) -> Result<PathBuf> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.display().to_string())
        .interact_text()
        .map_err(prompt_error)?;
    Ok(PathBuf::from(raw.trim()))
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite it?", path.display()))
        .default(false)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> VaultError {
    VaultError::CommandFailed(format!("prompt: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_menu_item_maps_to_an_action() {
        let actions: Vec<Action> = (0..ITEMS.len()).map(Action::from_index).collect();
        assert_eq!(actions.first(), Some(&Action::NewKey));
        assert_eq!(actions.last(), Some(&Action::Quit));
        for (i, a) in actions.iter().enumerate() {
            assert!(!actions[..i].contains(a), "duplicate action {a:?}");
        }
    }
}
