//! `securevault create` — create a new vault file, optionally seeded.

use crate::cli::output;
use crate::cli::{key_path, load_key, load_settings, parse_seed, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::VaultStore;

/// Execute the `create` command.
pub fn execute(cli: &Cli, seeds: &[String], force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    if path.exists() && !force {
        output::tip("Use `securevault add` to add passwords to the existing vault.");
        return Err(VaultError::AlreadyExists(path));
    }

    // Config seeds first, then --seed flags, in the order given.
    let mut initial = settings.seed_pairs();
    for seed in seeds {
        initial.push(parse_seed(seed)?);
    }

    let key = load_key(&key_path(cli, &settings)?)?;
    let mut store = VaultStore::new();
    store.set_key(key);

    let outcomes = store.initialize_empty(&path, &initial)?;
    let failed = output::report_outcomes(&outcomes);

    output::success(&format!(
        "Vault created at {} with {} entr{}",
        path.display(),
        outcomes.len() - failed,
        if outcomes.len() - failed == 1 { "y" } else { "ies" }
    ));

    if failed > 0 {
        return Err(VaultError::CommandFailed(format!(
            "{failed} of {} initial entries could not be written",
            outcomes.len()
        )));
    }

    output::tip("Run `securevault add <SITE>` to add a password.");
    Ok(())
}
