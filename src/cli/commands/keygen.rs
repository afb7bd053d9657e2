//! `securevault keygen` — generate a new key file.

use crate::cli::output;
use crate::cli::{key_path, load_settings, Cli};
use crate::crypto::Key;
use crate::errors::{Result, VaultError};

/// Execute the `keygen` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = key_path(cli, &settings)?;

    if path.exists() && !force {
        output::tip("Entries encrypted under the existing key cannot be read with a new one.");
        return Err(VaultError::AlreadyExists(path));
    }

    let key = Key::generate();
    key.save(&path)?;

    output::success(&format!("New key created and saved to {}", path.display()));
    output::warning("Keep this file secret and backed up. Without it the vault cannot be read.");
    output::tip("Run `securevault create` to start a vault with this key.");

    Ok(())
}
