//! `securevault add` — add or replace a password in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `add` command.
pub fn execute(cli: &Cli, site: &str, password: Option<&str>) -> Result<()> {
    crate::vault::format::validate_site(site)?;

    // Determine the password from one of three sources.
    let password = if let Some(p) = password {
        // Source 1: Inline value on the command line.
        output::warning("Password given on the command line may appear in shell history.");
        Zeroizing::new(p.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end_matches(['\n', '\r']).to_string())
    } else {
        // Source 3: Interactive hidden prompt (default).
        let p = dialoguer::Password::new()
            .with_prompt(format!("Enter the password for {site}"))
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
        Zeroizing::new(p)
    };

    let mut store = open_store(cli)?;
    let existed = store.contains(site);

    store.append_entry(site, &password)?;
    let verb = if existed { "Updated" } else { "Added" };
    output::success(&format!("{verb} '{site}' ({} total)", store.len()));

    Ok(())
}
