//! `securevault get` — print a single password.

use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, site: &str) -> Result<()> {
    let store = open_store(cli)?;

    // Print the password to stdout so it can be piped.
    let password = store.get_password(site)?;
    println!("{password}");

    Ok(())
}
