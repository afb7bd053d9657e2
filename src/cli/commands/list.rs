//! `securevault list` — display all sites in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let entries = store.list_entries();

    output::info(&format!("{} site(s)", entries.len()));
    output::print_entries_table(&entries);

    Ok(())
}
