//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{AppendOutcome, EntryMetadata, LoadReport};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print one warning per record that failed to load.
pub fn report_load(report: &LoadReport) {
    for failure in &report.failures {
        let site = if failure.site.is_empty() {
            "<empty>"
        } else {
            failure.site.as_str()
        };
        warning(&format!(
            "Could not decrypt '{site}' (line {}): {}. Data might be corrupted or the key is wrong.",
            failure.line, failure.error
        ));
    }
}

/// Print the outcome of each initial entry written by `create`.
///
/// Returns the number of entries that failed.
pub fn report_outcomes(outcomes: &[AppendOutcome]) -> usize {
    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => success(&format!("Added '{}'", outcome.site)),
            Err(e) => {
                failed += 1;
                warning(&format!("Failed to write '{}': {e}", outcome.site));
            }
        }
    }
    failed
}

/// Print a table of entry metadata (Site, Status, Written).
pub fn print_entries_table(entries: &[EntryMetadata]) {
    if entries.is_empty() {
        info("No passwords in this vault yet.");
        tip("Run `securevault add <SITE>` to add your first password.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Site", "Status", "Written"]);

    for e in entries {
        let status = if e.readable { "ok" } else { "decryption failed" };
        let written = e.written_at.map_or_else(
            || "-".to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        table.add_row(vec![e.site.clone(), status.to_string(), written]);
    }

    println!("{table}");
}
