use colored::*;
use crate::session::{Origin, Outcome};
use crate::shell::result::FileEntry;

pub fn print_outcome(outcome: &Outcome) {
    let tag = match outcome.origin {
        Origin::Remote => "[remote]".cyan(),
        Origin::Local => "[local]".yellow(),
    };
    let result = &outcome.result;

    if result.is_success() {
        println!("{} {}", tag, result.message().green());
    } else {
        eprintln!("{} {} {}", tag, "✖".red(), result.message().red());
    }

    if !result.has_listing() {
        return;
    }

    let width = result
        .items()
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);
    for item in result.items() {
        println!("  {}", format_entry(item, width));
    }
}

// Entries from a remote listing carry names only: no `<DIR>` marker, size
// or date is shown for them.
fn format_entry(item: &FileEntry, width: usize) -> String {
    let padding = " ".repeat(width.saturating_sub(item.name.chars().count()) + 2);
    let size = if item.is_directory {
        "<DIR>".to_string()
    } else {
        item.size.map(|s| s.to_string()).unwrap_or_default()
    };
    let modified = item
        .modified_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    let name = if item.is_directory {
        item.name.blue().bold()
    } else {
        item.name.normal()
    };
    format!("{}{}{:>12}  {}", name, padding, size, modified.dimmed())
}
