//! Listing presentation
//!
//! Renders `ListingEntry` values as the ANSI-colored lines sent over the
//! data connection. Coloring is a client-terminal concern; nothing in the
//! transfer logic depends on it.

use colored::Colorize;

use crate::storage::{EntryKind, ListingEntry};

/// Column the byte count starts at when sizes are shown.
const SIZE_COLUMN: usize = 40;

/// Render one listing entry as a single response line.
///
/// Directories are blue, symlinks red, regular files white; a hidden
/// entry is magenta whatever its kind.
pub fn render_entry(entry: &ListingEntry) -> String {
    let name = if entry.hidden {
        entry.name.as_str().magenta()
    } else {
        match entry.kind {
            EntryKind::Directory => entry.name.as_str().blue(),
            EntryKind::Symlink => entry.name.as_str().red(),
            EntryKind::Regular => entry.name.as_str().white(),
            EntryKind::Other => entry.name.as_str().normal(),
        }
    };

    let rendered = name.to_string();
    match entry.size {
        Some(size) => {
            let padding = SIZE_COLUMN.saturating_sub(rendered.len()).max(1);
            format!("{}{}{}", rendered, " ".repeat(padding), size)
        }
        None => rendered,
    }
}
