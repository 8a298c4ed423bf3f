//! Directory enumeration
//!
//! Produces the `ListingEntry` values a listing response is built from.
//! Entries come back in filesystem order - no sorting is applied, so two
//! runs over the same directory may disagree with each other.

use log::warn;
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;

/// What kind of filesystem object a listing entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Symlink,
    Regular,
    Other,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Entry name; recursive listings prefix it with the parent path.
    pub name: String,
    pub kind: EntryKind,
    /// Byte size, populated only when the listing asked for sizes.
    pub size: Option<u64>,
    /// Leading-dot name.
    pub hidden: bool,
}

/// Lists `path` without recursing.
///
/// Hidden entries are dropped unless `include_hidden`. When they are
/// shown, `.` and `..` are synthesized at the front of the listing, the
/// way `readdir` reports them.
pub fn list_directory(
    path: &Path,
    include_hidden: bool,
    include_size: bool,
) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();

    if include_hidden {
        for name in [".", ".."] {
            entries.push(ListingEntry {
                name: name.to_string(),
                kind: EntryKind::Directory,
                size: size_of(&path.join(name), include_size),
                hidden: true,
            });
        }
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !include_hidden && is_hidden(&name) {
            continue;
        }
        let hidden = is_hidden(&name);
        entries.push(listing_entry(&entry, name, hidden, include_size));
    }

    Ok(entries)
}

/// Recursive variant. Entry names carry the path from `path` down
/// (`path/sub/file`). Symlinked directories are listed but not entered.
pub fn list_directory_recursive(
    path: &Path,
    include_hidden: bool,
    include_size: bool,
) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    walk(path, include_hidden, include_size, &mut entries)?;
    Ok(entries)
}

fn walk(
    dir: &Path,
    include_hidden: bool,
    include_size: bool,
    out: &mut Vec<ListingEntry>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let bare = entry.file_name().to_string_lossy().to_string();
        if !include_hidden && is_hidden(&bare) {
            continue;
        }

        let qualified = format!("{}/{}", dir.display(), bare);
        let item = listing_entry(&entry, qualified, is_hidden(&bare), include_size);
        let descend = item.kind == EntryKind::Directory;
        out.push(item);

        if descend {
            let nested = dir.join(&bare);
            // unreadable subtrees drop out of the listing
            if let Err(e) = walk(&nested, include_hidden, include_size, out) {
                warn!("Skipping unreadable directory {}: {}", nested.display(), e);
            }
        }
    }

    Ok(())
}

fn listing_entry(
    entry: &DirEntry,
    name: String,
    hidden: bool,
    include_size: bool,
) -> ListingEntry {
    let kind = match entry.file_type() {
        Ok(t) if t.is_symlink() => EntryKind::Symlink,
        Ok(t) if t.is_dir() => EntryKind::Directory,
        Ok(t) if t.is_file() => EntryKind::Regular,
        _ => EntryKind::Other,
    };

    let size = if include_size {
        entry.metadata().ok().map(|m| m.len())
    } else {
        None
    };

    ListingEntry {
        name,
        kind,
        size,
        hidden,
    }
}

fn size_of(path: &Path, include_size: bool) -> Option<u64> {
    if include_size {
        fs::metadata(path).ok().map(|m| m.len())
    } else {
        None
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
