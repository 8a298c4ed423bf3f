//! File system collaborators
//!
//! Directory enumeration and file access for the transfer path.

pub mod filesystem;
pub mod listing;

pub use filesystem::open_for_line_reading;
pub use listing::{EntryKind, ListingEntry, list_directory, list_directory_recursive};
