//! File access
//!
//! Handles opening files for the transfer path.

use std::path::Path;
use tokio::fs::File;
use tokio::io::BufReader;

/// Open a file for line-oriented reading.
///
/// Success doubles as the accessibility check for a get request: a file
/// that opens is considered sendable.
pub async fn open_for_line_reading(path: &Path) -> std::io::Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path).await?))
}
