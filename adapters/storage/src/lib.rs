#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Storage-read adapter for Place Replay.
//!
//! The replay core only ever consumes raw byte buffers; this crate is the
//! one place that touches the filesystem. There is no retry or caching
//! logic; tile files are small, read once at startup, and a file that
//! cannot be read is handled by the caller's skip-and-report policy.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Lists the tile files in a directory, sorted by file name.
///
/// Lexical file-name order makes the load sequence deterministic across
/// platforms. Subdirectories are ignored.
pub fn list_tile_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to list tile directory {}", directory.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", directory.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads one tile file into memory.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read tile file {}", path.display()))
}
