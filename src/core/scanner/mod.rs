//! # Scanner Module
//!
//! Discovers media files in directories.
//!
//! The walker deliberately yields *every* file it finds - the classifiers
//! own the extension and skiplist rules, so that a run produces exactly one
//! report row per file, including "wrong extension" skips.

mod walker;

pub use walker::Walker;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::ScanError;

/// A discovered media file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
}

impl MediaFile {
    /// Lowercased extension without the dot, if any
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

/// Lowercased extension of an arbitrary path
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Result of a crawl
#[derive(Debug)]
pub struct ScanResult {
    /// Files found, in walk order
    pub files: Vec<MediaFile>,
    /// Non-fatal errors encountered along the way
    pub errors: Vec<ScanError>,
}

/// Files of one folder, in walk order
///
/// Duplicate detection is folder-local, so the walker can also hand back
/// per-folder batches instead of a flat list.
#[derive(Debug)]
pub struct FolderBatch {
    /// The containing folder
    pub folder: PathBuf,
    /// Files directly inside it (no recursion)
    pub files: Vec<MediaFile>,
}
