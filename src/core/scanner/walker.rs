//! Directory walking implementation using walkdir.

use super::{FolderBatch, MediaFile, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Recursive directory walker
pub struct Walker;

impl Walker {
    /// Crawl `root` and return every file found, in walk order.
    ///
    /// Per-entry failures (permissions, vanished files) are collected as
    /// non-fatal errors; a missing root is the only hard failure.
    pub fn scan(root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        for entry_result in walkdir::WalkDir::new(root) {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    match fs::metadata(path) {
                        Ok(metadata) => {
                            files.push(MediaFile {
                                path: absolutize(path),
                                size: metadata.len(),
                                modified: metadata
                                    .modified()
                                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                            });
                        }
                        Err(e) => {
                            let error = ScanError::ReadEntry {
                                path: path.to_path_buf(),
                                source: e,
                            };
                            events.send(Event::Scan(ScanEvent::Error {
                                path: path.to_path_buf(),
                                message: error.to_string(),
                            }));
                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadEntry {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }

    /// Crawl `root` and group files by their containing folder.
    ///
    /// Folders appear in first-seen walk order; files keep walk order
    /// within their folder.
    pub fn scan_folders(
        root: &Path,
        events: &EventSender,
    ) -> Result<(Vec<FolderBatch>, Vec<ScanError>), ScanError> {
        let result = Self::scan(root, events)?;

        let mut batches: Vec<FolderBatch> = Vec::new();
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for file in result.files {
            let folder = file
                .path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            let slot = *index.entry(folder.clone()).or_insert_with(|| {
                batches.push(FolderBatch {
                    folder,
                    files: Vec::new(),
                });
                batches.len() - 1
            });
            batches[slot].files.push(file);
        }

        Ok((batches, result.errors))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
