//! # Error Module
//!
//! Error types for the triage engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Domain conditions are not errors** - an unanalyzable video or a
//!   missing date is a skip decision with a reason, never an `Err`. The
//!   types below cover the genuinely unexpected: vanished paths, broken
//!   reports, failed subprocess spawns.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while crawling directories
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory entry {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the ffprobe collaborator
///
/// The video classifier maps all of these to a skip decision with reason
/// "ffprobe failed"; they surface here so callers can log the cause.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to spawn ffprobe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffprobe exited with {exit_code:?}: {stderr}")]
    NonZeroExit {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(String),
}

/// Errors reading or writing the delimited report tables
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed report row {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors from the processor (copy/convert executor)
///
/// Per-item failures are recorded in the processed report and never abort
/// the batch; these types carry the cause for that status string.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {exit_code:?}: {stderr}")]
    ConversionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to create destination directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/2018"),
        };
        assert!(error.to_string().contains("/photos/2018"));
    }

    #[test]
    fn probe_error_includes_stderr() {
        let error = ProbeError::NonZeroExit {
            exit_code: Some(1),
            stderr: "moov atom not found".to_string(),
        };
        assert!(error.to_string().contains("moov atom not found"));
    }

    #[test]
    fn malformed_row_names_line() {
        let error = ReportError::MalformedRow {
            line: 7,
            expected: 8,
            found: 3,
        };
        let message = error.to_string();
        assert!(message.contains('7'));
        assert!(message.contains('8'));
    }
}
