//! # Date Module
//!
//! Resolves an authoritative timestamp for a media item.
//!
//! ## Resolution Order
//! 1. An embedded metadata date (EXIF `DateTimeOriginal`, QuickTime
//!    `creation_time`) is accepted outright.
//! 2. Otherwise the first `20XX` year found in the path is compared to the
//!    local calendar year of the file's mtime. Equal means the mtime is
//!    trustworthy and becomes the creation time; anything else makes the
//!    item inadmissible.
//!
//! Inadmissibility is a domain outcome: the classifiers turn it into a skip
//! decision with a per-cause reason, never an error.

use chrono::{DateTime, Datelike, Local, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Where a resolved creation time came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateProvenance {
    /// Embedded metadata (EXIF or container tags)
    Metadata,
    /// File mtime, validated against a year hint in the folder path
    FileMtime,
}

/// A resolved timestamp plus its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    /// ISO-8601 timestamp string, verbatim from metadata or synthesized
    /// from the mtime
    pub creation_time: String,
    /// Where the timestamp came from
    pub provenance: DateProvenance,
}

/// Outcome of date resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateResolution {
    /// The item has a trustworthy timestamp
    Resolved(DateInfo),
    /// No metadata date and no `20XX` segment anywhere in the path
    NoYearInPath,
    /// No metadata date and the mtime year contradicts the path year
    MtimeYearMismatch,
}

impl DateResolution {
    /// Whether the item is admissible for upload
    pub fn is_resolved(&self) -> bool {
        matches!(self, DateResolution::Resolved(_))
    }
}

/// Resolve a creation time for a file.
///
/// `metadata_date` is the externally-extracted date string, if any; it wins
/// without further checks.
pub fn resolve(
    metadata_date: Option<&str>,
    path: &Path,
    modified: SystemTime,
) -> DateResolution {
    if let Some(date) = metadata_date {
        return DateResolution::Resolved(DateInfo {
            creation_time: date.to_string(),
            provenance: DateProvenance::Metadata,
        });
    }

    let Some(path_year) = extract_year_from_path(path) else {
        return DateResolution::NoYearInPath;
    };

    let mtime_year = DateTime::<Local>::from(modified).year().to_string();
    if mtime_year == path_year {
        DateResolution::Resolved(DateInfo {
            creation_time: mtime_as_iso_utc(modified),
            provenance: DateProvenance::FileMtime,
        })
    } else {
        DateResolution::MtimeYearMismatch
    }
}

/// Extract the first `20XX` year from a path.
///
/// Segments are scanned in path order; the first one *starting* with a
/// four-digit year in the 2000s wins ("2018-07 Summer" counts, "IMG2018"
/// does not).
pub fn extract_year_from_path(path: &Path) -> Option<String> {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = YEAR_RE.get_or_init(|| Regex::new(r"^(20\d{2})").expect("valid year regex"));

    let text = path.to_string_lossy();
    for segment in text.split(['/', '\\']) {
        if let Some(captures) = re.captures(segment) {
            return Some(captures[1].to_string());
        }
    }
    None
}

/// Format an mtime as an ISO-8601 UTC string
pub fn mtime_as_iso_utc(modified: SystemTime) -> String {
    DateTime::<Utc>::from(modified)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
