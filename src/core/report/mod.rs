//! # Report Module
//!
//! Persists decision and duplicate tables as delimited text.
//!
//! The delimiter is `@` - deliberately outside the normal path/text
//! alphabet so values never need quoting. One row per input file, written
//! once and never updated in place; reprocessing recomputes everything.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::classify::Decision;
use crate::core::dupes::DupeEntry;
use crate::error::ReportError;

/// Column separator for all report tables
pub const DELIMITER: char = '@';

const VIDEO_HEADER: &str =
    "file@action@reason@creation_time@apple_metadata@audio_channels@video_codec_needed@audio_codec_needed";
const IMAGE_HEADER: &str = "file@action@reason";
const DUPE_HEADER: &str = "file@size@phash@dupe_type@dupe_of";
const PROCESSED_HEADER: &str =
    "file@action@reason@creation_time@apple_metadata@audio_channels@video_codec_needed@audio_codec_needed@derived_file@status";

/// One row of the video report, as written and as read back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub file: PathBuf,
    pub action: String,
    pub reason: String,
    pub creation_time: Option<String>,
    pub apple_metadata: Option<BTreeMap<String, String>>,
    pub audio_channels: Option<u32>,
    pub video_codec_needed: Option<bool>,
    pub audio_codec_needed: Option<bool>,
}

impl VideoRecord {
    /// Flatten a decision into its report row
    pub fn from_decision(file: &Path, decision: &Decision) -> Self {
        match decision {
            Decision::Skip { reason } => Self {
                file: file.to_path_buf(),
                action: "skip".to_string(),
                reason: reason.clone(),
                creation_time: None,
                apple_metadata: None,
                audio_channels: None,
                video_codec_needed: None,
                audio_codec_needed: None,
            },
            Decision::Move {
                reason,
                creation_time,
                apple_metadata,
                audio_channels,
            } => Self {
                file: file.to_path_buf(),
                action: "move".to_string(),
                reason: reason.clone(),
                creation_time: creation_time.clone(),
                apple_metadata: apple_metadata.clone(),
                audio_channels: *audio_channels,
                video_codec_needed: Some(false),
                audio_codec_needed: Some(false),
            },
            Decision::Convert {
                reason,
                needs,
                creation_time,
                apple_metadata,
                audio_channels,
            } => Self {
                file: file.to_path_buf(),
                action: "convert".to_string(),
                reason: reason.clone(),
                creation_time: Some(creation_time.clone()),
                apple_metadata: apple_metadata.clone(),
                audio_channels: Some(*audio_channels),
                video_codec_needed: Some(needs.video_codec),
                audio_codec_needed: Some(needs.audio_codec),
            },
        }
    }

    fn to_row(&self) -> String {
        let apple = self
            .apple_metadata
            .as_ref()
            .map(|m| serde_json::to_string(m).unwrap_or_default())
            .unwrap_or_default();
        format!(
            "{}@{}@{}@{}@{}@{}@{}@{}",
            self.file.display(),
            self.action,
            self.reason,
            self.creation_time.as_deref().unwrap_or(""),
            apple,
            self.audio_channels
                .map(|c| c.to_string())
                .unwrap_or_default(),
            flag_to_str(self.video_codec_needed),
            flag_to_str(self.audio_codec_needed),
        )
    }

    fn parse(line: &str, line_number: usize) -> Result<Self, ReportError> {
        let columns: Vec<&str> = line.split(DELIMITER).collect();
        if columns.len() != 8 {
            return Err(ReportError::MalformedRow {
                line: line_number,
                expected: 8,
                found: columns.len(),
            });
        }

        let apple_metadata = if columns[4].is_empty() {
            None
        } else {
            serde_json::from_str(columns[4]).ok()
        };

        Ok(Self {
            file: PathBuf::from(columns[0]),
            action: columns[1].to_string(),
            reason: columns[2].to_string(),
            creation_time: non_empty(columns[3]),
            apple_metadata,
            audio_channels: columns[5].parse().ok(),
            video_codec_needed: parse_flag(columns[6]),
            audio_codec_needed: parse_flag(columns[7]),
        })
    }
}

/// A processed row: the original record plus the executor's outcome
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRecord {
    pub record: VideoRecord,
    /// Destination path, when one was computed
    pub derived_file: Option<PathBuf>,
    /// Outcome string: "done", "already exists", "skipped", "failed: ..."
    pub status: String,
}

fn flag_to_str(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "1",
        Some(false) => "0",
        None => "",
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let file = fs::File::create(path).map_err(|e| ReportError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = std::io::BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|e| ReportError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Write the video triage report
pub fn write_video_report(records: &[VideoRecord], path: &Path) -> Result<(), ReportError> {
    write_lines(
        path,
        std::iter::once(VIDEO_HEADER.to_string()).chain(records.iter().map(VideoRecord::to_row)),
    )
}

/// Read a video triage report back for processing
pub fn read_video_report(path: &Path) -> Result<Vec<VideoRecord>, ReportError> {
    let text = fs::read_to_string(path).map_err(|e| ReportError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    text.lines()
        .enumerate()
        .skip(1) // header
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| VideoRecord::parse(line, i + 1))
        .collect()
}

/// Write the image triage report (file/action/reason only)
pub fn write_image_report(
    rows: &[(PathBuf, Decision)],
    path: &Path,
) -> Result<(), ReportError> {
    write_lines(
        path,
        std::iter::once(IMAGE_HEADER.to_string()).chain(rows.iter().map(|(file, decision)| {
            format!(
                "{}@{}@{}",
                file.display(),
                decision.action(),
                decision.reason()
            )
        })),
    )
}

/// Write the duplicate-detection report
pub fn write_dupe_report(entries: &[DupeEntry], path: &Path) -> Result<(), ReportError> {
    write_lines(
        path,
        std::iter::once(DUPE_HEADER.to_string()).chain(entries.iter().map(|entry| {
            format!(
                "{}@{}@{}@{}@{}",
                entry.file.display(),
                entry.size,
                entry.phash.as_deref().unwrap_or(""),
                entry.dupe_type.as_str(),
                entry
                    .dupe_of
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
        })),
    )
}

/// Write the processed report (original columns plus derived_file/status)
pub fn write_processed_report(
    records: &[ProcessedRecord],
    path: &Path,
) -> Result<(), ReportError> {
    write_lines(
        path,
        std::iter::once(PROCESSED_HEADER.to_string()).chain(records.iter().map(|processed| {
            format!(
                "{}@{}@{}",
                processed.record.to_row(),
                processed
                    .derived_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                processed.status,
            )
        })),
    )
}
