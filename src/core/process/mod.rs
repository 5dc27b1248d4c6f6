//! # Process Module
//!
//! Executes the decisions of a video report: copies compatible files and
//! transcodes incompatible ones with ffmpeg, stamping destination names
//! with the recording timestamp.
//!
//! Per-item failures become a status string in the processed report and
//! never abort the batch. Reruns are cheap: a destination that already
//! exists with content is left alone.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use filetime::FileTime;
use tracing::{debug, warn};

use crate::core::config::TriageConfig;
use crate::core::report::{ProcessedRecord, VideoRecord};
use crate::error::ProcessError;
use crate::events::{Event, EventSender, ProcessEvent};

const X265_PARAMS: &str = "keyint=60:min-keyint=60:scenecut=0:bframes=4:open-gop=0:repeat-headers=1";

/// Outcome of a single report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Done,
    AlreadyExists,
    Skipped,
    Failed(String),
}

impl ProcessStatus {
    pub fn as_report_string(&self) -> String {
        match self {
            ProcessStatus::Done => "done".to_string(),
            ProcessStatus::AlreadyExists => "already exists".to_string(),
            ProcessStatus::Skipped => "skipped".to_string(),
            ProcessStatus::Failed(cause) => format!("failed: {cause}"),
        }
    }
}

/// Report-driven copy/convert executor
pub struct Processor<'a> {
    config: &'a TriageConfig,
    dest_dir: PathBuf,
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a TriageConfig, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            dest_dir: dest_dir.into(),
        }
    }

    /// Run every row of a report, in order
    pub fn run(&self, records: &[VideoRecord], events: &EventSender) -> Vec<ProcessedRecord> {
        events.send(Event::Process(ProcessEvent::Started {
            total_rows: records.len(),
        }));

        let mut processed = Vec::with_capacity(records.len());
        let mut done = 0;
        let mut failed = 0;

        for (index, record) in records.iter().enumerate() {
            let (derived_file, status) = self.process_one(record);
            match status {
                ProcessStatus::Done | ProcessStatus::AlreadyExists => done += 1,
                ProcessStatus::Failed(_) => failed += 1,
                ProcessStatus::Skipped => {}
            }

            events.send(Event::Process(ProcessEvent::ItemFinished {
                completed: index + 1,
                total: records.len(),
                path: record.file.clone(),
                status: status.as_report_string(),
            }));

            processed.push(ProcessedRecord {
                record: record.clone(),
                derived_file,
                status: status.as_report_string(),
            });
        }

        events.send(Event::Process(ProcessEvent::Completed { done, failed }));
        processed
    }

    fn process_one(&self, record: &VideoRecord) -> (Option<PathBuf>, ProcessStatus) {
        match record.action.as_str() {
            "skip" => (None, ProcessStatus::Skipped),
            "move" => {
                let dest = self.destination_for(record, None);
                (Some(dest.clone()), self.run_item(record, &dest, false))
            }
            "convert" => {
                let dest = self.destination_for(record, Some("mov"));
                (Some(dest.clone()), self.run_item(record, &dest, true))
            }
            other => (
                None,
                ProcessStatus::Failed(format!("unknown action '{other}'")),
            ),
        }
    }

    fn run_item(&self, record: &VideoRecord, dest: &Path, convert: bool) -> ProcessStatus {
        if destination_occupied(dest) {
            debug!(dest = %dest.display(), "destination already populated");
            return ProcessStatus::AlreadyExists;
        }

        if let Err(e) = fs::create_dir_all(&self.dest_dir) {
            return ProcessStatus::Failed(
                ProcessError::CreateDir {
                    path: self.dest_dir.clone(),
                    source: e,
                }
                .to_string(),
            );
        }

        let outcome = if convert {
            self.convert_file(record, dest)
        } else {
            self.move_file(record, dest)
        };

        match outcome {
            Ok(()) => ProcessStatus::Done,
            Err(e) => {
                warn!(file = %record.file.display(), error = %e, "processing failed");
                // leave no truncated output behind for the idempotency check
                let _ = fs::remove_file(dest);
                ProcessStatus::Failed(e.to_string())
            }
        }
    }

    fn move_file(&self, record: &VideoRecord, dest: &Path) -> Result<(), ProcessError> {
        fs::copy(&record.file, dest).map_err(|e| ProcessError::Copy {
            src: record.file.clone(),
            dst: dest.to_path_buf(),
            source: e,
        })?;
        stamp_mtime(dest, record.creation_time.as_deref());
        Ok(())
    }

    fn convert_file(&self, record: &VideoRecord, dest: &Path) -> Result<(), ProcessError> {
        let args = ffmpeg_args(record, dest);
        let output = Command::new(&self.config.ffmpeg_binary)
            .args(&args)
            .output()
            .map_err(ProcessError::Spawn)?;

        if !output.status.success() {
            return Err(ProcessError::ConversionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr)
                    .lines()
                    .rev()
                    .take(5)
                    .collect::<Vec<_>>()
                    .join(" | "),
            });
        }

        stamp_mtime(dest, record.creation_time.as_deref());
        Ok(())
    }

    /// Destination path: `YYYYMMDD_HHMMSS-<name>` in local shoot time,
    /// `unknown_<name>` when no timestamp could be parsed
    fn destination_for(&self, record: &VideoRecord, force_ext: Option<&str>) -> PathBuf {
        let original_name = record
            .file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        let name = match force_ext {
            Some(ext) => {
                let stem = record
                    .file
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or(original_name);
                format!("{stem}.{ext}")
            }
            None => original_name,
        };

        let prefixed = match record
            .creation_time
            .as_deref()
            .and_then(|t| timestamp_prefix(t, self.config.utc_offset_hours))
        {
            Some(prefix) => format!("{prefix}-{name}"),
            None => format!("unknown_{name}"),
        };

        self.dest_dir.join(prefixed)
    }
}

/// Build the ffmpeg argument list for one convert row
///
/// Streams the record marks compatible are copied through untouched; the
/// rest is transcoded toward hvc1/aac in a .mov container with SDR bt709
/// color tags.
pub fn ffmpeg_args(record: &VideoRecord, dest: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        record.file.display().to_string(),
    ];

    if record.video_codec_needed.unwrap_or(false) {
        args.extend(
            [
                "-c:v",
                "libx265",
                "-tag:v",
                "hvc1",
                "-profile:v",
                "main",
                "-level:v",
                "4.0",
                "-pix_fmt",
                "yuv420p",
                "-r",
                "30",
                "-x265-params",
                X265_PARAMS,
                "-color_primaries",
                "bt709",
                "-color_trc",
                "bt709",
                "-colorspace",
                "bt709",
            ]
            .map(String::from),
        );
    } else {
        args.extend(["-c:v", "copy"].map(String::from));
    }

    if record.audio_codec_needed.unwrap_or(false) {
        let channels = record.audio_channels.unwrap_or(2);
        args.extend(
            [
                "-c:a".to_string(),
                "aac".to_string(),
                "-ar".to_string(),
                "44100".to_string(),
                "-b:a".to_string(),
                "100k".to_string(),
                "-ac".to_string(),
                channels.to_string(),
            ],
        );
    } else {
        args.extend(["-c:a", "copy"].map(String::from));
    }

    if let Some(creation_time) = &record.creation_time {
        args.push("-metadata".to_string());
        args.push(format!("creation_time={creation_time}"));
    }
    if let Some(apple) = &record.apple_metadata {
        for (key, value) in apple {
            args.push("-metadata".to_string());
            args.push(format!("{key}={value}"));
        }
    }

    args.push("-movflags".to_string());
    args.push("+write_colr+faststart".to_string());
    args.push(dest.display().to_string());
    args
}

/// An existing destination with content means a previous run finished it
fn destination_occupied(dest: &Path) -> bool {
    fs::metadata(dest).map(|m| m.len() > 0).unwrap_or(false)
}

/// Stamp the destination mtime with the recording instant when parseable
fn stamp_mtime(dest: &Path, creation_time: Option<&str>) {
    let Some(epoch) = creation_time.and_then(creation_epoch) else {
        return;
    };
    if let Err(e) = filetime::set_file_mtime(dest, FileTime::from_unix_time(epoch, 0)) {
        warn!(dest = %dest.display(), error = %e, "could not stamp mtime");
    }
}

/// Local-time filename prefix like `20180717_142210`
fn timestamp_prefix(creation_time: &str, utc_offset_hours: i32) -> Option<String> {
    if let Some(utc) = parse_as_utc(creation_time) {
        let local = utc + Duration::hours(i64::from(utc_offset_hours));
        return Some(local.format("%Y%m%d_%H%M%S").to_string());
    }
    // no zone designator: take the wall-clock digits as written
    let naive = creation_time.get(..19)?;
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.format("%Y%m%d_%H%M%S").to_string())
}

fn creation_epoch(creation_time: &str) -> Option<i64> {
    parse_as_utc(creation_time)
        .map(|dt| dt.timestamp())
        .or_else(|| {
            creation_time
                .get(..19)
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
                .map(|dt| dt.and_utc().timestamp())
        })
}

fn parse_as_utc(creation_time: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(creation_time)
        .or_else(|_| DateTime::parse_from_str(creation_time, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
