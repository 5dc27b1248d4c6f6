//! # Probe Module
//!
//! ffprobe invocation and parsing of its JSON output.
//!
//! The prober is the external collaborator; everything that *interprets*
//! stream metadata (HDR detection, hvc1 checks) lives in [`profile`] and is
//! pure, so tests can feed it hand-built [`ProbeOutput`] values.

pub mod profile;

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ProbeError;

/// Top-level ffprobe JSON output (`-print_format json -show_streams -show_format`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    pub format: Option<ProbeFormat>,
}

/// A single stream from ffprobe output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub codec_tag_string: Option<String>,
    pub pix_fmt: Option<String>,
    pub color_transfer: Option<String>,
    pub color_trc: Option<String>,
    pub color_primaries: Option<String>,
    pub channels: Option<u32>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Format-level metadata from ffprobe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Seam for stream probing, so classifiers can be tested without ffprobe
pub trait MediaProber {
    /// Probe a video file, returning its parsed stream/format description
    fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError>;
}

/// Real prober shelling out to ffprobe
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::NonZeroExit {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ProbeError::Parse(e.to_string()))
    }
}

/// Creation-time tags recognized in container/stream metadata
const CREATION_TIME_KEYS: [&str; 2] = ["creation_time", "com.apple.quicktime.creationdate"];

/// Apple QuickTime tags preserved through a conversion
const APPLE_KEYS: [&str; 3] = [
    "com.apple.quicktime.make",
    "com.apple.quicktime.model",
    "com.apple.quicktime.software",
];

/// Extract a creation time from probe metadata only (no mtime fallback).
///
/// Sections are scanned in fixed order - format tags first, then streams in
/// stream order - with case-insensitive key matching; the first hit wins.
pub fn creation_time_tag(output: &ProbeOutput) -> Option<String> {
    for tags in tag_sections(output) {
        for key in CREATION_TIME_KEYS {
            if let Some(value) = lookup_ci(tags, key) {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Collect Apple QuickTime make/model/software tags, if any are present.
///
/// Keys are matched case-insensitively and stored under their canonical
/// lowercase form so re-runs serialize identically.
pub fn apple_metadata(output: &ProbeOutput) -> Option<BTreeMap<String, String>> {
    let mut found = BTreeMap::new();
    for tags in tag_sections(output) {
        for key in APPLE_KEYS {
            if let Some(value) = lookup_ci(tags, key) {
                found.insert(key.to_string(), value.to_string());
            }
        }
    }
    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}

fn tag_sections(output: &ProbeOutput) -> impl Iterator<Item = &HashMap<String, String>> {
    output
        .format
        .iter()
        .map(|f| &f.tags)
        .chain(output.streams.iter().map(|s| &s.tags))
}

fn lookup_ci<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}
