//! # Config Module
//!
//! Explicit configuration for the triage pipelines.
//!
//! Every tunable that affects a decision lives here so that a run is fully
//! reproducible from its configuration plus the filesystem state.

use std::path::PathBuf;

/// Configuration shared by the classifiers, the duplicate matcher and the
/// processor.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Video extensions eligible for triage (lowercase, no dot)
    pub video_extensions: Vec<String>,
    /// Image extensions eligible for triage (lowercase, no dot)
    pub image_extensions: Vec<String>,
    /// Image extensions eligible for duplicate detection (lowercase, no dot)
    pub dupe_extensions: Vec<String>,
    /// Case-insensitive substrings; a path containing any of them is skipped
    pub skiplist: Vec<String>,
    /// Images at or above this size join the "big" pool
    pub size_threshold_bytes: u64,
    /// Perceptual hash size in bits per side (8 -> 64-bit hash)
    pub hash_size: u32,
    /// Square resolution images are normalized to before hashing
    pub phash_resize: u32,
    /// Maximum Hamming distance for two images to count as duplicates
    pub distance_threshold: u32,
    /// UTC offset (hours) used when formatting destination filename prefixes
    pub utc_offset_hours: i32,
    /// ffprobe binary (name or absolute path)
    pub ffprobe_binary: PathBuf,
    /// ffmpeg binary (name or absolute path)
    pub ffmpeg_binary: PathBuf,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            video_extensions: vec!["mkv".into(), "mp4".into(), "mov".into()],
            image_extensions: vec!["jpg".into(), "jpeg".into()],
            dupe_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            skiplist: Vec::new(),
            size_threshold_bytes: 800 * 1024,
            hash_size: 8,
            phash_resize: 64,
            distance_threshold: 5,
            utc_offset_hours: 0,
            ffprobe_binary: PathBuf::from("ffprobe"),
            ffmpeg_binary: PathBuf::from("ffmpeg"),
        }
    }
}

impl TriageConfig {
    /// Replace the skiplist keywords
    pub fn with_skiplist(mut self, keywords: Vec<String>) -> Self {
        self.skiplist = keywords;
        self
    }

    /// Replace the duplicate size threshold
    pub fn with_size_threshold(mut self, bytes: u64) -> Self {
        self.size_threshold_bytes = bytes;
        self
    }

    /// Replace the duplicate distance threshold
    pub fn with_distance_threshold(mut self, distance: u32) -> Self {
        self.distance_threshold = distance;
        self
    }
}
