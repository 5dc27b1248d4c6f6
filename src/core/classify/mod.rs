//! # Classify Module
//!
//! Skip/move/convert decisions for videos and images.
//!
//! ## Decision Shape
//! A decision is a tagged variant, not a bag of optional fields: a skip
//! carries nothing but its reason, so an executor physically cannot act on
//! one. Convert decisions always carry at least one need flag.
//!
//! ## Rule Ordering
//! Both classifiers evaluate their rules strictly in order and stop at the
//! first match; the skiplist always beats every later rule.

pub mod image;
pub mod video;

pub use image::ImageClassifier;
pub use video::VideoClassifier;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which streams a conversion must change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedFlags {
    /// Video stream must be re-encoded
    pub video_codec: bool,
    /// Audio stream must be re-encoded to AAC
    pub audio_codec: bool,
    /// Container must be remuxed to MOV
    pub container: bool,
    /// HDR content must be tone-mapped to SDR
    pub hdr_to_sdr: bool,
}

impl NeedFlags {
    /// Whether any stream needs changing
    pub fn any(&self) -> bool {
        self.video_codec || self.audio_codec || self.container || self.hdr_to_sdr
    }
}

/// The outcome of classifying one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// Do not process this file
    Skip { reason: String },
    /// Copy as-is; already compatible
    Move {
        reason: String,
        /// Resolved creation time (video moves always carry one)
        creation_time: Option<String>,
        /// Apple QuickTime tags worth preserving
        apple_metadata: Option<BTreeMap<String, String>>,
        /// Audio channel count (video only)
        audio_channels: Option<u32>,
    },
    /// Re-encode the flagged streams
    Convert {
        reason: String,
        needs: NeedFlags,
        creation_time: String,
        apple_metadata: Option<BTreeMap<String, String>>,
        audio_channels: u32,
    },
}

impl Decision {
    /// Action name as it appears in the report
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Skip { .. } => "skip",
            Decision::Move { .. } => "move",
            Decision::Convert { .. } => "convert",
        }
    }

    /// The human-readable reason string
    pub fn reason(&self) -> &str {
        match self {
            Decision::Skip { reason }
            | Decision::Move { reason, .. }
            | Decision::Convert { reason, .. } => reason,
        }
    }
}

/// Case-insensitive substring test against the skiplist keywords.
///
/// The whole path string is searched, so a keyword can match a folder name,
/// a file name, or any fragment of either.
pub fn matches_skiplist(path: &Path, keywords: &[String]) -> bool {
    let haystack = path.to_string_lossy().to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Is the extension one of the allowed ones (both sides lowercased)?
pub fn extension_allowed(extension: Option<&str>, allowed: &[String]) -> bool {
    match extension {
        Some(ext) => allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
