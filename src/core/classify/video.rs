//! Video compatibility classification.
//!
//! ## Decision Tree (first match wins)
//! 1. extension not in the allowed set -> skip "wrong extension"
//! 2. path matches a skiplist keyword -> skip "skiplist match"
//! 3. ffprobe cannot analyze the file -> skip "ffprobe failed"
//! 4. no metadata date and no trustworthy mtime -> skip with the date reason
//! 5. hvc1 SDR video + AAC audio + MOV container -> move "fully compatible already"
//! 6. anything else -> convert, with a reason naming each stream that changes

use std::path::Path;

use super::{extension_allowed, matches_skiplist, Decision, NeedFlags};
use crate::core::config::TriageConfig;
use crate::core::date::{self, DateResolution};
use crate::core::probe::profile::{assess, container_needs_remux};
use crate::core::probe::{apple_metadata, creation_time_tag, MediaProber};
use crate::core::scanner::MediaFile;

/// Classifies videos against the cloud service's compatibility rules
pub struct VideoClassifier<'a, P: MediaProber> {
    config: &'a TriageConfig,
    prober: &'a P,
}

impl<'a, P: MediaProber> VideoClassifier<'a, P> {
    pub fn new(config: &'a TriageConfig, prober: &'a P) -> Self {
        Self { config, prober }
    }

    /// Produce exactly one decision for `file`.
    ///
    /// Never fails: every unanalyzable or inadmissible file becomes a skip
    /// decision with a reason.
    pub fn classify(&self, file: &MediaFile) -> Decision {
        let extension = file.extension();
        if !extension_allowed(extension.as_deref(), &self.config.video_extensions) {
            return skip("wrong extension");
        }

        if matches_skiplist(&file.path, &self.config.skiplist) {
            return skip("skiplist match");
        }

        let probe = match self.prober.probe(&file.path) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "ffprobe failed");
                return skip("ffprobe failed");
            }
        };

        let assessment = assess(&probe);
        let container_needed =
            container_needs_remux(extension.as_deref().unwrap_or_default());

        let apple = apple_metadata(&probe);
        let creation_time = match creation_time_tag(&probe) {
            Some(tag) => tag,
            None => match date::resolve(None, &file.path, file.modified) {
                DateResolution::Resolved(info) => info.creation_time,
                DateResolution::NoYearInPath => return skip("no year in path"),
                DateResolution::MtimeYearMismatch => {
                    return skip("file modified time mismatch")
                }
            },
        };

        let needs = NeedFlags {
            video_codec: assessment.video_codec_needed,
            audio_codec: assessment.audio_codec_needed,
            container: container_needed,
            hdr_to_sdr: assessment.hdr_to_sdr_needed,
        };

        if !needs.any() {
            return Decision::Move {
                reason: "fully compatible already".to_string(),
                creation_time: Some(creation_time),
                apple_metadata: apple,
                audio_channels: Some(assessment.audio_channels),
            };
        }

        let mut tokens: Vec<&str> = Vec::new();
        if needs.video_codec
            && (assessment.video_not_hvc1 || !assessment.hdr_to_sdr_needed)
        {
            // Covers the codec mismatch itself, and the no-video-stream case
            // where re-encoding is forced without a more specific cause.
            tokens.push("video codec");
        }
        if needs.hdr_to_sdr {
            tokens.push("HDR to SDR");
        }
        if needs.audio_codec {
            tokens.push("audio codec");
        }
        if needs.container {
            tokens.push("container");
        }

        Decision::Convert {
            reason: format!("convert: {}", tokens.join("+")),
            needs,
            creation_time,
            apple_metadata: apple,
            audio_channels: assessment.audio_channels,
        }
    }
}

fn skip(reason: &str) -> Decision {
    Decision::Skip {
        reason: reason.to_string(),
    }
}
