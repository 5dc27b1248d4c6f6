//! Image compatibility classification.
//!
//! Simpler than the video tree: images are never converted, only moved or
//! skipped, and admissibility is purely a date question.

use std::path::Path;

use super::{extension_allowed, matches_skiplist, Decision};
use crate::core::config::TriageConfig;
use crate::core::date::{self, DateResolution};
use crate::core::scanner::MediaFile;

/// Classifies still images by date availability
pub struct ImageClassifier<'a> {
    config: &'a TriageConfig,
}

impl<'a> ImageClassifier<'a> {
    pub fn new(config: &'a TriageConfig) -> Self {
        Self { config }
    }

    /// Produce exactly one decision for `file`.
    ///
    /// `read_date_taken` supplies the EXIF `DateTimeOriginal` value; it is
    /// only invoked once the cheap extension/skiplist rules have passed.
    pub fn classify(
        &self,
        file: &MediaFile,
        read_date_taken: impl FnOnce(&Path) -> Option<String>,
    ) -> Decision {
        if !extension_allowed(
            file.extension().as_deref(),
            &self.config.image_extensions,
        ) {
            return skip("wrong extension");
        }

        if matches_skiplist(&file.path, &self.config.skiplist) {
            return skip("skiplist match");
        }

        if let Some(date_taken) = read_date_taken(&file.path) {
            return Decision::Move {
                reason: "date taken available".to_string(),
                creation_time: Some(date_taken),
                apple_metadata: None,
                audio_channels: None,
            };
        }

        match date::resolve(None, &file.path, file.modified) {
            DateResolution::Resolved(info) => Decision::Move {
                reason: "date modified year correct".to_string(),
                creation_time: Some(info.creation_time),
                apple_metadata: None,
                audio_channels: None,
            },
            DateResolution::NoYearInPath => skip("no year in path"),
            DateResolution::MtimeYearMismatch => skip("date modified year mismatch"),
        }
    }
}

fn skip(reason: &str) -> Decision {
    Decision::Skip {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn media_file(path: &str, mtime_year: i32) -> MediaFile {
        let date = Local.with_ymd_and_hms(mtime_year, 4, 15, 9, 30, 0).unwrap();
        MediaFile {
            path: PathBuf::from(path),
            size: 2048,
            modified: SystemTime::from(date),
        }
    }

    fn no_exif(_: &Path) -> Option<String> {
        None
    }

    #[test]
    fn wrong_extension_skips() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);
        let decision = classifier.classify(&media_file("/data/2018/anim.gif", 2018), no_exif);
        assert_eq!(decision.reason(), "wrong extension");
    }

    #[test]
    fn skiplist_skips_before_exif_is_read() {
        let config = TriageConfig::default().with_skiplist(vec!["BBM".to_string()]);
        let classifier = ImageClassifier::new(&config);

        let decision = classifier.classify(&media_file("/data/2018/bbm/img.jpg", 2018), |_| {
            panic!("EXIF must not be read for skiplisted files")
        });
        assert_eq!(decision.reason(), "skiplist match");
    }

    #[test]
    fn exif_date_taken_moves() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);

        let decision = classifier.classify(&media_file("/data/img.jpg", 2024), |_| {
            Some("2018:04:15 09:30:00".to_string())
        });
        match decision {
            Decision::Move {
                reason,
                creation_time,
                ..
            } => {
                assert_eq!(reason, "date taken available");
                assert_eq!(creation_time.as_deref(), Some("2018:04:15 09:30:00"));
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn mtime_fallback_accepts_matching_year() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);

        let decision =
            classifier.classify(&media_file("/data/2018/party/IMG_1234.jpg", 2018), no_exif);
        assert_eq!(decision.reason(), "date modified year correct");
    }

    #[test]
    fn mtime_year_mismatch_skips() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);

        let decision =
            classifier.classify(&media_file("/data/2018/party/IMG_1234.jpg", 2019), no_exif);
        assert_eq!(decision.reason(), "date modified year mismatch");
    }

    #[test]
    fn no_year_in_path_skips() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);

        let decision = classifier.classify(&media_file("/data/party/IMG_1234.jpg", 2018), no_exif);
        assert_eq!(decision.reason(), "no year in path");
    }

    #[test]
    fn jpeg_variant_extension_is_allowed() {
        let config = TriageConfig::default();
        let classifier = ImageClassifier::new(&config);

        let decision = classifier.classify(&media_file("/data/2018/IMG.JPEG", 2018), no_exif);
        assert_eq!(decision.reason(), "date modified year correct");
    }
}
