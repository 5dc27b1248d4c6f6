//! # Pipeline Module
//!
//! Crawl-and-classify drivers behind the CLI subcommands.
//!
//! Each driver walks a directory tree, runs the relevant engine over every
//! file and returns the rows for a report writer. Progress flows out
//! through the event channel; per-file conditions become skip rows, never
//! errors.

use std::path::{Path, PathBuf};

use crate::core::classify::{matches_skiplist, Decision, ImageClassifier, VideoClassifier};
use crate::core::config::TriageConfig;
use crate::core::dupes::{self, DupeEntry, DupeType, PerceptualHasher};
use crate::core::probe::FfprobeProber;
use crate::core::process::Processor;
use crate::core::report::{self, ProcessedRecord, VideoRecord};
use crate::core::{metadata, scanner::Walker};
use crate::error::Result;
use crate::events::{ClassifyEvent, DupeEvent, Event, EventSender};

/// Classify every file under `root` for cloud compatibility.
///
/// Every scanned file gets exactly one row; unsupported extensions and
/// skiplist matches become skip rows.
pub fn evaluate_videos(
    root: &Path,
    config: &TriageConfig,
    events: &EventSender,
) -> Result<Vec<VideoRecord>> {
    let scan = Walker::scan(root, events)?;
    let prober = FfprobeProber::new(&config.ffprobe_binary);
    let classifier = VideoClassifier::new(config, &prober);

    events.send(Event::Classify(ClassifyEvent::Started {
        total_files: scan.files.len(),
    }));

    let mut records = Vec::with_capacity(scan.files.len());
    let (mut moves, mut converts, mut skips) = (0, 0, 0);

    for (index, file) in scan.files.iter().enumerate() {
        let decision = classifier.classify(file);
        match decision {
            Decision::Move { .. } => moves += 1,
            Decision::Convert { .. } => converts += 1,
            Decision::Skip { .. } => skips += 1,
        }

        events.send(Event::Classify(ClassifyEvent::Decided {
            completed: index + 1,
            total: scan.files.len(),
            path: file.path.clone(),
            action: decision.action().to_string(),
        }));

        records.push(VideoRecord::from_decision(&file.path, &decision));
    }

    events.send(Event::Classify(ClassifyEvent::Completed {
        moves,
        converts,
        skips,
    }));

    Ok(records)
}

/// Classify every file under `root` by its authoritative date.
pub fn evaluate_images(
    root: &Path,
    config: &TriageConfig,
    events: &EventSender,
) -> Result<Vec<(PathBuf, Decision)>> {
    let scan = Walker::scan(root, events)?;
    let classifier = ImageClassifier::new(config);

    events.send(Event::Classify(ClassifyEvent::Started {
        total_files: scan.files.len(),
    }));

    let mut rows = Vec::with_capacity(scan.files.len());
    let (mut moves, mut converts, mut skips) = (0, 0, 0);

    for (index, file) in scan.files.iter().enumerate() {
        let decision = classifier.classify(file, metadata::date_taken);
        match decision {
            Decision::Move { .. } => moves += 1,
            Decision::Convert { .. } => converts += 1,
            Decision::Skip { .. } => skips += 1,
        }

        events.send(Event::Classify(ClassifyEvent::Decided {
            completed: index + 1,
            total: scan.files.len(),
            path: file.path.clone(),
            action: decision.action().to_string(),
        }));

        rows.push((file.path.clone(), decision));
    }

    events.send(Event::Classify(ClassifyEvent::Completed {
        moves,
        converts,
        skips,
    }));

    Ok(rows)
}

/// Find perceptual duplicates, folder by folder.
///
/// Comparison never crosses folder boundaries. Files outside the supported
/// extensions or matching the skiplist are not hashed and get no row.
pub fn find_duplicates(
    root: &Path,
    config: &TriageConfig,
    events: &EventSender,
) -> Result<Vec<DupeEntry>> {
    let (batches, _errors) = Walker::scan_folders(root, events)?;
    let hasher = PerceptualHasher::new(config.hash_size, config.phash_resize);

    events.send(Event::Dupe(DupeEvent::Started));

    let mut entries = Vec::new();
    for batch in &batches {
        let candidates: Vec<_> = batch
            .files
            .iter()
            .filter(|file| {
                crate::core::classify::extension_allowed(
                    file.extension().as_deref(),
                    &config.dupe_extensions,
                ) && !matches_skiplist(&file.path, &config.skiplist)
            })
            .cloned()
            .collect();

        if candidates.is_empty() {
            continue;
        }

        events.send(Event::Dupe(DupeEvent::FolderStarted {
            path: batch.folder.clone(),
            files: candidates.len(),
        }));

        entries.extend(dupes::evaluate_folder(&candidates, &hasher, config));
    }

    let duplicates = entries
        .iter()
        .filter(|e| e.dupe_type != DupeType::None)
        .count();
    events.send(Event::Dupe(DupeEvent::Completed {
        total_images: entries.len(),
        duplicates,
    }));

    Ok(entries)
}

/// Execute a previously written video report.
pub fn process_report(
    report_path: &Path,
    dest_dir: &Path,
    config: &TriageConfig,
    events: &EventSender,
) -> Result<Vec<ProcessedRecord>> {
    let records = report::read_video_report(report_path).map_err(crate::error::TriageError::from)?;
    let processor = Processor::new(config, dest_dir);
    Ok(processor.run(&records, events))
}
