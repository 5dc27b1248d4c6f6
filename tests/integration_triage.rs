//! Integration tests for the triage pipelines and report round trips.
//!
//! These tests exercise the full crawl -> classify -> report -> process
//! flow on real temporary directories, without touching ffprobe or ffmpeg
//! (only skip and move rows are executed here).

use assert_fs::prelude::*;
use chrono::{Local, TimeZone};
use filetime::FileTime;
use photo_triage::core::report::{
    read_video_report, write_image_report, write_processed_report, write_video_report, VideoRecord,
};
use photo_triage::core::{pipeline, TriageConfig};
use photo_triage::events::null_sender;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Stamp a file's mtime to local noon of the given date
fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
    let instant = Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .unwrap()
        .timestamp();
    filetime::set_file_mtime(path, FileTime::from_unix_time(instant, 0)).unwrap();
}

#[test]
fn image_triage_resolves_dates_from_year_folders() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("2018-holiday/beach.jpg")
        .write_binary(b"not a real jpeg")
        .unwrap();
    temp.child("2018-holiday/mismatch.jpg")
        .write_binary(b"not a real jpeg")
        .unwrap();
    temp.child("loose.jpg").write_binary(b"bytes").unwrap();
    temp.child("notes.txt").write_binary(b"text").unwrap();

    set_mtime(temp.child("2018-holiday/beach.jpg").path(), 2018, 6, 15);
    set_mtime(temp.child("2018-holiday/mismatch.jpg").path(), 2021, 3, 1);

    // walker resolves paths through /private on macOS; match that here
    let root = fs::canonicalize(temp.path()).unwrap();
    let rows = pipeline::evaluate_images(&root, &TriageConfig::default(), &null_sender()).unwrap();
    assert_eq!(rows.len(), 4);

    let reason_of = |name: &str| {
        rows.iter()
            .find(|(path, _)| path.file_name().unwrap() == name)
            .map(|(_, decision)| decision.reason().to_string())
            .unwrap()
    };

    assert_eq!(reason_of("beach.jpg"), "date modified year correct");
    assert_eq!(reason_of("mismatch.jpg"), "date modified year mismatch");
    assert_eq!(reason_of("loose.jpg"), "no year in path");
    assert_eq!(reason_of("notes.txt"), "wrong extension");

    let report = temp.child("images.csv");
    write_image_report(&rows, report.path()).unwrap();
    report.assert(predicate::str::starts_with("file@action@reason\n"));
    report.assert(predicate::str::contains("beach.jpg@move@date modified year correct"));
    report.assert(predicate::str::contains("notes.txt@skip@wrong extension"));
}

#[test]
fn video_triage_skips_before_probing() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("trash/clip.mp4").write_binary(b"fake").unwrap();
    temp.child("holiday.avi").write_binary(b"fake").unwrap();

    let config = TriageConfig::default().with_skiplist(vec!["trash".to_string()]);
    let root = fs::canonicalize(temp.path()).unwrap();
    // no ffprobe on the test machine is fine: both files skip before the probe
    let records = pipeline::evaluate_videos(&root, &config, &null_sender()).unwrap();

    let reasons: Vec<&str> = records.iter().map(|r| r.reason.as_str()).collect();
    assert!(reasons.contains(&"skiplist match"));
    assert!(reasons.contains(&"wrong extension"));
}

#[test]
fn video_report_drives_the_processor() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("2018/clip.mov")
        .write_binary(b"compatible video bytes")
        .unwrap();

    let clip = temp.child("2018/clip.mov").path().to_path_buf();
    let records = vec![
        VideoRecord {
            file: clip,
            action: "move".to_string(),
            reason: "fully compatible already".to_string(),
            creation_time: Some("2018-07-17T14:22:10Z".to_string()),
            apple_metadata: None,
            audio_channels: Some(2),
            video_codec_needed: Some(false),
            audio_codec_needed: Some(false),
        },
        VideoRecord {
            file: temp.child("2018/other.avi").path().to_path_buf(),
            action: "skip".to_string(),
            reason: "wrong extension".to_string(),
            creation_time: None,
            apple_metadata: None,
            audio_channels: None,
            video_codec_needed: None,
            audio_codec_needed: None,
        },
    ];

    let report = temp.child("videos.csv");
    write_video_report(&records, report.path()).unwrap();
    assert_eq!(read_video_report(report.path()).unwrap(), records);

    let dest = temp.child("upload");
    let processed = pipeline::process_report(
        report.path(),
        dest.path(),
        &TriageConfig::default(),
        &null_sender(),
    )
    .unwrap();

    assert_eq!(processed.len(), 2);
    assert_eq!(processed[0].status, "done");
    assert_eq!(processed[1].status, "skipped");
    dest.child("20180717_142210-clip.mov")
        .assert(predicate::path::exists());

    // a rerun leaves the finished copy alone
    let rerun = pipeline::process_report(
        report.path(),
        dest.path(),
        &TriageConfig::default(),
        &null_sender(),
    )
    .unwrap();
    assert_eq!(rerun[0].status, "already exists");

    let processed_report = temp.child("processed.csv");
    write_processed_report(&processed, processed_report.path()).unwrap();
    processed_report.assert(predicate::str::contains("20180717_142210-clip.mov@done"));
}
