//! # Events Module
//!
//! Event-driven progress reporting for the triage pipelines.
//!
//! The core library emits events through a crossbeam channel; any consumer
//! (the CLI's progress bar, a future GUI) subscribes on the receiving end.
//! Sending into a dropped receiver is a no-op, so progress reporting is
//! always optional.

mod channel;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the triage pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory crawl events
    Scan(ScanEvent),
    /// Compatibility classification events (videos and images)
    Classify(ClassifyEvent),
    /// Duplicate detection events
    Dupe(DupeEvent),
    /// Report processing (copy/convert) events
    Process(ProcessEvent),
}

/// Events during the directory crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Crawling has started
    Started { root: PathBuf },
    /// An error occurred but crawling continues
    Error { path: PathBuf, message: String },
    /// Crawling completed
    Completed { total_files: usize },
}

/// Events during compatibility classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifyEvent {
    /// Classification has started
    Started { total_files: usize },
    /// A file was classified
    Decided {
        completed: usize,
        total: usize,
        path: PathBuf,
        action: String,
    },
    /// Classification completed
    Completed {
        moves: usize,
        converts: usize,
        skips: usize,
    },
}

/// Events during duplicate detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DupeEvent {
    /// Duplicate detection has started
    Started,
    /// A folder of images is being hashed and compared
    FolderStarted { path: PathBuf, files: usize },
    /// Duplicate detection completed
    Completed {
        total_images: usize,
        duplicates: usize,
    },
}

/// Events during report processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessEvent {
    /// Processing has started
    Started { total_rows: usize },
    /// A row was processed (or skipped)
    ItemFinished {
        completed: usize,
        total: usize,
        path: PathBuf,
        status: String,
    },
    /// Processing completed
    Completed { done: usize, failed: usize },
}
