//! # Core Module
//!
//! The UI-agnostic triage engine.
//!
//! ## Modules
//! - `scanner` - Discovers media files in directories
//! - `date` - Resolves authoritative timestamps from metadata or path hints
//! - `probe` - ffprobe invocation and stream compatibility analysis
//! - `classify` - Skip/move/convert decisions for videos and images
//! - `metadata` - EXIF date extraction for images
//! - `dupes` - Perceptual-hash duplicate detection
//! - `report` - Delimited report persistence
//! - `process` - Executes move/convert decisions from a report
//! - `pipeline` - Crawl-and-classify drivers wiring the above together
//! - `config` - Explicit configuration for all of the above

pub mod classify;
pub mod config;
pub mod date;
pub mod dupes;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod process;
pub mod report;
pub mod scanner;

// Re-export commonly used types
pub use classify::{Decision, NeedFlags};
pub use config::TriageConfig;
pub use date::{DateInfo, DateProvenance};
pub use dupes::{DupeEntry, DupeType};
pub use scanner::MediaFile;
