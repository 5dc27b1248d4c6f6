//! # Photo Triage
//!
//! Triages personal photo/video collections for re-upload to a cloud photo
//! service, and flags probable duplicate images.
//!
//! ## Core Philosophy
//! - **Deterministic** - the same inputs always produce the same decisions
//! - **Show WHY** - every row carries a human-readable reason string
//! - **Never abort** - per-file failures become skip rows, not crashes
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - classifiers, duplicate matcher, report I/O, processor
//! - `events` - event-driven progress reporting
//! - `error` - error types for the unexpected (domain outcomes are decisions)
//! - `cli` - command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, TriageError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
