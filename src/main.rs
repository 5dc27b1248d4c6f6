//! # photo-triage CLI
//!
//! Command-line interface for the photo/video triage engine.
//!
//! ## Usage
//! ```bash
//! photo-triage videos ~/Footage --report videos.csv
//! photo-triage process videos.csv --dest ~/Upload
//! ```

mod cli;

use photo_triage::Result;

fn main() -> Result<()> {
    cli::run()
}
