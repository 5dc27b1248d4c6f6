//! # CLI Module
//!
//! Command-line interface for the photo/video triage engine.
//!
//! ## Usage
//! ```bash
//! # Classify videos for cloud compatibility
//! photo-triage videos ~/Footage --report videos.csv
//!
//! # Classify images by authoritative date
//! photo-triage images ~/Photos --report images.csv --skip Trash
//!
//! # Find perceptual duplicates, folder by folder
//! photo-triage dupes ~/Photos --report dupes.csv
//!
//! # Execute a video report
//! photo-triage process videos.csv --dest ~/Upload
//!
//! # JSON to stdout for scripting
//! photo-triage videos ~/Footage --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_triage::core::classify::Decision;
use photo_triage::core::{pipeline, report, DupeType, TriageConfig};
use photo_triage::error::Result;
use photo_triage::events::{
    ClassifyEvent, DupeEvent, Event, EventChannel, EventReceiver, ProcessEvent, ScanEvent,
};
use std::path::PathBuf;
use std::thread;

/// Photo Triage - decide what to upload before you upload it
#[derive(Parser, Debug)]
#[command(name = "photo-triage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify videos as skip/move/convert for cloud compatibility
    Videos {
        /// Directory to scan
        path: PathBuf,

        /// Where to write the report
        #[arg(short, long, default_value = "videos.csv")]
        report: PathBuf,

        /// Skip any path containing one of these substrings
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// ffprobe binary (name or absolute path)
        #[arg(long, default_value = "ffprobe")]
        ffprobe: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Classify images by their authoritative date
    Images {
        /// Directory to scan
        path: PathBuf,

        /// Where to write the report
        #[arg(short, long, default_value = "images.csv")]
        report: PathBuf,

        /// Skip any path containing one of these substrings
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Find perceptual duplicate images within each folder
    Dupes {
        /// Directory to scan
        path: PathBuf,

        /// Where to write the report
        #[arg(short, long, default_value = "dupes.csv")]
        report: PathBuf,

        /// Skip any path containing one of these substrings
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// Maximum Hamming distance for a duplicate pair (0-64)
        #[arg(short, long, default_value = "5")]
        threshold: u32,

        /// Pool split point in kilobytes (big vs small images)
        #[arg(long, default_value = "800")]
        size_threshold_kb: u64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Copy/convert the files of a previously written video report
    Process {
        /// The video report to execute
        report: PathBuf,

        /// Destination directory for the derived files
        #[arg(short, long)]
        dest: PathBuf,

        /// Where to write the processed report
        #[arg(long, default_value = "processed.csv")]
        processed: PathBuf,

        /// Hours to add to UTC when stamping destination filenames
        #[arg(long, default_value = "0")]
        utc_offset: i32,

        /// ffmpeg binary (name or absolute path)
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors and progress
    Pretty,
    /// JSON rows on stdout for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    photo_triage::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Videos {
            path,
            report,
            skip,
            ffprobe,
            output,
        } => {
            let mut config = TriageConfig::default().with_skiplist(skip);
            config.ffprobe_binary = ffprobe;
            run_videos(path, report, config, output)
        }
        Commands::Images {
            path,
            report,
            skip,
            output,
        } => {
            let config = TriageConfig::default().with_skiplist(skip);
            run_images(path, report, config, output)
        }
        Commands::Dupes {
            path,
            report,
            skip,
            threshold,
            size_threshold_kb,
            output,
        } => {
            let config = TriageConfig::default()
                .with_skiplist(skip)
                .with_distance_threshold(threshold)
                .with_size_threshold(size_threshold_kb * 1024);
            run_dupes(path, report, config, output)
        }
        Commands::Process {
            report,
            dest,
            processed,
            utc_offset,
            ffmpeg,
            output,
        } => {
            let mut config = TriageConfig::default();
            config.utc_offset_hours = utc_offset;
            config.ffmpeg_binary = ffmpeg;
            run_process(report, dest, processed, config, output)
        }
    }
}

fn run_videos(
    path: PathBuf,
    report_path: PathBuf,
    config: TriageConfig,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Video triage", output);

    let (sender, receiver) = EventChannel::new();
    let progress = spawn_progress(receiver, output);

    let records = pipeline::evaluate_videos(&path, &config, &sender)?;
    drop(sender);
    progress.join().ok();

    report::write_video_report(&records, &report_path)
        .map_err(photo_triage::TriageError::from)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records).unwrap());
        return Ok(());
    }

    let moves = records.iter().filter(|r| r.action == "move").count();
    let converts = records.iter().filter(|r| r.action == "convert").count();
    let skips = records.iter().filter(|r| r.action == "skip").count();

    term.write_line("").ok();
    term.write_line(&format!("{} Triage complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!("  {} files classified", style(records.len()).cyan()))
        .ok();
    term.write_line(&format!(
        "  {} move / {} convert / {} skip",
        style(moves).green(),
        style(converts).yellow(),
        style(skips).dim()
    ))
    .ok();
    term.write_line(&format!("  report: {}", report_path.display()))
        .ok();
    Ok(())
}

fn run_images(
    path: PathBuf,
    report_path: PathBuf,
    config: TriageConfig,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Image triage", output);

    let (sender, receiver) = EventChannel::new();
    let progress = spawn_progress(receiver, output);

    let rows = pipeline::evaluate_images(&path, &config, &sender)?;
    drop(sender);
    progress.join().ok();

    report::write_image_report(&rows, &report_path)
        .map_err(photo_triage::TriageError::from)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows).unwrap());
        return Ok(());
    }

    let moves = rows
        .iter()
        .filter(|(_, d)| matches!(d, Decision::Move { .. }))
        .count();

    term.write_line("").ok();
    term.write_line(&format!("{} Triage complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} files classified, {} datable",
        style(rows.len()).cyan(),
        style(moves).green()
    ))
    .ok();
    term.write_line(&format!("  report: {}", report_path.display()))
        .ok();
    Ok(())
}

fn run_dupes(
    path: PathBuf,
    report_path: PathBuf,
    config: TriageConfig,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Duplicate scan", output);

    let (sender, receiver) = EventChannel::new();
    let progress = spawn_progress(receiver, output);

    let entries = pipeline::find_duplicates(&path, &config, &sender)?;
    drop(sender);
    progress.join().ok();

    report::write_dupe_report(&entries, &report_path)
        .map_err(photo_triage::TriageError::from)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&entries).unwrap());
        return Ok(());
    }

    let duplicates = entries
        .iter()
        .filter(|e| e.dupe_type != DupeType::None)
        .count();

    term.write_line("").ok();
    term.write_line(&format!("{} Scan complete", style("✓").green().bold()))
        .ok();
    if duplicates == 0 {
        term.write_line(&format!(
            "  {} images hashed, no duplicates found",
            style(entries.len()).cyan()
        ))
        .ok();
    } else {
        term.write_line(&format!(
            "  {} images hashed, {} in duplicate pairs",
            style(entries.len()).cyan(),
            style(duplicates).yellow()
        ))
        .ok();
    }
    term.write_line(&format!("  report: {}", report_path.display()))
        .ok();
    Ok(())
}

fn run_process(
    report_path: PathBuf,
    dest: PathBuf,
    processed_path: PathBuf,
    config: TriageConfig,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Processing report", output);

    let (sender, receiver) = EventChannel::new();
    let progress = spawn_progress(receiver, output);

    let processed = pipeline::process_report(&report_path, &dest, &config, &sender)?;
    drop(sender);
    progress.join().ok();

    report::write_processed_report(&processed, &processed_path)
        .map_err(photo_triage::TriageError::from)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&processed).unwrap());
        return Ok(());
    }

    let done = processed.iter().filter(|p| p.status == "done").count();
    let failed = processed
        .iter()
        .filter(|p| p.status.starts_with("failed"))
        .count();

    term.write_line("").ok();
    term.write_line(&format!(
        "{} Processing complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} done, {} failed, {} rows total",
        style(done).green(),
        style(failed).red(),
        processed.len()
    ))
    .ok();
    term.write_line(&format!("  report: {}", processed_path.display()))
        .ok();
    Ok(())
}

fn print_header(term: &Term, title: &str, output: OutputFormat) {
    if output != OutputFormat::Pretty {
        return;
    }
    term.write_line(&format!(
        "{} {}",
        style(title).bold().cyan(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

/// Drive one progress bar from the event stream until the sender drops
fn spawn_progress(receiver: EventReceiver, output: OutputFormat) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if output != OutputFormat::Pretty {
            // dropping the receiver turns every send into a no-op
            return;
        }

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Started { root }) => {
                    pb.set_message(format!("scanning {}", root.display()));
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Classify(ClassifyEvent::Decided {
                    completed,
                    total,
                    path,
                    ..
                }) => {
                    pb.set_length(total as u64);
                    pb.set_position(completed as u64);
                    pb.set_message(
                        path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .to_string(),
                    );
                }
                Event::Dupe(DupeEvent::FolderStarted { path, files }) => {
                    pb.inc_length(files as u64);
                    pb.set_message(format!("hashing {}", path.display()));
                }
                Event::Dupe(DupeEvent::Completed { total_images, .. }) => {
                    pb.set_position(total_images as u64);
                }
                Event::Process(ProcessEvent::Started { total_rows }) => {
                    pb.set_length(total_rows as u64);
                }
                Event::Process(ProcessEvent::ItemFinished {
                    completed,
                    path,
                    status,
                    ..
                }) => {
                    pb.set_position(completed as u64);
                    pb.set_message(format!(
                        "{} ({status})",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
                Event::Classify(ClassifyEvent::Completed { .. })
                | Event::Process(ProcessEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        pb.finish_and_clear();
    })
}
