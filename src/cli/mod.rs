//! # CLI Module
//!
//! Command-line interface for the duplicate remover.
//!
//! ## Usage
//! ```bash
//! # Remove duplicate MP3s under the current directory
//! duprm
//!
//! # Another directory, showing what would go without touching anything
//! duprm ~/Music --dry-run
//!
//! # Paths from a list file, relative to ~/Music
//! duprm ~/Music --list files.txt
//!
//! # JSON output
//! duprm ~/Music --output json
//! ```

use chrono::{DateTime, Local, Utc};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use duprm::core::pipeline::{Pipeline, PipelineResult};
use duprm::core::reporter::{self, format_status, ProgressSink};
use duprm::error::{DuprmError, Result};
use duprm::events::{
    DedupEvent, Event, EventChannel, FingerprintEvent, PipelineEvent, RunStatus, TrashEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;
use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Moves duplicate audio files to the trash, keeping the newest copy
#[derive(Parser, Debug)]
#[command(name = "duprm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan; list entries are resolved against it
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Read paths from this file (one per line) instead of scanning
    #[arg(short, long)]
    list: Option<PathBuf>,

    /// Glob matched against paths relative to DIRECTORY
    #[arg(short, long, default_value = "**/*.mp3")]
    pattern: String,

    /// Number of fingerprint workers
    #[arg(short = 'j', long, default_value = "64")]
    workers: usize,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Report what would be trashed without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Live status line and log
    Pretty,
    /// JSON summary for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.workers == 0 {
        return Err(DuprmError::Config(
            "--workers must be at least 1".to_string(),
        ));
    }

    let mut builder = Pipeline::builder()
        .directory(&cli.directory)
        .pattern(&cli.pattern)
        .include_hidden(cli.include_hidden)
        .workers(cli.workers)
        .dry_run(cli.dry_run);
    if let Some(list) = &cli.list {
        builder = builder.list(list);
    }
    let pipeline = builder.build();

    match cli.output {
        OutputFormat::Pretty => {
            let sink = StatusLine::new(cli.verbose, cli.dry_run);
            duprm::init_tracing_with_writer(
                cli.verbose,
                AboveBar {
                    bar: sink.bar.clone(),
                    target: io::stderr,
                },
            );
            run_pretty(&pipeline, sink, cli.dry_run)
        }
        OutputFormat::Json => {
            duprm::init_tracing(cli.verbose);
            let result = pipeline.run()?;
            print_json_results(&result);
            Ok(())
        }
    }
}

fn run_pretty(pipeline: &Pipeline, sink: StatusLine, dry_run: bool) -> Result<()> {
    let (sender, receiver) = EventChannel::new();

    // Render in a separate thread
    let event_thread = thread::spawn(move || reporter::drive(receiver, &sink));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;
    print_pretty_results(&result, dry_run);
    Ok(())
}

/// One self-overwriting terminal line with the run counters, and a log of
/// notable events printed above it.
struct StatusLine {
    bar: ProgressBar,
    verbose: bool,
    dry_run: bool,
    aborted: Cell<bool>,
}

impl StatusLine {
    fn new(verbose: bool, dry_run: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{msg:.dim}{spinner:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["", ".", "..", "...", ""]),
        );
        bar.enable_steady_tick(Duration::from_secs(1));
        Self {
            bar,
            verbose,
            dry_run,
            aborted: Cell::new(false),
        }
    }

    fn log(&self, line: String) {
        self.bar.println(line);
    }
}

impl ProgressSink for StatusLine {
    fn report(&self, status: &RunStatus) {
        self.bar.set_message(format_status(status));
    }

    fn event(&self, event: &Event) {
        match event {
            Event::Fingerprint(FingerprintEvent::Computed { path, fingerprint }) if self.verbose => {
                self.log(format!("{} {}", style(fingerprint).yellow(), style(name(path)).green()));
            }
            Event::Fingerprint(FingerprintEvent::Error { message, .. }) => {
                self.log(format!("{} {}", style("error").red().bold(), message));
            }
            Event::Dedup(DedupEvent::Match {
                fingerprint,
                incoming,
                incoming_created,
                existing,
                existing_created,
                ..
            }) => {
                self.log(format!(
                    "{} {}\n  {} {}\n  {} {}",
                    style("match").cyan(),
                    style(fingerprint).yellow(),
                    style(local_time(incoming_created)).dim(),
                    name(incoming),
                    style(local_time(existing_created)).dim(),
                    name(existing),
                ));
            }
            Event::Trash(TrashEvent::Scheduled { path }) => {
                let verb = if self.dry_run { "would trash" } else { "trash" };
                self.log(format!("  {} {}", style(verb).magenta(), path.display()));
            }
            Event::Trash(TrashEvent::Failed { path, message }) => {
                self.log(format!(
                    "{} {}: {}",
                    style("trash failed").red().bold(),
                    path.display(),
                    message
                ));
            }
            Event::Pipeline(PipelineEvent::Error { message }) => {
                self.aborted.set(true);
                self.log(format!("{} {}", style("error").red().bold(), message));
            }
            _ => {}
        }
    }

    fn finish(&self, status: &RunStatus) {
        self.bar.finish_and_clear();
        let end = if self.aborted.get() {
            style("aborted").red()
        } else {
            style("done").green()
        };
        Term::stdout()
            .write_line(&format!("{} {}", style(format_status(status)).dim(), end))
            .ok();
    }
}

/// Log writer that hides the status line while a line is written, so log
/// output lands above it instead of through it.
#[derive(Clone)]
struct AboveBar<M> {
    bar: ProgressBar,
    target: M,
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for AboveBar<M> {
    type Writer = Suspended<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Suspended {
            bar: self.bar.clone(),
            inner: self.target.make_writer(),
        }
    }
}

struct Suspended<W> {
    bar: ProgressBar,
    inner: W,
}

impl<W: io::Write> io::Write for Suspended<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn name(path: &Path) -> String {
    path.display().to_string()
}

fn local_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn print_pretty_results(result: &PipelineResult, dry_run: bool) {
    let term = Term::stdout();
    let summary = result.summary();

    if dry_run && summary.trashed > 0 {
        term.write_line(&format!(
            "{}",
            style("Dry run: no files were moved to the trash.").dim()
        ))
        .ok();
    }

    if !result.trash_failures.is_empty() {
        term.write_line(&format!(
            "{} {} file(s) could not be trashed",
            style("!").red().bold(),
            style(result.trash_failures.len()).red()
        ))
        .ok();
    }

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "{} {} file(s) could not be read",
            style("!").yellow().bold(),
            style(result.errors.len()).yellow()
        ))
        .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    let json = serde_json::json!({
        "summary": result.summary(),
        "kept": result.kept.iter().map(|r| serde_json::json!({
            "path": r.name,
            "fingerprint": r.fingerprint.to_hex(),
            "created": DateTime::<Utc>::from(r.time).to_rfc3339(),
        })).collect::<Vec<_>>(),
        "trashed": result.trashed,
        "trash_failures": result.trash_failures.iter().map(|(path, reason)| serde_json::json!({
            "path": path,
            "reason": reason,
        })).collect::<Vec<_>>(),
        "errors": result.errors,
    });

    match serde_json::to_string_pretty(&json) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("Failed to serialize results: {}", e),
    }
}
