//! Event type definitions for progress reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate remover pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// File enumeration events
    Scan(ScanEvent),
    /// Fingerprint computation events
    Fingerprint(FingerprintEvent),
    /// Duplicate resolution events
    Dedup(DedupEvent),
    /// Deletion events
    Trash(TrashEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// A candidate file was discovered
    FileFound { path: PathBuf, total_found: usize },
    /// Enumeration finished
    Completed { total_files: usize },
}

/// Events from the worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// A fingerprint was computed
    Computed { path: PathBuf, fingerprint: String },
    /// Fingerprinting failed for one file; the run continues
    Error { path: PathBuf, message: String },
}

/// Events from the deduplication engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// Two files share a fingerprint
    Match {
        fingerprint: String,
        incoming: PathBuf,
        incoming_created: DateTime<Utc>,
        existing: PathBuf,
        existing_created: DateTime<Utc>,
        /// The file that stays
        kept: PathBuf,
    },
}

/// Events from the deletion dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrashEvent {
    /// A file was handed to the dispatcher
    Scheduled { path: PathBuf },
    /// The file is in the trash
    Trashed { path: PathBuf },
    /// The delete failed; other files are unaffected
    Failed { path: PathBuf, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// One of the run counters changed
    Status(RunStatus),
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    /// Enumerating and dispatching files
    Scanning,
    /// Enumeration finished, waiting for outstanding work
    Draining,
    /// Every file and every delete has settled
    Done,
    /// Enumeration failed
    Aborted,
}

/// Snapshot of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    /// Files currently kept in the registry
    pub kept: usize,
    /// Files scheduled for deletion
    pub trashed: usize,
    /// Files discovered so far
    pub total: usize,
    /// Whether enumeration is still running
    pub still_scanning: bool,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total files enumerated
    pub total_files: usize,
    /// Files kept
    pub kept: usize,
    /// Files scheduled for deletion
    pub trashed: usize,
    /// Deletes that failed
    pub trash_failures: usize,
    /// Per-file errors
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Draining => write!(f, "Draining"),
            PipelinePhase::Done => write!(f, "Done"),
            PipelinePhase::Aborted => write!(f, "Aborted"),
        }
    }
}
