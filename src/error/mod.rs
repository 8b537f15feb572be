//! # Error Module
//!
//! Error types for the duplicate remover.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, line numbers, what went wrong
//! - **Per-file errors are local** - only enumeration errors end a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuprmError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Trash error: {0}")]
    Trash(#[from] TrashError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating candidate files.
///
/// Any of these ends the run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to read file list {path}: {source}")]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File list {path} line {line} is not valid UTF-8")]
    InvalidListEntry { path: PathBuf, line: usize },
}

/// Errors that occur while fingerprinting a single file
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read timestamps of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    /// Classify an I/O error raised while reading `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FingerprintError::NotFound { path }
        } else {
            FingerprintError::Io { path, source }
        }
    }
}

/// Errors raised by the worker pool
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Worker pool size must be at least 1")]
    InvalidSize,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Worker {worker} terminated: {reason}")]
    WorkerTerminated { worker: usize, reason: String },

    #[error("No workers left to accept {path}")]
    NoWorkers { path: PathBuf },
}

/// Errors raised while moving a file to the trash
#[derive(Error, Debug)]
pub enum TrashError {
    #[error("Failed to move {path} to trash: {reason}")]
    DeleteFailed { path: PathBuf, reason: String },

    #[error("Failed to start the deletion thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuprmError>;
