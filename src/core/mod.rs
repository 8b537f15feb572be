//! # Core Module
//!
//! The duplicate removal engine, independent of any terminal output.
//!
//! ## Modules
//! - `scanner` - Enumerates candidate files (directory glob or list file)
//! - `fingerprint` - Hashes audio payloads with tags stripped
//! - `pool` - Worker threads that compute fingerprints in parallel
//! - `dedup` - Keeps the newest file of each fingerprint
//! - `trash` - Moves discarded files to the trash in the background
//! - `reporter` - Progress sinks and the status line text
//! - `pipeline` - Orchestrates a run

pub mod dedup;
pub mod fingerprint;
pub mod pipeline;
pub mod pool;
pub mod reporter;
pub mod scanner;
pub mod trash;

// Re-export commonly used types
pub use dedup::{Decision, DedupEngine, FileRecord};
pub use fingerprint::{Fingerprint, FingerprintComputer, FingerprintData, Md5Fingerprinter};
pub use reporter::{format_status, ProgressSink};
pub use scanner::Source;
