//! # duprm
//!
//! Removes duplicate audio files, keeping the newest copy of each.
//!
//! Files are fingerprinted by their audio payload with metadata tags
//! excluded, so two copies that differ only in their ID3 tags are still
//! duplicates. Discarded copies go to the system trash, never straight to
//! deletion.
//!
//! ## Architecture
//! - `core` - Enumeration, fingerprinting, deduplication and deletion
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DuprmError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or debug
/// output when `verbose` is set. Logs go to stderr so they never mix with
/// JSON output. Calling this twice keeps the first subscriber.
pub fn init_tracing(verbose: bool) {
    init_tracing_with_writer(verbose, std::io::stderr);
}

/// Like [`init_tracing`], but log lines go through `writer`.
///
/// The CLI uses this to print logs above its status line.
pub fn init_tracing_with_writer<W>(verbose: bool, writer: W)
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let default = if verbose { "duprm=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
