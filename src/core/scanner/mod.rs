//! # Scanner Module
//!
//! Enumerates candidate audio files.
//!
//! Two sources, both lazy and single-pass:
//! - **Directory** - recursive walk matched against a glob (default `**/*.mp3`)
//! - **List** - newline-delimited paths read from a file in chunks
//!
//! Both yield paths relative to the run's base directory. Any error ends
//! enumeration; the pipeline treats it as fatal.
//!
//! ## Example
//! ```rust,ignore
//! use duprm::core::scanner::Source;
//!
//! let source = Source::directory("**/*.mp3", false);
//! for entry in source.open(Path::new("/music"))? {
//!     println!("{}", entry?.display());
//! }
//! ```

mod filter;
mod list;
mod walker;

pub use filter::{AudioFilter, DEFAULT_PATTERN};
pub use list::{ListReader, DEFAULT_CHUNK_SIZE};
pub use walker::GlobWalker;

use crate::error::ScanError;
use std::path::{Path, PathBuf};

/// Lazy stream of relative file paths
pub type FileStream = Box<dyn Iterator<Item = Result<PathBuf, ScanError>>>;

/// Where candidate files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Walk the base directory
    Directory {
        pattern: String,
        include_hidden: bool,
    },
    /// Read paths from a list file
    List { path: PathBuf },
}

impl Source {
    pub fn directory(pattern: impl Into<String>, include_hidden: bool) -> Self {
        Source::Directory {
            pattern: pattern.into(),
            include_hidden,
        }
    }

    pub fn list(path: impl Into<PathBuf>) -> Self {
        Source::List { path: path.into() }
    }

    /// Start enumerating. Directory sources walk `base_dir`.
    pub fn open(&self, base_dir: &Path) -> Result<FileStream, ScanError> {
        match self {
            Source::Directory {
                pattern,
                include_hidden,
            } => {
                let filter = AudioFilter::new(pattern)?.with_hidden(*include_hidden);
                Ok(Box::new(GlobWalker::new(base_dir, filter)?))
            }
            Source::List { path } => Ok(Box::new(ListReader::open(path)?)),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::directory(DEFAULT_PATTERN, false)
    }
}
