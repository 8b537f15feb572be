//! # Dedup Module
//!
//! Resolves duplicate fingerprints as computations complete.
//!
//! ## Rule
//! For each completed file, look up the kept record with the same
//! fingerprint:
//! - none: keep the file
//! - the incoming file is strictly newer: trash the kept one, keep the incoming
//! - otherwise (older or equal): trash the incoming file
//!
//! The decision only compares the two timestamps involved, so the newest copy
//! survives whatever order completions arrive in. On equal timestamps the file
//! kept first wins.
//!
//! A completion for the path that is already kept (a list naming the same file
//! twice) is a repeat, not a duplicate: nothing changes and nothing is trashed.

mod registry;

pub use registry::{FileRecord, Registry};

use crate::core::fingerprint::FingerprintData;
use std::path::{Path, PathBuf};

/// Outcome of observing one completed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// First file with this fingerprint
    Kept,
    /// The incoming file is newer; the previously kept file is discarded
    Replaced { discarded: PathBuf },
    /// The incoming file is not newer; it is discarded and `kept` stays
    Discarded { kept: PathBuf },
    /// The incoming path is the kept file itself
    Repeated,
}

impl Decision {
    /// The path to trash, given the incoming file's path
    pub fn trash_target<'a>(&'a self, incoming: &'a Path) -> Option<&'a Path> {
        match self {
            Decision::Kept | Decision::Repeated => None,
            Decision::Replaced { discarded } => Some(discarded),
            Decision::Discarded { .. } => Some(incoming),
        }
    }

    /// The path that stays, given the incoming file's path
    pub fn kept_path<'a>(&'a self, incoming: &'a Path) -> &'a Path {
        match self {
            Decision::Kept | Decision::Repeated | Decision::Replaced { .. } => incoming,
            Decision::Discarded { kept } => kept,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Decision::Replaced { .. } | Decision::Discarded { .. })
    }
}

/// Owns the registry and applies the keep-newest rule.
///
/// Must be driven from a single thread; each call to [`observe`] is one
/// complete registry mutation.
///
/// [`observe`]: DedupEngine::observe
#[derive(Debug, Default)]
pub struct DedupEngine {
    registry: Registry,
    trashed: usize,
}

impl DedupEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one completed computation
    pub fn observe(&mut self, name: PathBuf, data: FingerprintData) -> Decision {
        let decision = match self.registry.get(&data.fingerprint) {
            None => Decision::Kept,
            Some(existing) if existing.name == name => {
                tracing::warn!("{} was submitted more than once", name.display());
                Decision::Repeated
            }
            Some(existing) if data.time > existing.time => Decision::Replaced {
                discarded: existing.name.clone(),
            },
            Some(existing) => Decision::Discarded {
                kept: existing.name.clone(),
            },
        };

        match decision {
            Decision::Kept => {
                self.registry.insert(FileRecord {
                    name,
                    time: data.time,
                    fingerprint: data.fingerprint,
                });
            }
            Decision::Replaced { .. } => {
                self.registry.remove(&data.fingerprint);
                self.registry.insert(FileRecord {
                    name,
                    time: data.time,
                    fingerprint: data.fingerprint,
                });
                self.trashed += 1;
            }
            Decision::Discarded { .. } => self.trashed += 1,
            Decision::Repeated => {}
        }

        decision
    }

    /// Files currently kept
    pub fn kept(&self) -> usize {
        self.registry.len()
    }

    /// Files discarded so far
    pub fn trashed(&self) -> usize {
        self.trashed
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}
