//! # Trash Module
//!
//! Moves discarded duplicates to the system trash without holding up the run.
//!
//! ## Design
//! - The pipeline hands paths to a [`DeletionDispatcher`] and carries on
//! - One background thread issues the deletes, one after another
//! - Outcomes flow back over a channel and can be polled at any time
//! - [`DeletionDispatcher::finish`] waits until every issued delete settles
//!
//! A failed delete is reported for that file only.

use crate::error::TrashError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Something that can dispose of a file
pub trait Trasher: Send + Sync {
    fn trash(&self, path: &Path) -> Result<(), TrashError>;
}

/// Moves files to the platform trash / recycle bin
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl SystemTrash {
    pub fn new() -> Self {
        Self
    }
}

impl Trasher for SystemTrash {
    fn trash(&self, path: &Path) -> Result<(), TrashError> {
        ::trash::delete(path).map_err(|e| TrashError::DeleteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Leaves files where they are and only logs what would be trashed
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunTrash;

impl DryRunTrash {
    pub fn new() -> Self {
        Self
    }
}

impl Trasher for DryRunTrash {
    fn trash(&self, path: &Path) -> Result<(), TrashError> {
        tracing::info!("[dry run] would trash {}", path.display());
        Ok(())
    }
}

/// Result of one delete; the error is already rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    pub result: Result<(), String>,
}

/// Every settled delete of a run
#[derive(Debug, Default)]
pub struct TrashReport {
    pub trashed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl TrashReport {
    fn record(&mut self, outcome: DeleteOutcome) {
        match outcome.result {
            Ok(()) => self.trashed.push(outcome.path),
            Err(reason) => self.failed.push((outcome.path, reason)),
        }
    }
}

/// Background deletion queue
pub struct DeletionDispatcher {
    queue: Sender<PathBuf>,
    outcomes: Receiver<DeleteOutcome>,
    thread: JoinHandle<()>,
    /// Outcomes already handed out by `try_outcomes`
    collected: TrashReport,
}

impl DeletionDispatcher {
    /// Start the deletion thread
    pub fn spawn(trasher: Arc<dyn Trasher>) -> Result<Self, TrashError> {
        let (queue, paths) = unbounded::<PathBuf>();
        let (results, outcomes) = unbounded();

        let thread = thread::Builder::new()
            .name("trash".to_string())
            .spawn(move || {
                for path in paths.iter() {
                    let result = match trasher.trash(&path) {
                        Ok(()) => {
                            tracing::debug!("Trashed {}", path.display());
                            Ok(())
                        }
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Err(e.to_string())
                        }
                    };
                    if results.send(DeleteOutcome { path, result }).is_err() {
                        break;
                    }
                }
            })
            .map_err(TrashError::Spawn)?;

        Ok(Self {
            queue,
            outcomes,
            thread,
            collected: TrashReport::default(),
        })
    }

    /// Queue a delete. Never blocks.
    pub fn schedule(&self, path: PathBuf) {
        if let Err(e) = self.queue.send(path) {
            // Only if the deletion thread died
            tracing::error!("Deletion thread is gone, cannot trash {}", e.into_inner().display());
        }
    }

    /// Outcomes that have settled since the last call
    pub fn try_outcomes(&mut self) -> Vec<DeleteOutcome> {
        let settled: Vec<DeleteOutcome> = self.outcomes.try_iter().collect();
        for outcome in &settled {
            self.collected.record(outcome.clone());
        }
        settled
    }

    /// Close the queue and wait for every scheduled delete
    pub fn finish(self) -> TrashReport {
        let DeletionDispatcher {
            queue,
            outcomes,
            thread,
            mut collected,
        } = self;
        drop(queue);

        for outcome in outcomes.iter() {
            collected.record(outcome);
        }
        if thread.join().is_err() {
            tracing::error!("Deletion thread panicked");
        }

        collected
    }
}
