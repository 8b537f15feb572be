//! A single fingerprint worker thread and its handle.

use super::router::Load;
use crate::core::fingerprint::{FingerprintComputer, FingerprintData};
use crate::core::pipeline::CancellationToken;
use crate::error::{FingerprintError, PoolError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Identifier of a worker within its pool
pub type WorkerId = usize;

/// Message from a worker thread to the pool
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    Done {
        worker: WorkerId,
        file: PathBuf,
        result: Result<FingerprintData, FingerprintError>,
    },
    Exited {
        worker: WorkerId,
        reason: String,
    },
}

/// A submitted file waiting for its worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub file: PathBuf,
    pub worker: WorkerId,
    /// Discovery index of the file
    pub sequence: u64,
}

/// The pool's side of one worker
pub(crate) struct WorkerHandle {
    pub(crate) id: WorkerId,
    inbox: Sender<PathBuf>,
    /// One entry per filename; a resubmission replaces the earlier entry
    pub(crate) pending: HashMap<PathBuf, PendingTask>,
    thread: Option<JoinHandle<()>>,
}

impl Load for WorkerHandle {
    fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

impl WorkerHandle {
    pub(crate) fn spawn(
        id: WorkerId,
        computer: Arc<dyn FingerprintComputer>,
        outbox: Sender<WorkerMessage>,
        cancel: CancellationToken,
    ) -> Result<Self, PoolError> {
        let (inbox, jobs) = unbounded();

        let thread = thread::Builder::new()
            .name(format!("fingerprint-{}", id))
            .spawn(move || run(id, jobs, outbox, computer, cancel))
            .map_err(PoolError::Spawn)?;

        Ok(Self {
            id,
            inbox,
            pending: HashMap::new(),
            thread: Some(thread),
        })
    }

    /// Queue `file` on this worker. Fails if the thread is gone.
    pub(crate) fn post(&self, file: PathBuf) -> Result<(), PathBuf> {
        self.inbox.send(file).map_err(|e| e.into_inner())
    }

    /// Close the inbox and wait for the thread to finish its queue
    pub(crate) fn join(self) {
        let WorkerHandle {
            id, inbox, thread, ..
        } = self;
        drop(inbox);

        if let Some(thread) = thread {
            if thread.join().is_err() {
                tracing::debug!("Worker {} had panicked", id);
            }
        }
    }
}

/// Reports the worker's exit however the thread ends, including by panic.
struct ExitNotice {
    worker: WorkerId,
    outbox: Sender<WorkerMessage>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        let reason = if thread::panicking() {
            "panicked while fingerprinting"
        } else {
            "stopped"
        };
        let _ = self.outbox.send(WorkerMessage::Exited {
            worker: self.worker,
            reason: reason.to_string(),
        });
    }
}

fn run(
    worker: WorkerId,
    jobs: Receiver<PathBuf>,
    outbox: Sender<WorkerMessage>,
    computer: Arc<dyn FingerprintComputer>,
    cancel: CancellationToken,
) {
    let _notice = ExitNotice {
        worker,
        outbox: outbox.clone(),
    };

    for file in jobs.iter() {
        if cancel.is_cancelled() {
            break;
        }

        let result = computer.compute(&file);
        if outbox
            .send(WorkerMessage::Done {
                worker,
                file,
                result,
            })
            .is_err()
        {
            break;
        }
    }
}
