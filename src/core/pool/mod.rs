//! # Pool Module
//!
//! A fixed set of worker threads computing fingerprints in parallel.
//!
//! ## Design
//! - Each worker has its own inbox; all workers share one result channel
//! - Submissions go to the least-loaded worker (see [`router`])
//! - Each worker tracks its pending requests by filename, and results are
//!   matched back to those entries when they arrive
//! - A worker that dies fails all of its pending requests and is not
//!   replaced; the pool keeps going with the workers it has left
//!
//! The pool is driven from one thread: [`WorkerPool::submit`] never blocks,
//! and completions are collected with [`WorkerPool::try_next`] or
//! [`WorkerPool::next`].

pub mod router;
mod worker;

pub use worker::{PendingTask, WorkerId};

use crate::core::fingerprint::{FingerprintComputer, FingerprintData};
use crate::core::pipeline::CancellationToken;
use crate::error::{DuprmError, PoolError};
use crossbeam_channel::{unbounded, Receiver};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use worker::{WorkerHandle, WorkerMessage};

/// Number of workers when none is configured
pub const DEFAULT_WORKERS: usize = 64;

/// A finished (or failed) request
#[derive(Debug)]
pub struct Completion {
    pub file: PathBuf,
    pub worker: WorkerId,
    /// Discovery index given at submission
    pub sequence: u64,
    pub result: Result<FingerprintData, DuprmError>,
}

/// Fixed-size pool of fingerprint workers
pub struct WorkerPool {
    /// Live workers in routing order
    units: Vec<WorkerHandle>,
    /// Workers that have exited
    retired: Vec<WorkerHandle>,
    results: Receiver<WorkerMessage>,
    ready: VecDeque<Completion>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Start `size` workers sharing `computer`
    pub fn new(
        size: usize,
        computer: Arc<dyn FingerprintComputer>,
        cancel: CancellationToken,
    ) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::InvalidSize);
        }

        let (outbox, results) = unbounded();
        let units = (0..size)
            .map(|id| {
                WorkerHandle::spawn(id, Arc::clone(&computer), outbox.clone(), cancel.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Started {} fingerprint workers", size);

        Ok(Self {
            units,
            retired: Vec::new(),
            results,
            ready: VecDeque::new(),
            cancel,
        })
    }

    /// Route `file` to the least-loaded worker
    pub fn submit(&mut self, file: PathBuf, sequence: u64) -> Result<WorkerId, PoolError> {
        let unit = match router::next_unit(&mut self.units) {
            Some(unit) => unit,
            None => return Err(PoolError::NoWorkers { path: file }),
        };

        let task = PendingTask {
            file: file.clone(),
            worker: unit.id,
            sequence,
        };
        if let Some(previous) = unit.pending.insert(file.clone(), task) {
            tracing::warn!(
                "{} was already pending on worker {} (discovered #{}); only one result will be matched",
                previous.file.display(),
                unit.id,
                previous.sequence
            );
        }

        if let Err(file) = unit.post(file) {
            unit.pending.remove(&file);
            return Err(PoolError::WorkerTerminated {
                worker: unit.id,
                reason: "inbox closed".to_string(),
            });
        }

        Ok(unit.id)
    }

    /// Next completion, if one is available right now
    pub fn try_next(&mut self) -> Option<Completion> {
        loop {
            if let Some(completion) = self.ready.pop_front() {
                return Some(completion);
            }
            match self.results.try_recv() {
                Ok(message) => self.handle(message),
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next completion; `None` once nothing is in flight
    pub fn next(&mut self) -> Option<Completion> {
        loop {
            if let Some(completion) = self.ready.pop_front() {
                return Some(completion);
            }
            if self.in_flight() == 0 {
                return None;
            }
            match self.results.recv() {
                Ok(message) => self.handle(message),
                Err(_) => {
                    for id in self.units.iter().map(|u| u.id).collect::<Vec<_>>() {
                        self.retire(id, "result channel closed");
                    }
                }
            }
        }
    }

    /// Requests submitted but not yet completed
    pub fn in_flight(&self) -> usize {
        self.units.iter().map(|u| u.pending.len()).sum()
    }

    /// Workers still accepting requests
    pub fn live_workers(&self) -> usize {
        self.units.len()
    }

    /// Close every inbox and wait for the threads to exit
    pub fn shutdown(self) {
        let WorkerPool { units, retired, .. } = self;
        for unit in units.into_iter().chain(retired) {
            unit.join();
        }
    }

    /// Stop workers without waiting for them
    pub fn abort(self) {
        self.cancel.cancel();
        tracing::debug!(
            "Abandoning {} in-flight request(s) on {} worker(s)",
            self.in_flight(),
            self.units.len()
        );
    }

    fn handle(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Done {
                worker,
                file,
                result,
            } => {
                let task = self
                    .units
                    .iter_mut()
                    .find(|u| u.id == worker)
                    .and_then(|u| u.pending.remove(&file));

                match task {
                    Some(task) => self.ready.push_back(Completion {
                        file: task.file,
                        worker,
                        sequence: task.sequence,
                        result: result.map_err(DuprmError::from),
                    }),
                    None => tracing::warn!("Unknown file from worker {}: {}", worker, file.display()),
                }
            }
            WorkerMessage::Exited { worker, reason } => self.retire(worker, &reason),
        }
    }

    fn retire(&mut self, worker: WorkerId, reason: &str) {
        let Some(position) = self.units.iter().position(|u| u.id == worker) else {
            return;
        };
        let mut unit = self.units.remove(position);

        let mut orphans: Vec<PendingTask> = unit.pending.drain().map(|(_, task)| task).collect();
        orphans.sort_by_key(|task| task.sequence);

        if !orphans.is_empty() {
            tracing::warn!(
                "Worker {} {}; failing {} pending request(s), {} worker(s) left",
                worker,
                reason,
                orphans.len(),
                self.units.len()
            );
        }

        for task in orphans {
            self.ready.push_back(Completion {
                file: task.file,
                worker,
                sequence: task.sequence,
                result: Err(PoolError::WorkerTerminated {
                    worker,
                    reason: reason.to_string(),
                }
                .into()),
            });
        }

        self.retired.push(unit);
    }
}
