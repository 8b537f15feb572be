//! Run-scoped state owned by the orchestrating thread.

use crate::core::dedup::{Decision, DedupEngine, Registry};
use crate::core::pool::Completion;
use crate::core::trash::{DeleteOutcome, DeletionDispatcher, TrashReport};
use crate::error::DuprmError;
use crate::events::{
    DedupEvent, Event, EventSender, FingerprintEvent, PipelineEvent, RunStatus, ScanEvent,
    TrashEvent,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Everything one run mutates: the registry, the counters, the delete queue.
pub(crate) struct RunContext<'a> {
    events: &'a EventSender,
    engine: DedupEngine,
    dispatcher: DeletionDispatcher,
    total: usize,
    still_scanning: bool,
    errors: Vec<String>,
    /// Deletes already reported through events, split by outcome
    reported_ok: usize,
    reported_failed: usize,
}

/// What remains of a run once every delete has settled
pub(crate) struct RunOutcome {
    pub registry: Registry,
    pub trash: TrashReport,
    pub errors: Vec<String>,
    pub total: usize,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(events: &'a EventSender, dispatcher: DeletionDispatcher) -> Self {
        Self {
            events,
            engine: DedupEngine::new(),
            dispatcher,
            total: 0,
            still_scanning: true,
            errors: Vec::new(),
            reported_ok: 0,
            reported_failed: 0,
        }
    }

    pub(crate) fn status(&self) -> RunStatus {
        RunStatus {
            kept: self.engine.kept(),
            trashed: self.engine.trashed(),
            total: self.total,
            still_scanning: self.still_scanning,
        }
    }

    fn emit(&self, event: Event) {
        self.events.send(event);
    }

    pub(crate) fn emit_status(&self) {
        self.emit(Event::Pipeline(PipelineEvent::Status(self.status())));
    }

    /// Count a newly enumerated file; returns its discovery index
    pub(crate) fn discovered(&mut self, path: &Path) -> u64 {
        let sequence = self.total as u64;
        self.total += 1;

        self.emit(Event::Scan(ScanEvent::FileFound {
            path: path.to_path_buf(),
            total_found: self.total,
        }));
        self.emit_status();
        sequence
    }

    pub(crate) fn scanning_finished(&mut self) {
        self.still_scanning = false;
        self.emit(Event::Scan(ScanEvent::Completed {
            total_files: self.total,
        }));
        self.emit_status();
    }

    /// Record a per-file failure. The run carries on.
    pub(crate) fn file_failed(&mut self, path: PathBuf, error: DuprmError) {
        let message = match &error {
            // These already name the file
            DuprmError::Fingerprint(_) => error.to_string(),
            _ => format!("{}: {}", path.display(), error),
        };
        tracing::error!("{}", message);

        self.emit(Event::Fingerprint(FingerprintEvent::Error {
            path,
            message: message.clone(),
        }));
        self.errors.push(message);
    }

    /// React to one completed computation
    pub(crate) fn complete(&mut self, completion: Completion) {
        let data = match completion.result {
            Ok(data) => data,
            Err(e) => return self.file_failed(completion.file, e),
        };

        tracing::debug!("{} {}", data.fingerprint, completion.file.display());
        self.emit(Event::Fingerprint(FingerprintEvent::Computed {
            path: completion.file.clone(),
            fingerprint: data.fingerprint.to_hex(),
        }));

        let fingerprint = data.fingerprint;
        let incoming_time = data.time;
        let existing_time = self.engine.registry().get(&fingerprint).map(|r| r.time);
        let incoming = completion.file;
        let decision = self.engine.observe(incoming.clone(), data);

        let existing = match &decision {
            Decision::Kept | Decision::Repeated => None,
            Decision::Replaced { discarded } => Some(discarded.clone()),
            Decision::Discarded { kept } => Some(kept.clone()),
        };

        if let (Some(existing), Some(existing_time)) = (existing, existing_time) {
            let kept = decision.kept_path(&incoming).to_path_buf();
            tracing::info!(
                "Match {}: keeping {}, existing {}",
                fingerprint,
                kept.display(),
                existing.display()
            );
            self.emit(Event::Dedup(DedupEvent::Match {
                fingerprint: fingerprint.to_hex(),
                incoming: incoming.clone(),
                incoming_created: DateTime::<Utc>::from(incoming_time),
                existing,
                existing_created: DateTime::<Utc>::from(existing_time),
                kept,
            }));
        }

        if let Some(target) = decision.trash_target(&incoming) {
            let target = target.to_path_buf();
            self.emit(Event::Trash(TrashEvent::Scheduled {
                path: target.clone(),
            }));
            self.dispatcher.schedule(target);
        }

        self.emit_status();
    }

    /// Publish deletes that settled since the last call
    pub(crate) fn collect_deletes(&mut self) {
        for outcome in self.dispatcher.try_outcomes() {
            self.report_delete(outcome);
        }
    }

    fn report_delete(&mut self, outcome: DeleteOutcome) {
        let event = match outcome.result {
            Ok(()) => {
                self.reported_ok += 1;
                TrashEvent::Trashed { path: outcome.path }
            }
            Err(message) => {
                self.reported_failed += 1;
                TrashEvent::Failed {
                    path: outcome.path,
                    message,
                }
            }
        };
        self.emit(Event::Trash(event));
    }

    /// Wait for the remaining deletes and hand back the run's results
    pub(crate) fn finish(self) -> RunOutcome {
        let RunContext {
            events,
            engine,
            dispatcher,
            total,
            errors,
            reported_ok,
            reported_failed,
            ..
        } = self;

        let trash = dispatcher.finish();

        // The report lists polled outcomes first, so the tails are new
        for path in trash.trashed.iter().skip(reported_ok) {
            events.send(Event::Trash(TrashEvent::Trashed { path: path.clone() }));
        }
        for (path, message) in trash.failed.iter().skip(reported_failed) {
            events.send(Event::Trash(TrashEvent::Failed {
                path: path.clone(),
                message: message.clone(),
            }));
        }

        RunOutcome {
            registry: engine.into_registry(),
            trash,
            errors,
            total,
        }
    }
}
