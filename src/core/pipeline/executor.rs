//! Pipeline execution implementation.

use super::cancel::CancellationToken;
use super::context::{RunContext, RunOutcome};
use crate::core::dedup::FileRecord;
use crate::core::fingerprint::{FingerprintComputer, Md5Fingerprinter};
use crate::core::pool::{WorkerPool, DEFAULT_WORKERS};
use crate::core::scanner::{Source, DEFAULT_PATTERN};
use crate::core::trash::{DeletionDispatcher, DryRunTrash, SystemTrash, Trasher};
use crate::error::DuprmError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Result of pipeline execution
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// Files left in place, in the order they were first kept
    pub kept: Vec<FileRecord>,
    /// Files moved to the trash
    pub trashed: Vec<PathBuf>,
    /// Deletes that failed, with the reason
    pub trash_failures: Vec<(PathBuf, String)>,
    /// Per-file errors (non-fatal)
    pub errors: Vec<String>,
    /// Files enumerated
    pub total_files: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_files: self.total_files,
            kept: self.kept.len(),
            trashed: self.trashed.len() + self.trash_failures.len(),
            trash_failures: self.trash_failures.len(),
            errors: self.errors.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Clone)]
pub struct PipelineConfig {
    /// Directory to walk, and the base that list entries are joined onto
    pub base_dir: PathBuf,
    /// Read paths from this file instead of walking
    pub list: Option<PathBuf>,
    /// Glob matched against paths relative to `base_dir`
    pub pattern: String,
    pub include_hidden: bool,
    /// Number of fingerprint workers
    pub workers: usize,
    pub computer: Arc<dyn FingerprintComputer>,
    pub trasher: Arc<dyn Trasher>,
}

impl PipelineConfig {
    /// Where candidate files come from
    pub fn source(&self) -> Source {
        match &self.list {
            Some(list) => Source::list(list.clone()),
            None => Source::directory(self.pattern.clone(), self.include_hidden),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            list: None,
            pattern: DEFAULT_PATTERN.to_string(),
            include_hidden: false,
            workers: DEFAULT_WORKERS,
            computer: Arc::new(Md5Fingerprinter::new()),
            trasher: Arc::new(SystemTrash::new()),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Directory to scan (and base for list entries)
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    /// Read candidate paths from a list file instead of scanning
    pub fn list(mut self, list: impl Into<PathBuf>) -> Self {
        self.config.list = Some(list.into());
        self
    }

    /// Set the glob pattern for directory scans
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.include_hidden = include;
        self
    }

    /// Set the worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Replace the fingerprint computer
    pub fn fingerprinter(mut self, computer: Arc<dyn FingerprintComputer>) -> Self {
        self.config.computer = computer;
        self
    }

    /// Replace the trash implementation
    pub fn trasher(mut self, trasher: Arc<dyn Trasher>) -> Self {
        self.config.trasher = trasher;
        self
    }

    /// Log deletes instead of performing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        if dry_run {
            self.config.trasher = Arc::new(DryRunTrash::new());
        }
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate removal pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, DuprmError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, DuprmError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));
        set_phase(events, PipelinePhase::Scanning);

        let base_dir = &self.config.base_dir;
        let files = self
            .config
            .source()
            .open(base_dir)
            .map_err(|e| abort(events, e.into()))?;

        let cancel = CancellationToken::new();
        let mut pool = WorkerPool::new(
            self.config.workers,
            Arc::clone(&self.config.computer),
            cancel,
        )
        .map_err(|e| abort(events, e.into()))?;
        let dispatcher = match DeletionDispatcher::spawn(Arc::clone(&self.config.trasher)) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                pool.abort();
                return Err(abort(events, e.into()));
            }
        };

        let mut run = RunContext::new(events, dispatcher);
        run.emit_status();

        for entry in files {
            let relative = match entry {
                Ok(relative) => relative,
                Err(e) => {
                    pool.abort();
                    // Deletes already issued still run to completion
                    let outcome = run.finish();
                    tracing::debug!(
                        "Aborted after {} file(s), {} delete(s) settled",
                        outcome.total,
                        outcome.trash.trashed.len() + outcome.trash.failed.len()
                    );
                    return Err(abort(events, e.into()));
                }
            };

            let path = base_dir.join(relative);
            let sequence = run.discovered(&path);
            if let Err(e) = pool.submit(path.clone(), sequence) {
                run.file_failed(path, e.into());
            }

            while let Some(completion) = pool.try_next() {
                run.complete(completion);
            }
            run.collect_deletes();
        }

        run.scanning_finished();
        set_phase(events, PipelinePhase::Draining);
        tracing::debug!("Enumeration finished, {} request(s) in flight", pool.in_flight());

        while let Some(completion) = pool.next() {
            run.complete(completion);
            run.collect_deletes();
        }
        pool.shutdown();

        let final_status = run.status();
        let RunOutcome {
            registry,
            trash,
            errors,
            total,
        } = run.finish();

        let result = PipelineResult {
            kept: registry.into_records(),
            trashed: trash.trashed,
            trash_failures: trash.failed,
            errors,
            total_files: total,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Status(final_status)));
        set_phase(events, PipelinePhase::Done);
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }
}

fn set_phase(events: &EventSender, phase: PipelinePhase) {
    tracing::debug!("Phase: {}", phase);
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

/// Announce a fatal error and hand it back
fn abort(events: &EventSender, error: DuprmError) -> DuprmError {
    tracing::error!("{}", error);
    set_phase(events, PipelinePhase::Aborted);
    events.send(Event::Pipeline(PipelineEvent::Error {
        message: error.to_string(),
    }));
    error
}
