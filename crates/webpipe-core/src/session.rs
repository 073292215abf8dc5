//! Conversion session: owns the single background worker and everything that
//! outlives one run (lifetime counters, the cancelled run held for resume).
//!
//! ```text
//! start/resume ──► spawn_blocking(worker) ──► BatchEvent channel ──► observer
//!                        │
//!                        └─► AppState (folded per file, saved at run end)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{SessionError, StateError};
use crate::error_log::ErrorLog;
use crate::pipeline::batch::{BatchPipeline, BatchRequest, BatchState, CancelFlag};
use crate::pipeline::events::{event_channel, BatchEvent, EventSender};
use crate::pipeline::transcode::ResolutionChooser;
use crate::state::{AppState, StateStore};
use crate::types::{RunReport, RunStatus, TranscodeResult};

/// Shared handle to a per-image resolution chooser.
pub type SharedChooser = Arc<dyn ResolutionChooser>;

/// Summary of a cancelled run waiting to be resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PausedRun {
    pub input_dir: std::path::PathBuf,
    pub output_dir: std::path::PathBuf,
    /// Index of the first unprocessed file
    pub cursor: usize,
    pub total_files: usize,
}

/// Entry point for running conversions.
///
/// At most one run is active per session. A cancelled run is kept in memory
/// and can be continued with [`ConversionSession::resume`]; starting a new
/// run discards it.
#[derive(Clone)]
pub struct ConversionSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: Config,
    pipeline: BatchPipeline,
    store: StateStore,
    state: Mutex<AppState>,
    paused: Mutex<Option<BatchState>>,
    active: AtomicBool,
}

enum Job {
    Fresh(BatchRequest),
    Resume(BatchState),
}

impl ConversionSession {
    /// Create a session, loading persisted state from the configured file.
    pub fn new(config: Config) -> Self {
        let error_log = config
            .error_log()
            .map(ErrorLog::new)
            .unwrap_or_else(ErrorLog::disabled);
        let store = StateStore::new(config.state_file());
        let state = store.load();
        tracing::debug!(
            "Session ready: {} file(s) converted so far, state at {:?}",
            state.total_files_converted,
            store.path()
        );

        Self {
            inner: Arc::new(SessionInner {
                pipeline: BatchPipeline::new(&config, error_log),
                config,
                store,
                state: Mutex::new(state),
                paused: Mutex::new(None),
                active: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Snapshot of the persisted state (last directories, lifetime counters).
    pub fn lifetime(&self) -> AppState {
        lock(&self.inner.state).clone()
    }

    /// Zero the lifetime counters and persist immediately.
    pub fn reset_lifetime(&self) -> Result<(), StateError> {
        let snapshot = {
            let mut state = lock(&self.inner.state);
            state.reset_lifetime();
            state.clone()
        };
        tracing::info!("Lifetime statistics reset");
        self.inner.store.save(&snapshot)
    }

    /// The cancelled run held for resume, if any.
    pub fn paused_run(&self) -> Option<PausedRun> {
        lock(&self.inner.paused).as_ref().map(|batch| PausedRun {
            input_dir: batch.input_dir().to_path_buf(),
            output_dir: batch.output_dir().to_path_buf(),
            cursor: batch.cursor(),
            total_files: batch.total(),
        })
    }

    /// Drop the cancelled run without resuming it.
    pub fn discard_paused(&self) {
        if lock(&self.inner.paused).take().is_some() {
            tracing::debug!("Discarded cancelled run");
        }
    }

    /// Start a new run on the background worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        request: BatchRequest,
        chooser: Option<SharedChooser>,
    ) -> Result<RunHandle, SessionError> {
        self.acquire()?;
        self.discard_paused();
        lock(&self.inner.state).remember_dirs(&request.input_dir, &request.output_dir);
        tracing::info!(
            "Starting run: {:?} -> {:?} ({:?})",
            request.input_dir,
            request.output_dir,
            request.mode
        );
        Ok(self.spawn(Job::Fresh(request), chooser))
    }

    /// Continue the cancelled run from its saved cursor.
    ///
    /// The file list captured when the run started is reused as is.
    pub fn resume(&self, chooser: Option<SharedChooser>) -> Result<RunHandle, SessionError> {
        self.acquire()?;
        let Some(batch) = lock(&self.inner.paused).take() else {
            self.inner.active.store(false, Ordering::SeqCst);
            return Err(SessionError::NothingToResume);
        };
        tracing::info!(
            "Resuming run at {}/{} in {:?}",
            batch.cursor(),
            batch.total(),
            batch.input_dir()
        );
        Ok(self.spawn(Job::Resume(batch), chooser))
    }

    fn acquire(&self) -> Result<(), SessionError> {
        self.inner
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| SessionError::AlreadyRunning)
    }

    fn spawn(&self, job: Job, chooser: Option<SharedChooser>) -> RunHandle {
        let (events, receiver) = event_channel(&self.inner.config.pipeline);
        let cancel = CancelFlag::new();
        let inner = Arc::clone(&self.inner);
        let worker_cancel = cancel.clone();

        let worker = tokio::task::spawn_blocking(move || {
            inner.execute(job, chooser.as_deref(), &worker_cancel, events)
        });

        RunHandle {
            events: receiver,
            cancel,
            worker,
        }
    }
}

/// Releases the active-run slot when dropped, even if the worker panics.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionInner {
    fn execute(
        &self,
        job: Job,
        chooser: Option<&dyn ResolutionChooser>,
        cancel: &CancelFlag,
        mut events: EventSender,
    ) -> RunReport {
        let guard = ActiveGuard(&self.active);

        let mut batch = match job {
            Job::Resume(batch) => batch,
            Job::Fresh(request) => match self.pipeline.prepare(&request) {
                Ok(batch) => batch,
                Err(e) => {
                    let report = RunReport {
                        status: RunStatus::Faulted,
                        error: Some(e.to_string()),
                        ..RunReport::default()
                    };
                    self.persist();
                    drop(guard);
                    events.send_blocking(BatchEvent::Finished(report.clone()));
                    return report;
                }
            },
        };

        let total = batch.total();
        events.send_blocking(BatchEvent::Started {
            total,
            resume_from: batch.cursor(),
        });

        for (index, result) in self.pipeline.run(&mut batch, cancel, chooser) {
            if let TranscodeResult::Converted(file) = &result {
                lock(&self.state).add_converted(file);
            }
            events.send_blocking(BatchEvent::FileFinished { index, result });
            events.send_blocking(BatchEvent::Progress {
                completed: index + 1,
                total,
            });
        }

        let report = RunReport {
            status: batch.status(),
            total_files: total,
            cursor: batch.cursor(),
            totals: batch.totals(),
            error: None,
        };
        tracing::info!(
            "Run {}: {}/{} files, {} converted, {} skipped, {} failed",
            report.status,
            report.cursor,
            report.total_files,
            report.totals.converted,
            report.totals.skipped,
            report.totals.failed
        );

        self.persist();
        if report.status == RunStatus::Cancelled {
            *lock(&self.paused) = Some(batch);
        }
        drop(guard);
        events.send_blocking(BatchEvent::Finished(report.clone()));
        report
    }

    fn persist(&self) {
        let snapshot = lock(&self.state).clone();
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!("Failed to save state: {}", e);
        }
    }
}

/// Handle to one running (or finished) run.
pub struct RunHandle {
    events: mpsc::Receiver<BatchEvent>,
    cancel: CancelFlag,
    worker: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Ask the worker to stop before its next file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the run's cancel flag, e.g. for a Ctrl+C handler.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Next event, or `None` once the worker has finished and the channel is
    /// drained.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Drain outstanding events and return the final report.
    pub async fn wait(mut self) -> Result<RunReport, SessionError> {
        while self.events.recv().await.is_some() {}
        self.worker
            .await
            .map_err(|e| SessionError::Worker(e.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
