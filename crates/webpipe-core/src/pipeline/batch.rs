//! Resumable, cancellable batch loop over a directory of source files.
//!
//! A run moves Idle → Running → Completed | Cancelled | Faulted. The file list
//! is captured once in [`BatchPipeline::prepare`]; resuming a cancelled run
//! reuses that list and its cursor, so indices stay stable within a session
//! even if the directory changes on disk in the meantime.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::DirectoryError;
use crate::error_log::ErrorLog;
use crate::types::{ResolutionMode, RunStatus, RunTotals, TranscodeResult};

use super::discovery::FileDiscovery;
use super::transcode::{ResolutionChooser, Transcoder};

/// Parameters of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: ResolutionMode,
    /// Index of the first file to process
    pub resume_from: usize,
}

impl BatchRequest {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            mode: ResolutionMode::Automatic,
            resume_from: 0,
        }
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn resume_from(mut self, index: usize) -> Self {
        self.resume_from = index;
        self
    }
}

/// Cooperative cancellation flag, checked between files only.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next file.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request so the same run can be resumed.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Mutable state of one run, owned by whoever drives the pipeline.
///
/// Invariant: `cursor <= files.len()`, and the cursor only moves forward.
#[derive(Debug, Clone)]
pub struct BatchState {
    input_dir: PathBuf,
    output_dir: PathBuf,
    mode: ResolutionMode,
    files: Vec<PathBuf>,
    cursor: usize,
    totals: RunTotals,
    status: RunStatus,
}

impl BatchState {
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// The fixed file list captured at start.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Index of the next file to process.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Totals over every file processed by this run, across resumes.
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }
}

/// Enumerates source files and transcodes them one at a time.
pub struct BatchPipeline {
    transcoder: Transcoder,
    discovery: FileDiscovery,
    error_log: ErrorLog,
}

impl BatchPipeline {
    /// Create a pipeline. Failures are recorded in `error_log`.
    pub fn new(config: &Config, error_log: ErrorLog) -> Self {
        Self {
            transcoder: Transcoder::new(config),
            discovery: FileDiscovery::new(&config.conversion),
            error_log,
        }
    }

    /// Start a run: ensure the output directory, capture the file list and
    /// position the cursor at `request.resume_from`.
    ///
    /// Directory failures are fatal for the run and are written to the error
    /// log before being returned.
    pub fn prepare(&self, request: &BatchRequest) -> Result<BatchState, DirectoryError> {
        let result = self.try_prepare(request);
        if let Err(e) = &result {
            self.error_log.critical(&format!("Run aborted: {e}"));
        }
        result
    }

    fn try_prepare(&self, request: &BatchRequest) -> Result<BatchState, DirectoryError> {
        std::fs::create_dir_all(&request.output_dir).map_err(|e| {
            DirectoryError::OutputUncreatable {
                path: request.output_dir.clone(),
                message: e.to_string(),
            }
        })?;

        let files = self.discovery.discover(&request.input_dir)?;

        let cursor = if request.resume_from > files.len() {
            tracing::warn!(
                "Resume index {} is past the end of {} file(s); nothing left to process",
                request.resume_from,
                files.len()
            );
            files.len()
        } else {
            request.resume_from
        };

        tracing::info!(
            "Prepared run over {} file(s) in {:?}, starting at {}",
            files.len(),
            request.input_dir,
            cursor
        );

        Ok(BatchState {
            input_dir: request.input_dir.clone(),
            output_dir: request.output_dir.clone(),
            mode: request.mode,
            files,
            cursor,
            totals: RunTotals::default(),
            status: RunStatus::Idle,
        })
    }

    /// Drive `state` from its cursor. Each `next()` processes one file.
    ///
    /// Iteration ends when the list is exhausted (Completed) or `cancel` is
    /// set (Cancelled, cursor kept at the first unprocessed file).
    pub fn run<'a>(
        &'a self,
        state: &'a mut BatchState,
        cancel: &'a CancelFlag,
        chooser: Option<&'a dyn ResolutionChooser>,
    ) -> BatchRun<'a> {
        state.status = RunStatus::Running;
        BatchRun {
            pipeline: self,
            state,
            cancel,
            chooser,
        }
    }

    fn process(
        &self,
        source: &Path,
        state: &BatchState,
        chooser: Option<&dyn ResolutionChooser>,
    ) -> TranscodeResult {
        let dest = self.discovery.destination_for(source, &state.output_dir);
        let result = self.transcoder.transcode(source, &dest, state.mode, chooser);
        if let TranscodeResult::Failed { error, .. } = &result {
            self.error_log.error(error);
        }
        result
    }
}

/// Iterator over `(index, result)` for one run segment.
pub struct BatchRun<'a> {
    pipeline: &'a BatchPipeline,
    state: &'a mut BatchState,
    cancel: &'a CancelFlag,
    chooser: Option<&'a dyn ResolutionChooser>,
}

impl BatchRun<'_> {
    /// Current run state (cursor, totals, status).
    pub fn state(&self) -> &BatchState {
        self.state
    }
}

impl Iterator for BatchRun<'_> {
    type Item = (usize, TranscodeResult);

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.status != RunStatus::Running {
            return None;
        }
        if self.state.cursor >= self.state.files.len() {
            self.state.status = RunStatus::Completed;
            tracing::info!("Run completed: {:?}", self.state.totals);
            return None;
        }
        if self.cancel.is_cancelled() {
            self.state.status = RunStatus::Cancelled;
            tracing::info!(
                "Run cancelled at {}/{}",
                self.state.cursor,
                self.state.files.len()
            );
            return None;
        }

        let index = self.state.cursor;
        let source = self.state.files[index].clone();
        let result = self.pipeline.process(&source, self.state, self.chooser);

        self.state.cursor += 1;
        self.state.totals.record(&result);
        Some((index, result))
    }
}
