//! Persisted state: last directories and lifetime statistics.
//!
//! Only these four values survive a process. The per-run file list and
//! resume cursor live in memory for in-session pause/resume.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StateError;
use crate::types::ConvertedFile;

/// The persisted key-value document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppState {
    /// Last input directory, empty when none was chosen yet
    pub input_dir: String,
    /// Last output directory, empty when none was chosen yet
    pub output_dir: String,
    pub total_files_converted: u64,
    /// Lifetime `input_size - output_size` sum in bytes; may go negative
    pub total_space_saved: i64,
}

impl AppState {
    /// Fold one converted file into the lifetime counters.
    pub fn add_converted(&mut self, file: &ConvertedFile) {
        self.total_files_converted += 1;
        self.total_space_saved += file.bytes_saved();
    }

    /// Zero the lifetime counters, keeping the remembered directories.
    pub fn reset_lifetime(&mut self) {
        self.total_files_converted = 0;
        self.total_space_saved = 0;
    }

    /// Remember the directories of the latest run.
    pub fn remember_dirs(&mut self, input_dir: &Path, output_dir: &Path) {
        self.input_dir = input_dir.to_string_lossy().into_owned();
        self.output_dir = output_dir.to_string_lossy().into_owned();
    }

    /// Last input directory, if one was recorded.
    pub fn last_input_dir(&self) -> Option<PathBuf> {
        (!self.input_dir.is_empty()).then(|| PathBuf::from(&self.input_dir))
    }

    /// Last output directory, if one was recorded.
    pub fn last_output_dir(&self) -> Option<PathBuf> {
        (!self.output_dir.is_empty()).then(|| PathBuf::from(&self.output_dir))
    }
}

/// Loads and saves [`AppState`] as a JSON file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, falling back to defaults when the file is missing or
    /// malformed. Expected on first run, so only logged at debug level.
    pub fn load(&self) -> AppState {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!("Using default state: {}", e);
                AppState::default()
            }
        }
    }

    /// Load the state, reporting why it could not be read.
    pub fn try_load(&self) -> Result<AppState, StateError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| StateError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| StateError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Write the state atomically (temp file, then rename).
    pub fn save(&self, state: &AppState) -> Result<(), StateError> {
        let io_err = |e| StateError::Io {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(state).map_err(|e| StateError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        tracing::debug!("Saved state to {:?}", self.path);
        Ok(())
    }
}
