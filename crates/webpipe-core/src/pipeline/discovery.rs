//! Source file enumeration for a batch run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ConversionConfig;
use crate::error::DirectoryError;

/// Finds eligible source files directly inside a directory.
pub struct FileDiscovery {
    source_extension: String,
    target_extension: String,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            source_extension: config.source_extension.clone(),
            target_extension: config.target_extension.clone(),
        }
    }

    /// List eligible files in `dir`, in directory-listing order.
    ///
    /// Not recursive. The extension match is case-sensitive. Entries that
    /// vanish or cannot be stat'ed mid-listing are skipped with a warning;
    /// failing to list `dir` itself is fatal.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, DirectoryError> {
        if !dir.is_dir() {
            return Err(DirectoryError::InputMissing(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(DirectoryError::InputUnreadable {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_eligible(entry.path()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!("Discovered {} source file(s) in {:?}", files.len(), dir);
        Ok(files)
    }

    /// Check if a file carries the source extension (case-sensitive).
    pub fn is_eligible(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.source_extension))
    }

    /// Destination path: same stem, target extension, inside `output_dir`.
    pub fn destination_for(&self, source: &Path, output_dir: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or_else(|| OsStr::new("image"));
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(&self.target_extension);
        output_dir.join(name)
    }
}
