//! Interactive per-image resolution prompt.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dialoguer::Select;
use indicatif::ProgressBar;
use webpipe_core::{Dimensions, ResolutionChoice, ResolutionChooser};

use crate::cli::{handle_interrupt, theme::webpipe_theme};

const SKIP_LABEL: &str = "Skip this image";

/// Asks the user to pick one of the planned resolutions for each image.
///
/// Runs on the conversion worker thread; the progress bar is suspended while
/// the prompt is on screen. Ctrl+C inside the prompt skips the image and
/// raises [`PromptChooser::interrupted`] so the caller can cancel the run.
pub struct PromptChooser {
    progress: ProgressBar,
    interrupted: Arc<AtomicBool>,
}

impl PromptChooser {
    pub fn new(progress: ProgressBar) -> Self {
        Self {
            progress,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set when the user pressed Ctrl+C inside a prompt.
    pub fn interrupted(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    fn prompt(
        &self,
        source: &Path,
        native: Dimensions,
        candidates: &[Dimensions],
    ) -> anyhow::Result<Option<usize>> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let items = menu_items(candidates);

        let selection = self.progress.suspend(|| {
            handle_interrupt(
                Select::with_theme(&webpipe_theme())
                    .with_prompt(format!("{name} ({native}): output resolution"))
                    .items(&items)
                    .default(0)
                    .interact(),
            )
        })?;
        Ok(selection)
    }
}

impl ResolutionChooser for PromptChooser {
    fn choose(
        &self,
        source: &Path,
        native: Dimensions,
        candidates: &[Dimensions],
    ) -> ResolutionChoice {
        match self.prompt(source, native, candidates) {
            Ok(Some(index)) => choice_for(index, candidates),
            Ok(None) => {
                self.interrupted.store(true, Ordering::SeqCst);
                ResolutionChoice::Skip
            }
            Err(e) => {
                tracing::warn!("Resolution prompt failed for {:?}: {}", source, e);
                ResolutionChoice::Skip
            }
        }
    }
}

/// Menu labels: every candidate, then the skip entry.
fn menu_items(candidates: &[Dimensions]) -> Vec<String> {
    candidates
        .iter()
        .map(|d| d.to_string())
        .chain(std::iter::once(SKIP_LABEL.to_string()))
        .collect()
}

/// Map a menu index back to a choice; the last entry means skip.
fn choice_for(index: usize, candidates: &[Dimensions]) -> ResolutionChoice {
    candidates
        .get(index)
        .map(|d| ResolutionChoice::Use(*d))
        .unwrap_or(ResolutionChoice::Skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Dimensions> {
        vec![Dimensions::new(1920, 1280), Dimensions::new(1440, 960)]
    }

    #[test]
    fn menu_lists_candidates_then_skip() {
        assert_eq!(
            menu_items(&candidates()),
            vec!["1920x1280", "1440x960", SKIP_LABEL]
        );
    }

    #[test]
    fn menu_index_maps_to_choice() {
        let c = candidates();
        assert_eq!(choice_for(1, &c), ResolutionChoice::Use(Dimensions::new(1440, 960)));
        assert_eq!(choice_for(2, &c), ResolutionChoice::Skip);
    }

    #[test]
    fn interrupted_flag_is_shared() {
        let chooser = PromptChooser::new(ProgressBar::hidden());
        let flag = chooser.interrupted();
        chooser.interrupted.store(true, Ordering::SeqCst);
        assert!(flag.load(Ordering::SeqCst));
    }
}
