//! The `webpipe convert` command.
//!
//! Drives a [`ConversionSession`] run: resolves directories, renders progress
//! from the event channel, turns Ctrl+C into cooperative cancellation and
//! offers an in-session resume afterwards.

mod chooser;
mod progress;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use dialoguer::{Confirm, Input};
use indicatif::ProgressBar;
use webpipe_core::{
    BatchEvent, BatchRequest, Config, ConversionSession, OutputFormat, OutputWriter,
    ResolutionMode, RunHandle, RunReport, RunStatus, SharedChooser, TranscodeResult,
};

use super::{handle_interrupt, theme};
use chooser::PromptChooser;
use progress::{create_progress_bar, print_summary, rate};

type ReportWriter = OutputWriter<BufWriter<File>>;

/// Arguments for the `convert` command.
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Directory with the source JPEG files (defaults to the last one used)
    pub input: Option<PathBuf>,

    /// Directory for the WebP files, created if missing (defaults to the last one used)
    pub output: Option<PathBuf>,

    /// Custom output width; snapped to the nearest configured aspect ratio
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Custom output height; snapped to the nearest configured aspect ratio
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Index of the first file to process
    #[arg(long, default_value = "0")]
    pub resume_from: usize,

    /// Choose the output resolution for every image
    #[arg(short, long)]
    pub interactive: bool,

    /// Write per-file results to this file (JSON Lines, or a JSON array for *.json)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Never prompt (directories, resume confirmation)
    #[arg(long)]
    pub no_prompt: bool,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let session = ConversionSession::new(config);
    let prompts = !args.no_prompt && theme::is_interactive();
    check_interactive(args.interactive, args.no_prompt, theme::is_interactive())?;
    let remembered = session.lifetime();

    let input = resolve_dir(
        args.input.as_deref(),
        remembered.last_input_dir(),
        "Input directory",
        prompts,
    )?;
    let output = resolve_dir(
        args.output.as_deref(),
        remembered.last_output_dir(),
        "Output directory",
        prompts,
    )?;
    let mode = resolution_mode(args.width, args.height);
    let request = BatchRequest::new(&input, &output)
        .with_mode(mode)
        .resume_from(args.resume_from);

    let mut report_writer = open_report(args.report.as_deref())?;
    let progress = create_progress_bar(0, 0);

    let (chooser, interrupted): (Option<SharedChooser>, Option<Arc<AtomicBool>>) =
        if args.interactive {
            let prompt = PromptChooser::new(progress.clone());
            let interrupted = prompt.interrupted();
            let prompt: SharedChooser = Arc::new(prompt);
            (Some(prompt), Some(interrupted))
        } else {
            (None, None)
        };

    let start = Instant::now();
    let mut processed: u64 = 0;
    let mut handle = session.start(request, chooser.clone())?;

    let report = loop {
        let report = drive(
            handle,
            &progress,
            interrupted.as_deref(),
            report_writer.as_mut(),
            &mut processed,
            start,
        )
        .await?;

        if report.status == RunStatus::Cancelled && prompts && confirm_resume(&session)? {
            if let Some(flag) = &interrupted {
                flag.store(false, Ordering::SeqCst);
            }
            handle = session.resume(chooser.clone())?;
            continue;
        }
        break report;
    };
    progress.finish_and_clear();

    if let Some(writer) = report_writer {
        let records = writer.records_written();
        writer.finish()?;
        if let Some(path) = &args.report {
            tracing::info!("Report written to {:?} ({} records)", path, records);
        }
    }

    print_summary(&report, processed, start.elapsed());

    if report.totals.failed > 0 {
        if let Some(path) = session.config().error_log() {
            eprintln!(
                "  {} failure(s) recorded in {}",
                report.totals.failed,
                path.display()
            );
        }
    }

    match report.status {
        RunStatus::Faulted => anyhow::bail!(
            "Run faulted: {}",
            report.error.as_deref().unwrap_or("unknown error")
        ),
        RunStatus::Cancelled => {
            eprintln!();
            eprintln!(
                "  {}",
                theme::warn().apply_to("Cancelled. To continue later, run:")
            );
            eprintln!(
                "    {}",
                resume_hint(&input, &output, mode, report.cursor)
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Render events until the worker finishes, then return its report.
async fn drive(
    handle: RunHandle,
    progress: &ProgressBar,
    interrupted: Option<&AtomicBool>,
    mut report_writer: Option<&mut ReportWriter>,
    processed: &mut u64,
    start: Instant,
) -> anyhow::Result<RunReport> {
    let mut handle = handle;
    let cancel = handle.cancel_flag();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_requested = false;

    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else { break };
                match event {
                    BatchEvent::Started { total, resume_from } => {
                        progress.set_length(total as u64);
                        progress.set_position(resume_from as u64);
                    }
                    BatchEvent::FileFinished { result, .. } => {
                        *processed += 1;
                        announce(progress, &result);
                        if let Some(writer) = report_writer.as_deref_mut() {
                            writer.write(&result)?;
                        }
                    }
                    BatchEvent::Progress { completed, .. } => {
                        progress.set_position(completed as u64);
                        progress.set_message(format!(
                            "{:.1} img/sec",
                            rate(*processed, start.elapsed())
                        ));
                    }
                    BatchEvent::Finished(report) => {
                        tracing::debug!("Worker finished: {:?}", report.status);
                    }
                }
                if !cancel_requested && interrupted.is_some_and(|f| f.load(Ordering::SeqCst)) {
                    progress.println("Interrupted; stopping after the current file...");
                    cancel.cancel();
                    cancel_requested = true;
                }
            }
            _ = &mut ctrl_c, if !cancel_requested => {
                progress.println("Cancelling after the current file...");
                cancel.cancel();
                cancel_requested = true;
            }
        }
    }

    Ok(handle.wait().await?)
}

/// Print a line for results that need attention.
fn announce(progress: &ProgressBar, result: &TranscodeResult) {
    match result {
        TranscodeResult::Converted(file) => tracing::debug!(
            "{:?} -> {:?} ({})",
            file.source,
            file.destination,
            file.output_dimensions
        ),
        TranscodeResult::Skipped { source } => {
            progress.println(format!("  skipped {}", source.display()));
        }
        TranscodeResult::Failed { error, .. } => {
            progress.println(format!("  {} {}", theme::warn().apply_to("✗"), error));
        }
    }
}

/// Explicit argument, else the remembered directory, else a prompt.
fn resolve_dir(
    explicit: Option<&Path>,
    remembered: Option<PathBuf>,
    label: &str,
    prompts: bool,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand_path(path));
    }
    if let Some(path) = remembered {
        eprintln!(
            "  {} {}",
            theme::dim().apply_to(format!("{label} (last used):")),
            path.display()
        );
        return Ok(path);
    }
    if !prompts {
        anyhow::bail!("No {} given and none remembered", label.to_lowercase());
    }

    let Some(raw) = handle_interrupt(
        Input::<String>::with_theme(&theme::webpipe_theme())
            .with_prompt(label)
            .interact_text(),
    )?
    else {
        anyhow::bail!("Cancelled");
    };
    Ok(expand_path(Path::new(raw.trim())))
}

/// Expand a leading `~` in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn resolution_mode(width: Option<u32>, height: Option<u32>) -> ResolutionMode {
    match (width, height) {
        (Some(width), Some(height)) => ResolutionMode::Custom { width, height },
        _ => ResolutionMode::Automatic,
    }
}

fn open_report(path: Option<&Path>) -> anyhow::Result<Option<ReportWriter>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    Ok(Some(OutputWriter::new(
        BufWriter::new(file),
        OutputFormat::for_path(path),
        true,
    )))
}

/// `--interactive` needs a terminal; without one every prompt would fail and
/// skip its image.
fn check_interactive(interactive: bool, no_prompt: bool, terminal: bool) -> anyhow::Result<()> {
    if !interactive {
        return Ok(());
    }
    if no_prompt {
        anyhow::bail!("--interactive cannot be combined with --no-prompt");
    }
    if !terminal {
        anyhow::bail!("--interactive needs a terminal on stderr");
    }
    Ok(())
}

fn confirm_resume(session: &ConversionSession) -> anyhow::Result<bool> {
    let Some(paused) = session.paused_run() else {
        return Ok(false);
    };
    let answer = Confirm::with_theme(&theme::webpipe_theme())
        .with_prompt(format!(
            "Cancelled at file {} of {} in {}. Resume now?",
            paused.cursor,
            paused.total_files,
            paused.input_dir.display()
        ))
        .default(false)
        .interact_opt()?;
    Ok(answer == Some(true))
}

/// Command line that continues a cancelled run in a later process.
fn resume_hint(input: &Path, output: &Path, mode: ResolutionMode, cursor: usize) -> String {
    let mut hint = format!(
        "webpipe convert {:?} {:?} --resume-from {}",
        input, output, cursor
    );
    if let ResolutionMode::Custom { width, height } = mode {
        hint.push_str(&format!(" --width {width} --height {height}"));
    }
    hint
}
