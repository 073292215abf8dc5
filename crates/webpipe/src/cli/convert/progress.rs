//! Progress bar and end-of-run summary.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use webpipe_core::{RunReport, RunStatus};

use crate::cli::format_bytes;

/// Progress bar for `total` files, positioned at `resume_from`.
pub fn create_progress_bar(total: u64, resume_from: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_position(resume_from);
    pb.set_message("starting...");
    pb
}

/// Files per second over the files processed in this process.
pub fn rate(processed: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        processed as f64 / secs
    } else {
        0.0
    }
}

/// Print a formatted summary table after a run.
pub fn print_summary(report: &RunReport, processed: u64, elapsed: Duration) {
    let totals = &report.totals;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Status:       {:>8}", report.status.to_string());
    eprintln!("    Converted:    {:>8}", totals.converted);
    if totals.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", totals.skipped);
    }
    if totals.failed > 0 {
        eprintln!("    Failed:       {:>8}", totals.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Processed:    {:>4}/{:<4}", report.cursor, report.total_files);
    eprintln!("    Space saved:  {:>10}", format_bytes(totals.bytes_saved));
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate(processed, elapsed));
    eprintln!("  ====================================");
    if report.status == RunStatus::Faulted {
        if let Some(error) = &report.error {
            eprintln!("    {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_handles_zero_elapsed() {
        assert_eq!(rate(10, Duration::ZERO), 0.0);
        assert_eq!(rate(10, Duration::from_secs(2)), 5.0);
    }

    #[test]
    fn progress_bar_starts_at_resume_index() {
        let pb = create_progress_bar(10, 4);
        assert_eq!(pb.length(), Some(10));
        assert_eq!(pb.position(), 4);
    }
}
