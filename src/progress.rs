//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - `RunSummary`: accumulatore degli esiti, aggiornato una volta per file
//! - Formattazione del report finale (tempo, conteggi, MB risparmiati)
//!
//! ## Classificazione degli esiti:
//! - **Converted** -> `processed`, somma dimensioni originali/nuove
//! - **DryRun** -> `dry_run` (non entra in `processed` né nei totali)
//! - **TargetExists** -> `skipped`
//! - **Failed** -> `errors`
//! - **UnsupportedExtension** -> ignorato del tutto
//!
//! ## Report finale:
//! ```text
//! --------------------------------------------------
//! Summary Report
//! --------------------------------------------------
//! Time Taken: 12.34s
//! Files Processed: 2
//! Files Skipped: 0
//! Errors: 0
//! Total Size Before: 0.67 MB
//! Total Size After:  0.21 MB
//! Space Saved:       0.46 MB
//! --------------------------------------------------
//! ```

use crate::converter::{ConversionOutcome, OutcomeKind};
use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::time::Duration;

pub const RULE: &str = "--------------------------------------------------";

/// Manages progress reporting for a conversion run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one file
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Print a line above the bar without tearing it
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    /// Remove the bar so the summary prints on a clean screen
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Accumulator over all outcomes of one run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub dry_run: usize,
    pub total_original_size: u64,
    pub total_new_size: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the tallies
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        match &outcome.kind {
            OutcomeKind::Converted => {
                self.processed += 1;
                self.total_original_size += outcome.original_size;
                self.total_new_size += outcome.new_size;
            }
            OutcomeKind::DryRun => self.dry_run += 1,
            OutcomeKind::TargetExists => self.skipped += 1,
            OutcomeKind::Failed(_) => self.errors += 1,
            OutcomeKind::UnsupportedExtension => {}
        }
    }

    /// Bytes saved across converted files; negative if outputs grew
    pub fn space_saved(&self) -> i128 {
        i128::from(self.total_original_size) - i128::from(self.total_new_size)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_size, self.total_new_size)
    }

    /// Render the end-of-run block. Size lines only appear for real runs
    /// that converted at least one file.
    pub fn format_report(&self, dry_run: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "Summary Report");
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "Time Taken: {:.2}s", self.elapsed.as_secs_f64());
        let _ = writeln!(out, "Files Processed: {}", self.processed);
        let _ = writeln!(out, "Files Skipped: {}", self.skipped);
        let _ = writeln!(out, "Errors: {}", self.errors);

        if !dry_run && self.processed > 0 {
            let _ = writeln!(
                out,
                "Total Size Before: {:.2} MB",
                FileManager::to_mb(i128::from(self.total_original_size))
            );
            let _ = writeln!(
                out,
                "Total Size After:  {:.2} MB",
                FileManager::to_mb(i128::from(self.total_new_size))
            );
            let _ = writeln!(out, "Space Saved:       {:.2} MB", FileManager::to_mb(self.space_saved()));
        }

        let _ = write!(out, "{}", RULE);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    fn outcome(kind: OutcomeKind, original_size: u64, new_size: u64) -> ConversionOutcome {
        ConversionOutcome {
            kind,
            original_size,
            new_size,
        }
    }

    #[test]
    fn test_record_classifies_outcomes() {
        let mut summary = RunSummary::new();
        summary.record(&outcome(OutcomeKind::Converted, 500_000, 120_000));
        summary.record(&outcome(OutcomeKind::Converted, 200_000, 50_000));
        summary.record(&outcome(OutcomeKind::TargetExists, 0, 0));
        summary.record(&outcome(OutcomeKind::DryRun, 42, 0));
        summary.record(&outcome(OutcomeKind::UnsupportedExtension, 0, 0));
        summary.record(&outcome(OutcomeKind::Failed(ConvertError::EmptyOutput), 0, 0));

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.dry_run, 1);
        assert_eq!(summary.total_original_size, 700_000);
        assert_eq!(summary.total_new_size, 170_000);
        assert_eq!(summary.space_saved(), 530_000);
    }

    #[test]
    fn test_report_includes_sizes_only_for_real_runs() {
        let mut summary = RunSummary::new();
        summary.record(&outcome(OutcomeKind::Converted, 3 * 1024 * 1024, 1024 * 1024));
        summary.elapsed = Duration::from_millis(1500);

        let report = summary.format_report(false);
        assert!(report.contains("Time Taken: 1.50s"));
        assert!(report.contains("Files Processed: 1"));
        assert!(report.contains("Total Size Before: 3.00 MB"));
        assert!(report.contains("Total Size After:  1.00 MB"));
        assert!(report.contains("Space Saved:       2.00 MB"));

        let dry = summary.format_report(true);
        assert!(!dry.contains("Space Saved"));

        let empty = RunSummary::new().format_report(false);
        assert!(empty.contains("Files Processed: 0"));
        assert!(!empty.contains("Total Size Before"));
    }

    #[test]
    fn test_space_saved_can_go_negative() {
        let mut summary = RunSummary::new();
        summary.record(&outcome(OutcomeKind::Converted, 100, 300));
        assert_eq!(summary.space_saved(), -200);
        assert!(summary.overall_reduction_percent() < 0.0);
    }
}
