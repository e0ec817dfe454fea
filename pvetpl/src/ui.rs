//! Terminal progress and diagnostic rendering.
//!
//! The pipeline only knows the sink traits; this module is the one place
//! that talks to the terminal. Status lines are timestamped and printed
//! above the progress bar so the two never fight over the cursor.

use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::{DiagnosticSink, ProgressSink};

/// Progress bar spanning the full declared step count.
pub struct TermProgress {
    bar: ProgressBar,
}

impl TermProgress {
    pub fn new(total: u64, message: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Complete the bar after a successful run.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Leave the bar where it stopped after a failed run.
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    pub(crate) fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressSink for TermProgress {
    fn advance(&mut self) {
        self.bar.inc(1);
    }
}

/// Timestamped status lines printed above the progress bar.
pub struct TermDiagnostics {
    bar: ProgressBar,
}

impl TermDiagnostics {
    pub fn new(progress: &TermProgress) -> Self {
        // ProgressBar is reference-counted; the clone targets the same bar.
        Self {
            bar: progress.bar().clone(),
        }
    }
}

impl DiagnosticSink for TermDiagnostics {
    fn line(&mut self, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.bar
            .println(format!("{} {}", style(stamp).dim(), message));
    }
}
