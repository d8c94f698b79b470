//! Console output and progress reporting
//!
//! Everything goes to stderr; stdout belongs to the replayed test output.

use crate::executor::CapturedOutput;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Per-package counts for the closing summary line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    /// Packages whose tests passed
    pub passed: usize,
    /// Packages whose tests failed
    pub failed: usize,
    /// Packages without tests
    pub no_tests: usize,
    /// Packages that could not be run
    pub errored: usize,
}

impl SummaryCounts {
    /// Total packages
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.no_tests + self.errored
    }

    /// Whether any package failed or errored
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed + self.errored > 0
    }
}

/// Progress reporter for package runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Child output is streamed to the terminal, so no progress bar
    pub streaming: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool, streaming: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
            streaming,
        }
    }

    /// Start a progress bar over `total` packages
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || self.streaming || total == 0 {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Stop the progress bar where it is
    pub fn abandon(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.abandon();
        }
    }

    /// Print a passed package
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", Style::new().green().bold());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failed package
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = self.prefix("✗", "FAIL", Style::new().red().bold());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", Style::new().yellow().bold());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a package without tests
    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("-", "SKIP", Style::new().dim());
        self.line(&format!("{prefix} {message}"));
    }

    /// Replay a child's captured stdout and stderr to ours
    pub fn replay(&self, output: &CapturedOutput) {
        let write = || {
            let _ = std::io::stdout().write_all(&output.stdout);
            let _ = std::io::stdout().flush();
            let _ = std::io::stderr().write_all(&output.stderr);
        };
        match self.progress_bar {
            Some(ref pb) => pb.suspend(write),
            None => write(),
        }
    }

    /// Print the closing summary
    pub fn summary(&self, counts: SummaryCounts, duration: Duration) {
        if self.quiet {
            return;
        }

        let SummaryCounts {
            passed,
            failed,
            no_tests,
            errored,
        } = counts;
        let total = counts.total();
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if counts.has_failures() {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            self.line(&format!(
                "{status} {total} packages in {duration_secs:.2}s ({} passed, {} failed, {} without tests, {} errored)",
                passed_style.apply_to(passed),
                failed_style.apply_to(failed),
                style(no_tests).yellow(),
                failed_style.apply_to(errored),
            ));
        } else {
            let status = if counts.has_failures() { "FAILED" } else { "PASSED" };
            self.line(&format!(
                "{status} {total} packages in {duration_secs:.2}s ({passed} passed, {failed} failed, {no_tests} without tests, {errored} errored)"
            ));
        }
    }

    fn prefix(&self, symbol: &'static str, plain: &'static str, styled: Style) -> String {
        if self.use_color {
            styled.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = self.term.write_line(text);
            }),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }
}
