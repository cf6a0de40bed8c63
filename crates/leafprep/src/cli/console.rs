//! Per-file console notices.
//!
//! Notices are printed to stderr above the progress bar. Colors follow the
//! terminal's capabilities via the `console` crate.

use console::Style;
use indicatif::ProgressBar;
use leafprep_core::Severity;
use std::fmt::Display;

/// How a per-file notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Skip,
    Failure,
}

impl From<Severity> for Notice {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Skip => Notice::Skip,
            Severity::Failure => Notice::Failure,
        }
    }
}

/// Prints notices without tearing the progress bar.
#[derive(Clone)]
pub struct Reporter {
    progress: ProgressBar,
    quiet: bool,
}

impl Reporter {
    /// `quiet` suppresses success notices; skips and failures still print.
    pub fn new(progress: ProgressBar, quiet: bool) -> Self {
        Self { progress, quiet }
    }

    pub fn notice(&self, notice: Notice, message: impl Display) {
        if self.quiet && notice == Notice::Success {
            return;
        }
        let line = format_notice(notice, message);
        self.progress.suspend(|| eprintln!("{line}"));
    }

    /// Count one finished file on the progress bar.
    pub fn advance(&self) {
        self.progress.inc(1);
    }
}

/// Prefix `message` with the notice's colored marker.
pub fn format_notice(notice: Notice, message: impl Display) -> String {
    let (marker, style) = match notice {
        Notice::Success => ("✓", Style::new().for_stderr().green()),
        Notice::Skip => ("↷", Style::new().for_stderr().yellow()),
        Notice::Failure => ("✗", Style::new().for_stderr().red()),
    };
    format!("{} {}", style.apply_to(marker), message)
}
