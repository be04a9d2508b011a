//! Console implementation of the supervision progress port.
//!
//! Long deep-model analyses get an indicatif spinner; warnings and drift
//! reports print immediately so they are visible even mid-analysis.

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use marionette_application::ports::progress::SupervisorProgress;
use marionette_domain::DriftReport;
use std::sync::Mutex;
use std::time::Duration;

pub struct ConsoleProgress {
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorProgress for ConsoleProgress {
    fn on_drift(&self, report: &DriftReport) {
        println!("{}", ConsoleFormatter::drift(report));
    }

    fn on_agent_kill(&self) {
        eprintln!("{}", "Killing agent process...".red().bold());
    }

    fn on_analysis_started(&self, label: &str) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap() = Some(pb);
    }

    fn on_analysis_finished(&self) {
        if let Some(pb) = self.spinner.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }
}
