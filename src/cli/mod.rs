//! Console progress for the command-line build

use crate::builder::BuildProgress;
use crate::models::BuildStep;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders build progress as a step bar with one line per finished step.
pub struct ConsoleProgress {
    bar: ProgressBar,
    items: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(BuildStep::ALL.len() as u64);
        let style = ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar, items: 0 }
    }

    /// Stop the bar, leaving the finished step lines on screen.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildProgress for ConsoleProgress {
    fn step_started(&mut self, step: BuildStep) {
        self.items = 0;
        self.bar.set_message(step.description());
    }

    fn item(&mut self, step: BuildStep, item: &str) {
        self.items += 1;
        self.bar.set_message(format!("{} ({})", step.description(), item));
    }

    fn step_finished(&mut self, step: BuildStep) {
        let detail = match self.items {
            0 => String::new(),
            1 => " (1 item)".to_string(),
            n => format!(" ({n} items)"),
        };
        self.bar.println(format!(
            "  {} [{}/{}] {}{}",
            "✓".green(),
            step.number(),
            BuildStep::ALL.len(),
            step.description(),
            detail.dimmed()
        ));
        self.bar.inc(1);
    }
}
