//! Spinner with elapsed time for long-running steps

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner that reports how long an operation took when it finishes.
///
/// Nothing is animated in quiet mode, in plain mode, or when stderr is not a
/// terminal. Without animation each update is printed as its own line, and
/// the final line is still printed unless quiet.
///
/// Only animate while nothing else writes to the terminal; a child process
/// or log output sharing stderr gets interleaved with the spinner frames.
pub struct CommandSpinner {
    bar: Option<ProgressBar>,
    quiet: bool,
    started: Instant,
}

impl CommandSpinner {
    pub fn new_maybe(message: &str, quiet: bool) -> Self {
        let bar = (!quiet && console::Term::stderr().is_term()).then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
            );
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        Self {
            bar,
            quiet,
            started: Instant::now(),
        }
    }

    /// Never animates. For output that shares the terminal with logs.
    pub fn plain(quiet: bool) -> Self {
        Self {
            bar: None,
            quiet,
            started: Instant::now(),
        }
    }

    pub fn is_animated(&self) -> bool {
        self.bar.is_some()
    }

    pub fn update(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.set_message(message.to_string()),
            None if !self.quiet => eprintln!("  {message}"),
            None => {}
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn success(&self, message: &str) {
        self.finish(&format!("{} {}", console::style("✓").green(), message));
    }

    pub fn fail(&self, message: &str) {
        self.finish(&format!("{} {}", console::style("✗").red(), message));
    }

    /// Clear the spinner if it is still running
    pub fn clear(&self) {
        if let Some(bar) = &self.bar
            && !bar.is_finished()
        {
            bar.finish_and_clear();
        }
    }

    fn finish(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.finish_with_message(line.to_string()),
            None if !self.quiet => eprintln!("{line}"),
            None => {}
        }
    }
}

/// Elapsed time rounded to whole seconds, e.g. "1m 5s"
pub fn format_elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}
