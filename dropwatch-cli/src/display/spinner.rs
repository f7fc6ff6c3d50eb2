use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner on stderr while the pages are fetched. indicatif hides it when
/// stderr is not a terminal, so scheduled runs log cleanly.
pub struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            progress.set_style(style);
        }
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(80));

        Self { progress }
    }

    /// A spinner that never draws.
    pub fn hidden() -> Self {
        Self {
            progress: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.progress.finish_and_clear();
    }
}
