//! Spinner shown while a generator call is in flight.

use std::future::Future;
use std::time::Duration;

use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new(message: &str) -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?.tick_strings(TICKS));
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Ok(Self { spinner })
    }

    pub(crate) fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

/// Await `fut` behind a spinner; the spinner is cleared on success and failure.
pub(crate) async fn with_spinner<T, F>(message: &str, fut: F) -> Result<T>
where
    F: Future<Output = docqa_shared::Result<T>>,
{
    let progress = CliProgress::new(message)?;
    let result = fut.await;
    progress.finish();
    Ok(result?)
}
