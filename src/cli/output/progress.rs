//! Spinner utilities using indicatif.
//!
//! Spinners draw to stderr and are hidden when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for an operation of unknown length.
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    // A malformed template only loses styling, never the spinner.
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.set_style(ProgressStyle::default_spinner());
        self.finish_with_message(format!("\u{2713} {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.set_style(ProgressStyle::default_spinner());
        self.finish_with_message(format!("\u{2717} {}", message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_keeps_message() {
        let spinner = create_spinner("Improving tag");
        assert_eq!(spinner.message(), "Improving tag");
        spinner.finish_success("done");
        assert!(spinner.is_finished());
    }
}
