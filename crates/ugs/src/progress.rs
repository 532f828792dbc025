use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;
use ugs_core::StatusReporter;

/// Loading indicator held for the duration of a long-running call.
///
/// Draws a spinner on an interactive terminal and prints plain status lines
/// otherwise. The spinner is cleared when the guard is dropped.
pub struct Loading {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl Loading {
    pub fn start(message: &str, quiet: bool) -> Self {
        if quiet {
            return Self { bar: None, quiet };
        }

        if !std::io::stdout().is_terminal() {
            println!("{}", message);
            return Self { bar: None, quiet };
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar: Some(pb),
            quiet,
        }
    }
}

impl StatusReporter for Loading {
    fn status(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.set_message(message.to_string()),
            None if !self.quiet => println!("{}", message),
            None => {}
        }
    }
}

impl Drop for Loading {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
