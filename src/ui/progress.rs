use crate::output::is_quiet;
use indicatif::ProgressBar;
use std::time::Duration;

/// Spinner shown on an interactive stdout while a command runs
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = if is_quiet() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
