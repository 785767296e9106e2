use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use steward_core::ProgressReporter;

/// Spinner shown while a scan fingerprints files. The total is unknown until
/// the walk finishes, so it only counts.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, root: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(format!("Scanning {}...", root));
        pb.enable_steady_tick(Duration::from_millis(80));

        let mut guard = self.bar();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn on_file_indexed(&self, files_indexed: usize, _current_path: &str) {
        if let Some(pb) = self.bar().as_ref() {
            pb.set_message(format!("Fingerprinting... {} files", files_indexed));
        }
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }
}
