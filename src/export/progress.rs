//! Progress tracking for export operations.
//!
//! The cursor is forward-only, so the total row count is never known up
//! front; progress is a spinner with a live rows/sec readout.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for one export run.
pub struct ProgressTracker {
    /// Start time of the operation
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a spinner
    pub fn new(enable_bar: bool) -> Self {
        let bar = if enable_bar {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos} rows {msg}")
                    .unwrap(),
            );
            Some(bar)
        } else {
            None
        };

        Self {
            start_time: Instant::now(),
            bar,
        }
    }

    /// Update progress with the running row count.
    pub fn update(&self, count: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({speed:.0} rows/sec)"));
            }
        }
    }

    /// Finish and clear the spinner.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_disabled() {
        let tracker = ProgressTracker::new(false);
        tracker.update(500);
        tracker.finish();
        // No bar attached; updates are no-ops
    }
}
