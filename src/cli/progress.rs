//! Terminal progress for page-by-page extraction.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar fed by the extraction page observer.
#[derive(Clone)]
pub struct PageProgress {
    bar: ProgressBar,
}

impl PageProgress {
    /// Start a spinner until the page count is known.
    pub fn new(filename: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message(format!("Processing {}", filename));
        Self { bar }
    }

    /// Record that `completed` of `total` pages are done.
    pub fn page_done(&self, completed: u32, total: u32) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
        self.bar
            .set_message(format!("page {} of {}", completed, total));
    }

    /// Print a line above the bar.
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
