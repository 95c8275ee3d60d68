//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Pick the output path for a decoded stream: the name embedded in its
/// header when usable, placed next to the input file. An empty name or
/// one carrying a path separator falls back to the input path with its
/// extension dropped.
pub fn decoded_output_path(embedded: &str, input: &Path) -> PathBuf {
    let trimmed = embedded.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
        input.with_extension("")
    } else {
        input.with_file_name(trimmed)
    }
}
