//! Progress bar helpers using indicatif

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Bar ticking once per cross-validated grid configuration
pub fn create_grid_bar(configs: u64) -> ProgressBar {
    let pb = ProgressBar::new(configs);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    Grid search [{bar:40.cyan/blue}] {pos}/{len} configs ({percent}%) [{eta}]")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

/// Finish a spinner with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

/// Clear a spinner whose step failed, so the error prints on a clean line
pub fn finish_with_failure(pb: &ProgressBar) {
    pb.finish_and_clear();
}
