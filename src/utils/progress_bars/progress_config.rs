// src/utils/progress_bars/progress_config.rs

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::env;

/// Configuration for progress tracking over a matching batch
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Refresh rate for progress bars in milliseconds
    pub refresh_rate_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate_ms: 100,
        }
    }
}

impl ProgressConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("PROGRESS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            refresh_rate_ms: env::var("PROGRESS_REFRESH_RATE_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
        }
    }

    /// A bar over `len` queries, or a hidden one when progress is disabled
    pub fn create_bar(&self, len: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let refresh_hz = (1000 / self.refresh_rate_ms.max(1)).clamp(1, 60) as u8;
        let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr_with_hz(refresh_hz));
        let style = ProgressStyle::default_bar()
            .template("  👤 [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        pb.set_style(style);
        pb
    }
}
