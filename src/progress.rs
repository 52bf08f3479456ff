//! # Progress Tracking and Results Module
//!
//! Questo modulo gestisce il feedback visuale del batch e il suo risultato finale.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar `indicatif` (0-100%) guidata dagli eventi del worker
//! - `BatchResult`: Conteggi finali, errori per file, flag di cancellazione
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] [========================>---------------] 60% Converted: photo.jpg
//! ```
//!
//! ## Report finale:
//! ```text
//! Converted 2 of 3 images.
//! Errors found:
//! Error in broken.jpg: Unreadable image format: ...
//! ```

use crate::converter::events::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Progress bar driven by batch events
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a percentage-based progress bar
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Hidden bar, used when stdout carries JSON
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressManager {
    fn on_progress(&self, percent: f64) {
        // The trailing reset to 0 arrives after the bar is finished
        if self.is_finished() {
            return;
        }
        self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
    }

    fn on_status(&self, message: &str) {
        if !self.is_finished() {
            self.bar.set_message(message.to_string());
        }
    }

    fn on_complete(&self, result: &BatchResult) {
        self.finish(&result.summary());
        if result.has_errors() {
            error!("{}", result.report());
        } else {
            info!("{}", result.report());
        }
    }
}

/// A file that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file_name: String,
    pub message: String,
}

/// Outcome of a batch.
///
/// Always `converted_count + errors.len() <= total_count`, with equality
/// unless the batch was cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub converted_count: usize,
    pub total_count: usize,
    pub errors: Vec<FileError>,
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            ..Default::default()
        }
    }

    pub fn add_converted(&mut self) {
        self.converted_count += 1;
    }

    pub fn add_error(&mut self, file_name: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FileError {
            file_name: file_name.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Files attempted, successfully or not
    pub fn processed_count(&self) -> usize {
        self.converted_count + self.errors.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Converted {} of {} images.",
            self.converted_count, self.total_count
        )
    }

    /// Summary followed by one line per failed file
    pub fn report(&self) -> String {
        let mut lines = vec![self.summary()];
        if self.cancelled {
            lines.push(format!(
                "Cancelled: {} files not attempted.",
                self.total_count.saturating_sub(self.processed_count())
            ));
        }
        if self.has_errors() {
            lines.push("Errors found:".to_string());
            lines.extend(
                self.errors
                    .iter()
                    .map(|e| format!("Error in {}: {}", e.file_name, e.message)),
            );
        } else {
            lines.push("No errors found.".to_string());
        }
        lines.join("\n")
    }
}
