//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico
//! (es. un frontend che lancia il converter come processo figlio).
//!
//! ## Tipi di messaggi (uno per riga su stdout):
//! - `start`: Inizio batch (file, formato, directory di output)
//! - `progress`: Percentuale di avanzamento
//! - `status`: Riga di stato del worker
//! - `complete`: Risultato finale con errori per file
//! - `error`: Errore che interrompe l'esecuzione, con la catena delle cause in `details`

use crate::converter::events::ProgressSink;
use crate::format::TargetFormat;
use crate::progress::{BatchResult, FileError};
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        total_files: usize,
        format: TargetFormat,
        output_dir: PathBuf,
    },

    #[serde(rename = "progress")]
    Progress { percentage: f64 },

    #[serde(rename = "status")]
    Status { message: String },

    #[serde(rename = "complete")]
    Complete {
        converted: usize,
        total: usize,
        cancelled: bool,
        errors: Vec<FileError>,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_files: usize, format: TargetFormat, output_dir: PathBuf) -> Self {
        Self::Start {
            total_files,
            format,
            output_dir,
        }
    }

    pub fn complete(result: &BatchResult) -> Self {
        Self::Complete {
            converted: result.converted_count,
            total: result.total_count,
            cancelled: result.cancelled,
            errors: result.errors.clone(),
        }
    }

    /// Top-level message, with the causes below it joined into `details`
    pub fn from_error(err: &anyhow::Error) -> Self {
        let causes: Vec<String> = err.chain().skip(1).map(|cause| cause.to_string()).collect();
        Self::Error {
            message: err.to_string(),
            details: (!causes.is_empty()).then(|| causes.join(": ")),
        }
    }
}

/// Forwards batch events as JSON lines
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReporter;

impl ProgressSink for JsonReporter {
    fn on_progress(&self, percent: f64) {
        JsonMessage::Progress { percentage: percent }.emit();
    }

    fn on_status(&self, message: &str) {
        JsonMessage::Status {
            message: message.to_string(),
        }
        .emit();
    }

    fn on_complete(&self, result: &BatchResult) {
        JsonMessage::complete(result).emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn to_value(message: &JsonMessage) -> Value {
        serde_json::to_value(message).unwrap()
    }

    #[test]
    fn test_messages_are_tagged() {
        let start = JsonMessage::start(2, TargetFormat::Svg, PathBuf::from("out"));
        assert_eq!(
            to_value(&start),
            json!({"type": "start", "total_files": 2, "format": "svg", "output_dir": "out"})
        );

        let status = JsonMessage::Status {
            message: "Ready".to_string(),
        };
        assert_eq!(to_value(&status), json!({"type": "status", "message": "Ready"}));
    }

    #[test]
    fn test_complete_carries_errors() {
        let mut result = BatchResult::new(2);
        result.add_converted();
        result.add_error("b.png", "File not found: b.png");

        assert_eq!(
            to_value(&JsonMessage::complete(&result)),
            json!({
                "type": "complete",
                "converted": 1,
                "total": 2,
                "cancelled": false,
                "errors": [{"file_name": "b.png", "message": "File not found: b.png"}]
            })
        );
    }

    #[test]
    fn test_error_details_come_from_the_cause_chain() {
        let err = anyhow::Error::from(crate::error::ConvertError::EmptySelection)
            .context("Cannot start conversion");
        assert_eq!(
            to_value(&JsonMessage::from_error(&err)),
            json!({
                "type": "error",
                "message": "Cannot start conversion",
                "details": "No files selected"
            })
        );

        let nested = anyhow::anyhow!("disk full").context("write failed").context("batch aborted");
        assert_eq!(
            to_value(&JsonMessage::from_error(&nested))["details"],
            json!("write failed: disk full")
        );
    }

    #[test]
    fn test_error_without_cause_has_no_details() {
        let err = anyhow::anyhow!("Conversion worker stopped unexpectedly");
        assert_eq!(
            to_value(&JsonMessage::from_error(&err)),
            json!({
                "type": "error",
                "message": "Conversion worker stopped unexpectedly",
                "details": null
            })
        );
    }
}
