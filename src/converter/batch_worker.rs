//! # Batch Worker Module
//!
//! Esegue un batch di conversioni, un file alla volta, fuori dal thread host.
//!
//! ## Flusso per ogni file:
//! 1. Controllo cancellazione (solo tra un file e l'altro)
//! 2. `Status("Converting: <nome>")`
//! 3. Conversione; un errore viene registrato e il loop prosegue
//! 4. `Status("Converted: <nome>")` oppure `Status("Failed: <nome>")`
//! 5. `Progress((i + 1) / totale * 100)`
//!
//! ## Fine batch:
//! `Complete(risultato)` una sola volta, poi `Progress(0)` e
//! `Status("Ready")` / `Status("Conversion cancelled")`.
//!
//! ## Stati:
//! `Idle` → `Running` → `Completed` | `Cancelled` → `Idle`

use crate::config::ConversionOptions;
use crate::converter::cancellation::CancellationToken;
use crate::converter::events::{BatchEvent, EventSender};
use crate::converter::task_converter::{FileConverter, TaskConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::file_manager::FileManager;
use crate::format::TargetFormat;
use crate::progress::BatchResult;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub const STATUS_READY: &str = "Ready";
pub const STATUS_CANCELLED: &str = "Conversion cancelled";

/// Immutable description of a batch, captured when it starts
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub format: TargetFormat,
    pub options: ConversionOptions,
}

impl BatchJob {
    pub fn new(
        files: Vec<PathBuf>,
        output_dir: PathBuf,
        format: TargetFormat,
        options: ConversionOptions,
    ) -> ConvertResult<Self> {
        if files.is_empty() {
            return Err(ConvertError::EmptySelection);
        }
        options.validate()?;

        Ok(Self {
            files,
            output_dir,
            format,
            options,
        })
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Sequential converter loop reporting through an event channel
pub struct BatchWorker<C = TaskConverter> {
    files: Vec<PathBuf>,
    converter: C,
    cancel: CancellationToken,
    events: EventSender,
    state: WorkerState,
    outcome: Option<WorkerState>,
}

impl BatchWorker<TaskConverter> {
    /// Worker for a real batch
    pub fn new(job: BatchJob, cancel: CancellationToken, events: EventSender) -> Self {
        let converter = TaskConverter::new(&job);
        Self::with_converter(job.files, converter, cancel, events)
    }
}

impl<C: FileConverter> BatchWorker<C> {
    pub fn with_converter(
        files: Vec<PathBuf>,
        converter: C,
        cancel: CancellationToken,
        events: EventSender,
    ) -> Self {
        Self {
            files,
            converter,
            cancel,
            events,
            state: WorkerState::Idle,
            outcome: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Terminal state of the last run, if any
    pub fn outcome(&self) -> Option<WorkerState> {
        self.outcome
    }

    /// Convert every file in order, or until cancelled
    pub fn run(&mut self) -> BatchResult {
        let total = self.files.len();
        let mut result = BatchResult::new(total);
        self.state = WorkerState::Running;
        info!("Starting batch of {} files", total);

        for (index, path) in self.files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Batch cancelled after {} of {} files", index, total);
                result.cancelled = true;
                break;
            }

            let name = FileManager::display_name(path);
            self.emit(BatchEvent::Status(format!("Converting: {}", name)));

            match self.converter.convert(path, index) {
                Ok(output) => {
                    debug!("[OK] {} -> {}", path.display(), output.display());
                    result.add_converted();
                    self.emit(BatchEvent::Status(format!("Converted: {}", name)));
                }
                Err(e) => {
                    error!("Failed to convert {}: {}", path.display(), e);
                    result.add_error(name.clone(), e.to_string());
                    self.emit(BatchEvent::Status(format!("Failed: {}", name)));
                }
            }

            self.emit(BatchEvent::Progress((index + 1) as f64 / total as f64 * 100.0));
        }

        let outcome = if result.cancelled {
            WorkerState::Cancelled
        } else {
            WorkerState::Completed
        };
        self.state = outcome;
        self.outcome = Some(outcome);
        info!("{}", result.summary());

        self.emit(BatchEvent::Complete(result.clone()));
        self.emit(BatchEvent::Progress(0.0));
        let status = if result.cancelled {
            STATUS_CANCELLED
        } else {
            STATUS_READY
        };
        self.emit(BatchEvent::Status(status.to_string()));

        self.state = WorkerState::Idle;
        result
    }

    fn emit(&self, event: BatchEvent) {
        // Host went away: keep converting, nobody is listening
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
