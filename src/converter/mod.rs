//! # Converter Module
//!
//! Modulo che separa le responsabilità del batch in sottomoduli:
//! - `session`: Facciata lato host, avvia/cancella/attende un batch
//! - `batch_worker`: Loop sequenziale sui file su un thread dedicato
//! - `task_converter`: Worker per singolo file (raster o SVG)
//! - `path_resolver`: Calcolo centralizzato dei path di output
//! - `events`: Eventi di progresso e stato verso il thread host
//! - `cancellation`: Flag di cancellazione cooperativa

pub mod batch_worker;
pub mod cancellation;
pub mod events;
pub mod path_resolver;
pub mod session;
pub mod task_converter;

pub use batch_worker::{BatchJob, BatchWorker, WorkerState};
pub use cancellation::CancellationToken;
pub use events::{BatchEvent, ProgressSink};
pub use path_resolver::PathResolver;
pub use session::ConversionSession;
pub use task_converter::{FileConverter, TaskConverter};
