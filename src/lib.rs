//! # Batch Image Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri host (CLI, GUI)
//!
//! ## Architettura dei moduli:
//! - `config`: Opzioni di conversione, configurazione persistita e validazione
//! - `error`: Tipi di errore custom per file e sessione
//! - `format`: Tag del formato di destinazione
//! - `file_manager`: Discovery delle immagini e scrittura atomica
//! - `resize`: Parsing delle dimensioni e ridimensionamento
//! - `image_codec`: Pipeline raster (decode → colore → resize → EXIF → encode)
//! - `vectorizer`: Approssimazione SVG tramite contorni per canale
//! - `converter`: Sessione, worker in background, cancellazione, eventi
//! - `progress`: Progress bar e risultato del batch
//! - `json_output`: Eventi in formato JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use batch_image_converter::{ConversionOptions, ConversionSession, TargetFormat};
//!
//! let mut session = ConversionSession::new();
//! session.start_batch(files, &output_dir, TargetFormat::Webp, ConversionOptions::default())?;
//! while let Some(event) = session.next_event().await {
//!     event.deliver(&sink);
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod format;
pub mod image_codec;
pub mod json_output;
pub mod progress;
pub mod resize;
pub mod vectorizer;

pub use config::{Config, ConversionOptions};
pub use converter::{BatchEvent, CancellationToken, ConversionSession, ProgressSink};
pub use error::{ConvertError, ConvertResult};
pub use format::TargetFormat;
pub use image_codec::ImageCodec;
pub use progress::BatchResult;
pub use vectorizer::Vectorizer;
