//! # Batch Image Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione e applicazione degli override da CLI
//! - Avvio del batch su una `ConversionSession` e inoltro degli eventi
//! - Ctrl-C → cancellazione cooperativa (il file in corso viene completato);
//!   un secondo Ctrl-C termina subito il processo
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, formato, output, resize, nome, soglia)
//! 2. Carica il config file e applica gli override
//! 3. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 4. Espande le directory di input in una lista di immagini
//! 5. Avvia il batch e consuma gli eventi fino alla fine del worker
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-converter photos/ extra.png -o out -f jpg --width 800 --name holiday
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use batch_image_converter::converter::{BatchEvent, ConversionSession, ProgressSink};
use batch_image_converter::file_manager::FileManager;
use batch_image_converter::json_output::{JsonMessage, JsonReporter};
use batch_image_converter::progress::{BatchResult, ProgressManager};
use batch_image_converter::resize::parse_dimension;
use batch_image_converter::{Config, TargetFormat};

#[derive(Parser)]
#[command(name = "image-converter")]
#[command(about = "Convert images in bulk to WebP, JPG, PNG or a contour-traced SVG")]
struct Args {
    /// Image files or directories to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target format
    #[arg(short, long, value_enum)]
    format: Option<TargetFormat>,

    /// Disable encoder-level optimization
    #[arg(long)]
    no_optimize: bool,

    /// Target width, e.g. "800" or "800px" (enables resize)
    #[arg(long)]
    width: Option<String>,

    /// Target height, e.g. "600" or "600px" (enables resize)
    #[arg(long)]
    height: Option<String>,

    /// New base name for output files (numbered when converting several files)
    #[arg(short, long)]
    name: Option<String>,

    /// Binarization threshold for SVG output (0-255)
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Configuration file (default: user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective settings to the configuration file
    #[arg(long)]
    save_config: bool,

    /// Output progress as JSON lines for programmatic use
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Exit status after a second Ctrl-C (128 + SIGINT)
const ABORT_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args)?;

    init_logging(args.verbose, config.json_output)?;

    let json = config.json_output;
    run(&args, config, config_path).await.map_err(|e| {
        if json {
            JsonMessage::from_error(&e).emit();
        }
        e
    })
}

async fn run(args: &Args, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    config.validate()?;

    if args.save_config {
        match config_path {
            Some(ref path) => {
                config.save_to_file(path).await?;
                info!("Saved configuration to {}", path.display());
            }
            None => warn!("No configuration directory available, settings not saved"),
        }
    }

    let output_dir = config
        .output_path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No output directory given (use --output)"))?;
    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;
        info!("Created output directory: {}", output_dir.display());
    }

    let files = FileManager::collect_inputs(&args.inputs);
    if config.json_output {
        JsonMessage::start(files.len(), config.format, output_dir.clone()).emit();
    }

    let mut session = ConversionSession::new();
    session
        .start_batch(files, &output_dir, config.format, config.options.clone())
        .context("Cannot start conversion")?;

    let sink: Box<dyn ProgressSink> = if config.json_output {
        Box::new(JsonReporter)
    } else {
        Box::new(ProgressManager::new())
    };

    let completed = drive(&mut session, sink.as_ref()).await;
    session
        .wait()
        .or(completed)
        .ok_or_else(|| anyhow::anyhow!("Conversion worker stopped unexpectedly"))?;

    Ok(())
}

/// What a Ctrl-C does, given how many were received before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Stop after the file in progress
    Cancel,
    /// Leave immediately
    Abort,
}

fn interrupt_action(previous: usize) -> InterruptAction {
    if previous == 0 {
        InterruptAction::Cancel
    } else {
        InterruptAction::Abort
    }
}

/// Deliver batch events until the worker hangs up.
///
/// The first Ctrl-C cancels the batch, a second one exits the process.
async fn drive(session: &mut ConversionSession, sink: &dyn ProgressSink) -> Option<BatchResult> {
    let mut completed = None;
    let mut interrupts = 0;
    let mut signals_available = true;

    loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(event) => {
                    event.deliver(sink);
                    if let BatchEvent::Complete(result) = event {
                        completed = Some(result);
                    }
                }
                None => break,
            },
            signal = tokio::signal::ctrl_c(), if signals_available => match signal {
                Ok(()) => {
                    match interrupt_action(interrupts) {
                        InterruptAction::Cancel => {
                            warn!("Interrupted, stopping after the current file (Ctrl-C again to abort)");
                            session.cancel_batch();
                        }
                        InterruptAction::Abort => {
                            warn!("Interrupted again, aborting");
                            std::process::exit(ABORT_EXIT_CODE);
                        }
                    }
                    interrupts += 1;
                }
                Err(e) => {
                    signals_available = false;
                    warn!("Ctrl-C handler unavailable: {}", e);
                }
            },
        }
    }

    completed
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // stdout belongs to the JSON stream
    if json {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(ref output) = args.output {
        config.output_path = Some(output.clone());
    }
    if args.no_optimize {
        config.options.optimize = false;
    }
    if let Some(ref width) = args.width {
        config.options.target_width = parse_dimension(width)?;
        config.options.resize = true;
    }
    if let Some(ref height) = args.height {
        config.options.target_height = parse_dimension(height)?;
        config.options.resize = true;
    }
    if let Some(ref name) = args.name {
        config.options.new_base_name = name.clone();
    }
    if let Some(threshold) = args.threshold {
        config.options.threshold = threshold;
    }
    if args.json {
        config.json_output = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_interrupt_cancels_second_aborts() {
        assert_eq!(interrupt_action(0), InterruptAction::Cancel);
        assert_eq!(interrupt_action(1), InterruptAction::Abort);
        assert_eq!(interrupt_action(2), InterruptAction::Abort);
    }

    #[test]
    fn test_cli_overrides_enable_resize() {
        let args = Args::parse_from(["image-converter", "in.png", "--width", "800px", "--json"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args).unwrap();

        assert!(config.options.resize);
        assert_eq!(config.options.target_width, 800);
        assert!(config.json_output);
    }
}
