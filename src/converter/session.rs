//! # Conversion Session Module
//!
//! Facciata lato host: valida le precondizioni, avvia il worker su un thread
//! dedicato e inoltra gli eventi di progresso.
//!
//! ## Garanzie:
//! - Al massimo un batch in esecuzione per sessione
//! - Un worker terminato viene raccolto (join) prima di avviarne un altro
//! - Il drop della sessione cancella il batch e attende il worker

use crate::config::ConversionOptions;
use crate::converter::batch_worker::{BatchJob, BatchWorker};
use crate::converter::cancellation::CancellationToken;
use crate::converter::events::{event_channel, BatchEvent, EventReceiver, ProgressSink};
use crate::converter::task_converter::{FileConverter, TaskConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::file_manager::FileManager;
use crate::format::TargetFormat;
use crate::progress::BatchResult;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, error, info};

struct RunningBatch {
    cancel: CancellationToken,
    handle: JoinHandle<BatchResult>,
}

/// Owns at most one running batch and the receiving end of its events
#[derive(Default)]
pub struct ConversionSession {
    batch: Option<RunningBatch>,
    events: Option<EventReceiver>,
}

impl ConversionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the request and start converting in the background
    pub fn start_batch(
        &mut self,
        files: Vec<PathBuf>,
        output_dir: &Path,
        format: TargetFormat,
        options: ConversionOptions,
    ) -> ConvertResult<()> {
        self.reap_finished();
        if self.is_running() {
            return Err(ConvertError::BatchRunning);
        }

        let job = BatchJob::new(files, output_dir.to_path_buf(), format, options)?;
        FileManager::ensure_writable_dir(output_dir).map_err(|e| {
            ConvertError::OutputDirectory(format!("{}: {}", output_dir.display(), e))
        })?;

        info!(
            "Converting {} files to {} in {}",
            job.total(),
            job.format,
            job.output_dir.display()
        );
        let converter = TaskConverter::new(&job);
        self.spawn(job.files, converter)
    }

    /// Start a worker driving an arbitrary converter
    pub(crate) fn spawn<C>(&mut self, files: Vec<PathBuf>, converter: C) -> ConvertResult<()>
    where
        C: FileConverter + 'static,
    {
        let (tx, rx) = event_channel();
        let cancel = CancellationToken::new();
        let mut worker = BatchWorker::with_converter(files, converter, cancel.clone(), tx);

        let handle = std::thread::Builder::new()
            .name("batch-worker".to_string())
            .spawn(move || worker.run())?;

        self.events = Some(rx);
        self.batch = Some(RunningBatch { cancel, handle });
        Ok(())
    }

    /// Ask the running batch to stop after the file in progress
    pub fn cancel_batch(&self) {
        if let Some(batch) = &self.batch {
            info!("Cancelling conversion");
            batch.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.batch
            .as_ref()
            .map_or(false, |batch| !batch.handle.is_finished())
    }

    /// Block until the worker exits and return its result
    pub fn wait(&mut self) -> Option<BatchResult> {
        let batch = self.batch.take()?;
        match batch.handle.join() {
            Ok(result) => Some(result),
            Err(_) => {
                error!("Batch worker panicked");
                None
            }
        }
    }

    /// Next event of the current batch; `None` once the worker is done and
    /// every event has been delivered
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.as_mut()?.recv().await
    }

    /// Non-blocking variant of `next_event`
    pub fn try_next_event(&mut self) -> Option<BatchEvent> {
        self.events.as_mut()?.try_recv().ok()
    }

    /// Feed every queued event to `sink`, returning the result if it arrived
    pub fn drain_events(&mut self, sink: &dyn ProgressSink) -> Option<BatchResult> {
        let mut completed = None;
        while let Some(event) = self.try_next_event() {
            event.deliver(sink);
            if let BatchEvent::Complete(result) = event {
                completed = Some(result);
            }
        }
        completed
    }

    fn reap_finished(&mut self) {
        let finished = self
            .batch
            .as_ref()
            .map_or(false, |batch| batch.handle.is_finished());
        if finished {
            debug!("Reaping finished batch worker");
            self.wait();
        }
    }
}

impl Drop for ConversionSession {
    fn drop(&mut self) {
        if let Some(batch) = self.batch.take() {
            batch.cancel.cancel();
            if batch.handle.join().is_err() {
                error!("Batch worker panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressManager;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Blocks every file until the test sends a go-ahead
    struct Gate {
        go: mpsc::Receiver<()>,
    }

    impl FileConverter for Gate {
        fn convert(&mut self, input: &Path, _index: usize) -> ConvertResult<PathBuf> {
            self.go
                .recv()
                .map_err(|_| ConvertError::Validation("gate closed".to_string()))?;
            Ok(input.to_path_buf())
        }
    }

    /// Counts calls, taking a little time for each
    struct Slow {
        calls: Arc<AtomicUsize>,
    }

    impl FileConverter for Slow {
        fn convert(&mut self, input: &Path, _index: usize) -> ConvertResult<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(input.to_path_buf())
        }
    }

    fn files(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{}.png", i))).collect()
    }

    #[test]
    fn test_rejects_empty_selection() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = ConversionSession::new();
        let result = session.start_batch(Vec::new(), temp_dir.path(), TargetFormat::Png, ConversionOptions::default());
        assert!(matches!(result, Err(ConvertError::EmptySelection)));
        assert!(!session.is_running());
    }

    #[test]
    fn test_idle_session() {
        let mut session = ConversionSession::new();
        session.cancel_batch();
        assert!(!session.is_running());
        assert!(session.try_next_event().is_none());
        assert!(session.wait().is_none());
    }

    #[test]
    fn test_rejects_missing_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = ConversionSession::new();
        let result = session.start_batch(
            files(1),
            &temp_dir.path().join("absent"),
            TargetFormat::Png,
            ConversionOptions::default(),
        );
        assert!(matches!(result, Err(ConvertError::OutputDirectory(_))));
        assert!(session.wait().is_none());
    }

    #[test]
    fn test_rejects_second_batch_while_running() {
        let temp_dir = TempDir::new().unwrap();
        let (go, gate) = mpsc::channel();
        let mut session = ConversionSession::new();
        session.spawn(files(1), Gate { go: gate }).unwrap();

        let second = session.start_batch(files(1), temp_dir.path(), TargetFormat::Png, ConversionOptions::default());
        assert!(matches!(second, Err(ConvertError::BatchRunning)));

        go.send(()).unwrap();
        let result = session.wait().unwrap();
        assert_eq!(result.converted_count, 1);
        assert!(!session.is_running());

        let sink = ProgressManager::hidden();
        assert_eq!(session.drain_events(&sink), Some(result));
        assert!(sink.is_finished());
    }

    #[test]
    fn test_cancel_lets_current_file_finish() {
        let (go, gate) = mpsc::channel();
        let mut session = ConversionSession::new();
        session.spawn(files(3), Gate { go: gate }).unwrap();

        // First file is in flight (or about to be): cancel, then release it
        session.cancel_batch();
        session.cancel_batch();
        let _ = go.send(());

        let result = session.wait().unwrap();
        assert!(result.cancelled);
        assert!(result.converted_count <= 1);
        assert_eq!(result.total_count, 3);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_events_end_after_completion() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("pic.png");
        RgbImage::from_pixel(10, 10, Rgb([1, 2, 3])).save(&input).unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let mut session = ConversionSession::new();
        session
            .start_batch(vec![input], &out, TargetFormat::Jpg, ConversionOptions::default())
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = session.next_event().await {
            events.push(event);
        }
        let result = session.wait().unwrap();

        assert_eq!(events.iter().filter(|e| e.is_complete()).count(), 1);
        assert_eq!(events.last(), Some(&BatchEvent::Status("Ready".to_string())));
        assert!(events.contains(&BatchEvent::Complete(result)));
        assert!(out.join("pic.jpg").exists());
    }

    #[test]
    fn test_new_batch_after_previous_finished() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("pic.png");
        RgbImage::from_pixel(10, 10, Rgb([1, 2, 3])).save(&input).unwrap();

        let mut session = ConversionSession::new();
        session
            .start_batch(vec![input.clone()], temp_dir.path(), TargetFormat::Webp, ConversionOptions::default())
            .unwrap();
        while session.is_running() {
            std::thread::sleep(Duration::from_millis(5));
        }

        session
            .start_batch(vec![input], temp_dir.path(), TargetFormat::Jpg, ConversionOptions::default())
            .unwrap();
        let result = session.wait().unwrap();
        assert_eq!(result.converted_count, 1);
        assert!(temp_dir.path().join("pic.webp").exists());
        assert!(temp_dir.path().join("pic.jpg").exists());
    }

    #[test]
    fn test_drop_cancels_and_joins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut session = ConversionSession::new();
        session
            .spawn(files(20), Slow { calls: calls.clone() })
            .unwrap();

        drop(session);
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen <= 1, "worker kept going after drop: {}", seen);

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }
}
