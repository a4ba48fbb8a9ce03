use crate::progress::{Monitor, ProgressMessage, ProgressStage};
use crate::reader::{EsoReader, ParsedEso};
use shared::{FileError, LoadEvent, LoadedFile, LoadingStatus, file_stem, generate_file_id, is_eso_file};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

struct LoadOutcome {
    file_id: String,
    result: Result<ParsedEso, FileError>,
}

/// Background loading service.
///
/// Parse jobs run on a dedicated rayon pool sized to leave one core for the
/// UI. Workers report into two plain mpsc queues (progress and results);
/// one watcher thread per queue drains it and forwards typed [`LoadEvent`]s
/// through a tokio channel, which is the only path back to the caller's
/// thread. Dropping the loader closes both queues; the watchers exit once
/// in-flight jobs have finished.
pub struct Loader {
    pool: rayon::ThreadPool,
    reader: Arc<dyn EsoReader>,
    progress_tx: mpsc::Sender<ProgressMessage>,
    result_tx: mpsc::Sender<LoadOutcome>,
    events: UnboundedSender<LoadEvent>,
}

impl Loader {
    pub fn new(reader: Arc<dyn EsoReader>) -> (Self, UnboundedReceiver<LoadEvent>) {
        let workers = thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("eso-loader-{i}"))
            .build()
            .expect("loader pool cannot be built");

        let (events, event_rx) = unbounded_channel();
        let (progress_tx, progress_rx) = mpsc::channel::<ProgressMessage>();
        let (result_tx, result_rx) = mpsc::channel::<LoadOutcome>();

        let progress_events = events.clone();
        thread::spawn(move || {
            while let Ok(message) = progress_rx.recv() {
                if let Some(status) = stage_to_status(message.stage) {
                    let event = LoadEvent::Progress { file_id: message.file_id, status };
                    if progress_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        let result_events = events.clone();
        thread::spawn(move || {
            while let Ok(outcome) = result_rx.recv() {
                let event = match outcome.result {
                    Ok(parsed) => LoadEvent::Loaded {
                        file_id: outcome.file_id.clone(),
                        file: Box::new(LoadedFile {
                            file_id: outcome.file_id,
                            name: parsed.name,
                            standard: parsed.standard,
                            totals: parsed.totals,
                        }),
                    },
                    Err(error) => LoadEvent::Failed { file_id: outcome.file_id, error },
                };
                if result_events.send(event).is_err() {
                    break;
                }
            }
        });

        let loader = Loader { pool, reader, progress_tx, result_tx, events };
        (loader, event_rx)
    }

    /// Queue one file for loading and return its id. Events for the file
    /// arrive on the receiver handed out by [`Loader::new`].
    pub fn load(&self, path: &str) -> String {
        let file_id = generate_file_id(path);
        let name = file_stem(path);

        if !is_eso_file(path) {
            log::warn!("refusing to load '{path}': not an eso file");
            let _ = self.events.send(LoadEvent::Failed {
                file_id: file_id.clone(),
                error: FileError::Unsupported { path: path.to_string() },
            });
            return file_id;
        }

        let _ = self.events.send(LoadEvent::Started {
            file_id: file_id.clone(),
            name,
        });

        let reader = Arc::clone(&self.reader);
        let progress_tx = self.progress_tx.clone();
        let result_tx = self.result_tx.clone();
        let path_buf = PathBuf::from(path);
        let id = file_id.clone();
        self.pool.spawn(move || {
            let mut monitor = Monitor::new(&id, progress_tx);
            let result = reader.read(&path_buf, &mut monitor);
            match &result {
                Ok(_) => monitor.finished(),
                Err(error) => monitor.failed(&error.to_string()),
            }
            let _ = result_tx.send(LoadOutcome { file_id: id, result });
        });

        file_id
    }
}

/// Several worker stages exist only for timing diagnostics and are not
/// forwarded.
fn stage_to_status(stage: ProgressStage) -> Option<LoadingStatus> {
    match stage {
        ProgressStage::Initialized => Some(LoadingStatus::Starting),
        ProgressStage::Started => Some(LoadingStatus::Preprocessing),
        ProgressStage::PreprocessingFinished { total_steps } => {
            Some(LoadingStatus::Parsing { step: 0, total_steps })
        }
        ProgressStage::BodyChunk { step, total_steps } => {
            Some(LoadingStatus::Parsing { step, total_steps })
        }
        ProgressStage::HeaderFinished
        | ProgressStage::BodyFinished
        | ProgressStage::TotalsFinished => None,
        ProgressStage::Finished => Some(LoadingStatus::Completed),
        ProgressStage::Failed(message) => Some(LoadingStatus::Error(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use shared::{FileHeader, HeaderVariable, Interval};
    use std::path::Path;
    use std::time::Duration;

    fn stub_header(file_id: &str) -> FileHeader {
        let mut daily = IndexMap::new();
        daily.insert(1, HeaderVariable::new("Zone1", "Temperature", "C"));
        let mut header = IndexMap::new();
        header.insert(Interval::Daily, daily);
        FileHeader::new(file_id, header)
    }

    struct StubReader;

    impl EsoReader for StubReader {
        fn read(&self, path: &Path, monitor: &mut Monitor) -> Result<ParsedEso, FileError> {
            monitor.started();
            monitor.set_result_lines(100);
            for _ in 0..100 {
                monitor.tick_line();
            }
            monitor.totals_finished();
            let file_id = monitor.file_id().to_string();
            Ok(ParsedEso {
                name: file_stem(&path.to_string_lossy()),
                standard: stub_header(&file_id),
                totals: stub_header(&file_id),
            })
        }
    }

    struct FailingReader;

    impl EsoReader for FailingReader {
        fn read(&self, path: &Path, _monitor: &mut Monitor) -> Result<ParsedEso, FileError> {
            Err(FileError::Incomplete { path: path.to_string_lossy().into_owned() })
        }
    }

    async fn next_event(rx: &mut UnboundedReceiver<LoadEvent>) -> LoadEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a load event")
            .expect("event channel closed unexpectedly")
    }

    #[tokio::test]
    async fn test_successful_load_emits_started_progress_loaded() {
        let (loader, mut rx) = Loader::new(Arc::new(StubReader));
        let file_id = loader.load("/sim/eplusout.eso");

        let first = next_event(&mut rx).await;
        match &first {
            LoadEvent::Started { file_id: id, name } => {
                assert_eq!(id, &file_id);
                assert_eq!(name, "eplusout");
            }
            other => panic!("expected Started first, got {other:?}"),
        }

        // progress and result reports ride separate watcher threads, so the
        // Loaded event may overtake trailing Parsing events
        let mut saw_parsing = false;
        let mut loaded = None;
        while loaded.is_none() || !saw_parsing {
            match next_event(&mut rx).await {
                LoadEvent::Progress { status: LoadingStatus::Parsing { .. }, .. } => {
                    saw_parsing = true;
                }
                LoadEvent::Progress { .. } => {}
                LoadEvent::Loaded { file_id: id, file } => loaded = Some((id, file)),
                other => panic!("unexpected event {other:?}"),
            }
        }
        let (id, file) = loaded.unwrap();
        assert_eq!(id, file_id);
        assert_eq!(file.name, "eplusout");
        assert_eq!(file.standard.variables(Interval::Daily).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_emits_failed() {
        let (loader, mut rx) = Loader::new(Arc::new(FailingReader));
        let file_id = loader.load("/sim/broken.eso");

        loop {
            match next_event(&mut rx).await {
                LoadEvent::Failed { file_id: id, error } => {
                    assert_eq!(id, file_id);
                    assert_eq!(error, FileError::Incomplete { path: "/sim/broken.eso".to_string() });
                    break;
                }
                LoadEvent::Started { .. } | LoadEvent::Progress { .. } => {}
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_non_eso_path_is_rejected_upfront() {
        let (loader, mut rx) = Loader::new(Arc::new(StubReader));
        loader.load("/sim/results.csv");

        match next_event(&mut rx).await {
            LoadEvent::Failed { error: FileError::Unsupported { path }, .. } => {
                assert_eq!(path, "/sim/results.csv");
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropping_loader_closes_event_stream() {
        let (loader, mut rx) = Loader::new(Arc::new(StubReader));
        drop(loader);
        assert!(rx.recv().await.is_none());
    }
}
