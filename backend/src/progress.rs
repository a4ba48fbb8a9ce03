use std::sync::mpsc::Sender;

/// Raw stage reports emitted by a parse worker. Several stages exist purely
/// for timing diagnostics and are not forwarded to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressStage {
    Initialized,
    Started,
    PreprocessingFinished { total_steps: u32 },
    BodyChunk { step: u32, total_steps: u32 },
    HeaderFinished,
    BodyFinished,
    TotalsFinished,
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressMessage {
    pub file_id: String,
    pub stage: ProgressStage,
}

/// Progress reporter handed to a parse worker.
///
/// Body progress is chunked so a listener gets a bounded number of updates:
/// one report per 10 000 result lines, or a tenth of the file when that
/// would give fewer than ten steps. Send failures are swallowed; they only
/// happen while the application shuts down mid-load.
#[derive(Debug)]
pub struct Monitor {
    file_id: String,
    queue: Sender<ProgressMessage>,
    chunk_size: u64,
    total_steps: u32,
    lines_in_chunk: u64,
    step: u32,
}

const CHUNK_SIZE: u64 = 10_000;
const MIN_STEPS: u64 = 10;

impl Monitor {
    pub fn new(file_id: &str, queue: Sender<ProgressMessage>) -> Self {
        let monitor = Monitor {
            file_id: file_id.to_string(),
            queue,
            chunk_size: CHUNK_SIZE,
            total_steps: 0,
            lines_in_chunk: 0,
            step: 0,
        };
        monitor.send(ProgressStage::Initialized);
        monitor
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn started(&self) {
        self.send(ProgressStage::Started);
    }

    /// Fix the chunking once the preprocessing pass has counted the result
    /// lines of the file body.
    pub fn set_result_lines(&mut self, lines: u64) {
        let steps = lines / CHUNK_SIZE;
        if steps < MIN_STEPS {
            self.chunk_size = (lines / MIN_STEPS).max(1);
            self.total_steps = MIN_STEPS as u32;
        } else {
            self.chunk_size = CHUNK_SIZE;
            self.total_steps = steps as u32;
        }
        self.send(ProgressStage::PreprocessingFinished { total_steps: self.total_steps });
    }

    /// Count one parsed result line; reports once per full chunk.
    pub fn tick_line(&mut self) {
        self.lines_in_chunk += 1;
        if self.lines_in_chunk == self.chunk_size {
            self.lines_in_chunk = 0;
            self.step += 1;
            self.send(ProgressStage::BodyChunk {
                step: self.step,
                total_steps: self.total_steps,
            });
        }
    }

    pub fn header_finished(&self) {
        self.send(ProgressStage::HeaderFinished);
    }

    pub fn body_finished(&self) {
        self.send(ProgressStage::BodyFinished);
    }

    pub fn totals_finished(&self) {
        self.send(ProgressStage::TotalsFinished);
    }

    pub fn finished(&self) {
        self.send(ProgressStage::Finished);
    }

    pub fn failed(&self, message: &str) {
        self.send(ProgressStage::Failed(message.to_string()));
    }

    fn send(&self, stage: ProgressStage) {
        let message = ProgressMessage { file_id: self.file_id.clone(), stage };
        if self.queue.send(message).is_err() {
            log::debug!("progress queue closed, dropping report for {}", self.file_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn stages(rx: &mpsc::Receiver<ProgressMessage>) -> Vec<ProgressStage> {
        rx.try_iter().map(|message| message.stage).collect()
    }

    #[test]
    fn test_monitor_reports_creation() {
        let (tx, rx) = mpsc::channel();
        let monitor = Monitor::new("file_1", tx);
        monitor.started();
        assert_eq!(stages(&rx), vec![ProgressStage::Initialized, ProgressStage::Started]);
    }

    #[test]
    fn test_large_body_uses_fixed_chunks() {
        let (tx, rx) = mpsc::channel();
        let mut monitor = Monitor::new("file_1", tx);
        monitor.set_result_lines(200_000);
        let reported = stages(&rx);
        assert_eq!(
            reported.last(),
            Some(&ProgressStage::PreprocessingFinished { total_steps: 20 })
        );

        for _ in 0..10_000 {
            monitor.tick_line();
        }
        assert_eq!(
            stages(&rx),
            vec![ProgressStage::BodyChunk { step: 1, total_steps: 20 }]
        );
    }

    #[test]
    fn test_small_body_gets_ten_steps() {
        let (tx, rx) = mpsc::channel();
        let mut monitor = Monitor::new("file_1", tx);
        monitor.set_result_lines(1_000);
        let _ = stages(&rx);

        for _ in 0..1_000 {
            monitor.tick_line();
        }
        let chunks = stages(&rx);
        assert_eq!(chunks.len(), 10);
        assert_eq!(chunks[9], ProgressStage::BodyChunk { step: 10, total_steps: 10 });
    }

    #[test]
    fn test_tiny_body_does_not_stall() {
        let (tx, rx) = mpsc::channel();
        let mut monitor = Monitor::new("file_1", tx);
        monitor.set_result_lines(3);
        let _ = stages(&rx);

        for _ in 0..3 {
            monitor.tick_line();
        }
        assert!(!stages(&rx).is_empty());
    }

    #[test]
    fn test_closed_queue_is_tolerated() {
        let (tx, rx) = mpsc::channel();
        let monitor = Monitor::new("file_1", tx);
        drop(rx);
        monitor.finished();
    }
}
