//! Line-oriented console sink

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Shared, append-only writer
///
/// Every call to [`Console::line`] is a single locked write, so lines from
/// concurrent probes never interleave.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_writer(std::io::stdout())
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one line
    pub fn line(&self, text: impl AsRef<str>) {
        let mut line = String::with_capacity(text.as_ref().len() + 1);
        line.push_str(text.as_ref());
        line.push('\n');

        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|_| sink.flush()) {
            tracing::warn!("Console write failed: {}", e);
        }
    }

    /// A console writing into memory, for tests
    #[cfg(test)]
    pub(crate) fn capture() -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl CaptureBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_appended() {
        let (console, buffer) = Console::capture();
        console.line("first");
        console.line(String::from("second"));
        assert_eq!(buffer.lines(), vec!["first", "second"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lines_do_not_interleave() {
        let (console, buffer) = Console::capture();

        let mut handles = Vec::new();
        for task in 0..8 {
            let console = console.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..50 {
                    console.line(format!("task-{}-line-{}-{}", task, n, "x".repeat(64)));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(line.starts_with("task-"));
            assert!(line.ends_with(&"x".repeat(64)));
            assert_eq!(line.matches("task-").count(), 1);
        }
    }
}
