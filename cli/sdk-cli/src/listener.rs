//! Console listener for SDK logs and events.

use std::io::Write;
use std::sync::{Arc, Mutex};

use sdk::{EventListener, LogStream};
use types::{BreezEvent, LogEntry};

/// Severity the console never prints.
const SUPPRESSED_LEVEL: &str = "TRACE";

/// Prints log lines and events to a shared writer.
///
/// Clones write to the same sink, so one listener can be registered both as
/// log stream and as event listener.
#[derive(Clone)]
pub struct ConsoleListener {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ConsoleListener {
    /// Listener writing to `out`.
    pub fn new(out: Box<dyn Write + Send>) -> Self { Self { out: Arc::new(Mutex::new(out)) } }

    /// Listener writing to stderr.
    pub fn stderr() -> Self { Self::new(Box::new(std::io::stderr())) }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

impl LogStream for ConsoleListener {
    fn log(&self, l: LogEntry) {
        if l.level != SUPPRESSED_LEVEL {
            self.write_line(format_args!("[{}] {}", l.level, l.line));
        }
    }
}

impl EventListener for ConsoleListener {
    fn on_event(&self, e: BreezEvent) { self.write_line(format_args!("received event {:?}", e)); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    }

    impl Buffer {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().expect("buffer").clone();
            String::from_utf8(bytes).expect("utf8").lines().map(str::to_string).collect()
        }
    }

    fn entry(level: &str, line: &str) -> LogEntry {
        LogEntry { line: line.to_string(), level: level.to_string() }
    }

    #[test]
    fn test_trace_entries_suppressed() {
        let buffer = Buffer::default();
        let listener = ConsoleListener::new(Box::new(buffer.clone()));

        for (level, line) in [
            ("TRACE", "t1"),
            ("DEBUG", "d1"),
            ("TRACE", "t2"),
            ("INFO", "i1"),
            ("WARN", "w1"),
            ("ERROR", "e1"),
            ("TRACE", "t3"),
        ] {
            listener.log(entry(level, line));
        }

        assert_eq!(
            buffer.lines(),
            vec!["[DEBUG] d1", "[INFO] i1", "[WARN] w1", "[ERROR] e1"]
        );
    }

    #[test]
    fn test_events_printed_in_order() {
        let buffer = Buffer::default();
        let listener = ConsoleListener::new(Box::new(buffer.clone()));
        let clone = listener.clone();

        listener.on_event(BreezEvent::NewBlock { block: 1 });
        clone.on_event(BreezEvent::Synced);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("NewBlock"));
        assert!(lines[1].contains("Synced"));
    }
}
