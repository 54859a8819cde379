//! File and console sinks.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::FacadeError;
use crate::format::{Record, TextFormatter};

/// Shared in-memory console target, used to observe console output.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn append(&self, line: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(line.as_bytes());
    }
}

/// Append-only `<dir>/<name>.log` file.
#[derive(Clone)]
pub struct FileSink {
    path: PathBuf,
    writer: Arc<Mutex<RollingFileAppender>>,
    formatter: TextFormatter,
}

impl FileSink {
    /// Open (creating if needed) `<dir>/<name>.log` for append.
    ///
    /// `name` must be a plain file stem: non-empty, not `.`, and free of
    /// path separators and `..`.
    pub fn open(dir: &Path, name: &str, formatter: TextFormatter) -> Result<Self, FacadeError> {
        validate_name(name)?;

        let path = dir.join(format!("{}.log", name));
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(name)
            .filename_suffix("log")
            .build(dir)
            .map_err(|source| FacadeError::OpenSink {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(appender)),
            formatter,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

#[derive(Debug, Clone)]
enum ConsoleTarget {
    Std,
    Capture(CaptureBuffer),
}

/// Terminal output. ERROR and WARN go to stderr, the rest to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    target: ConsoleTarget,
    formatter: TextFormatter,
}

impl ConsoleSink {
    pub fn stdio(formatter: TextFormatter) -> Self {
        Self {
            target: ConsoleTarget::Std,
            formatter,
        }
    }

    pub fn capture(buffer: CaptureBuffer, formatter: TextFormatter) -> Self {
        Self {
            target: ConsoleTarget::Capture(buffer),
            formatter,
        }
    }

    fn write(&self, level: Level, line: &str) -> io::Result<()> {
        match &self.target {
            ConsoleTarget::Capture(buffer) => {
                buffer.append(line);
                Ok(())
            }
            ConsoleTarget::Std if level <= Level::WARN => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(line.as_bytes())?;
                stderr.flush()
            }
            ConsoleTarget::Std => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(line.as_bytes())?;
                stdout.flush()
            }
        }
    }
}

/// A destination for formatted records.
#[derive(Debug, Clone)]
pub enum Sink {
    File(FileSink),
    Console(ConsoleSink),
}

impl Sink {
    /// Two file sinks are the same when they share a path; any two console
    /// sinks are the same.
    pub fn same_as(&self, other: &Sink) -> bool {
        match (self, other) {
            (Sink::File(a), Sink::File(b)) => a.path == b.path,
            (Sink::Console(_), Sink::Console(_)) => true,
            _ => false,
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Sink::Console(_))
    }

    fn formatter(&self) -> &TextFormatter {
        match self {
            Sink::File(sink) => &sink.formatter,
            Sink::Console(sink) => &sink.formatter,
        }
    }

    fn write(&self, level: Level, line: &str) -> io::Result<()> {
        match self {
            Sink::File(sink) => sink.write(line),
            Sink::Console(sink) => sink.write(level, line),
        }
    }

    pub(crate) fn write_record(&self, record: &Record) -> io::Result<()> {
        let line = self.formatter().format(record);
        self.write(record.level, &line)
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Sink::File(sink) => sink.flush(),
            Sink::Console(_) => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), FacadeError> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\']);
    if invalid {
        return Err(FacadeError::InvalidCategory(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_creates_file_on_open() {
        let dir = tempdir().unwrap();
        let sink = FileSink::open(dir.path(), "audit", TextFormatter::default()).unwrap();

        assert_eq!(sink.path(), dir.path().join("audit.log"));
        assert!(sink.path().exists());
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.log");
        fs::write(&path, "existing line\n").unwrap();

        let sink = FileSink::open(dir.path(), "jobs", TextFormatter::default()).unwrap();
        sink.write("new line\n").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing line\nnew line\n");
    }

    #[test]
    fn test_file_sink_open_fails_when_dir_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = FileSink::open(&blocker, "default", TextFormatter::default()).unwrap_err();
        assert!(matches!(err, FacadeError::OpenSink { .. }));
    }

    #[test]
    fn test_open_rejects_names_that_leave_the_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("dated");
        fs::create_dir(&nested).unwrap();

        for name in ["", ".", "..", "../escape", "a/b", "a\\b", "x..y"] {
            let err = FileSink::open(&nested, name, TextFormatter::default()).unwrap_err();
            assert!(
                matches!(err, FacadeError::InvalidCategory(ref n) if n == name),
                "{name:?} should be rejected"
            );
        }

        assert!(!dir.path().join("escape.log").exists());
        assert_eq!(fs::read_dir(&nested).unwrap().count(), 0);
    }

    #[test]
    fn test_open_accepts_dotted_names() {
        let dir = tempdir().unwrap();
        let sink = FileSink::open(dir.path(), "api.v2", TextFormatter::default()).unwrap();
        assert_eq!(sink.path(), dir.path().join("api.v2.log"));
        assert!(sink.path().exists());
    }

    #[test]
    fn test_console_capture_collects_lines() {
        let buffer = CaptureBuffer::new();
        let sink = ConsoleSink::capture(buffer.clone(), TextFormatter::default());

        sink.write(Level::INFO, "one\n").unwrap();
        sink.write(Level::ERROR, "two\n").unwrap();
        assert_eq!(buffer.contents(), "one\ntwo\n");

        buffer.clear();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_sink_identity() {
        let dir = tempdir().unwrap();
        let a = Sink::File(FileSink::open(dir.path(), "a", TextFormatter::default()).unwrap());
        let b = Sink::File(FileSink::open(dir.path(), "b", TextFormatter::default()).unwrap());
        let console = Sink::Console(ConsoleSink::stdio(TextFormatter::default()));
        let other_console = Sink::Console(ConsoleSink::capture(
            CaptureBuffer::new(),
            TextFormatter::default(),
        ));

        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
        assert!(console.same_as(&other_console));
        assert!(!console.same_as(&a));
    }
}
