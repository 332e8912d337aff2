// src/logger/output.rs
// =============================================================================
// The output stream a logger writes to.
//
// A stream is either open (holding a writer) or closed (holding nothing).
// Every write on a closed stream is a no-op, which is what makes calls
// before start_output() or after end_output() harmless. A write error
// closes the stream too, so a broken pipe or a full disk silences only the
// logger that hit it.
// =============================================================================

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Where a logger's output goes once it is started.
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// In-memory output
    #[cfg(test)]
    Writer(Box<dyn Write + Send>),
}

impl OutputTarget {
    /// File when a filename is configured, stdout otherwise.
    pub fn from_filename(filename: Option<&PathBuf>) -> Self {
        match filename {
            Some(path) => OutputTarget::File(path.clone()),
            None => OutputTarget::Stdout,
        }
    }

    fn open(self) -> io::Result<Box<dyn Write + Send>> {
        Ok(match self {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::File(path) => Box::new(BufWriter::new(File::create(path)?)),
            #[cfg(test)]
            OutputTarget::Writer(writer) => writer,
        })
    }
}

#[derive(Default)]
pub struct OutputStream {
    writer: Option<Box<dyn Write + Send>>,
}

impl OutputStream {
    /// Opens the target. On failure the stream stays closed and the error
    /// is logged.
    pub fn open(target: OutputTarget) -> Self {
        let description = match &target {
            OutputTarget::Stdout => "stdout".to_string(),
            OutputTarget::File(path) => path.display().to_string(),
            #[cfg(test)]
            OutputTarget::Writer(_) => "writer".to_string(),
        };
        match target.open() {
            Ok(writer) => Self {
                writer: Some(writer),
            },
            Err(err) => {
                tracing::warn!(output = %description, "could not open logger output: {}", err);
                Self::default()
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn write(&mut self, text: &str) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.write_all(text.as_bytes()) {
                tracing::warn!("logger output failed, disabling it: {}", err);
                self.writer = None;
            }
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                tracing::warn!("logger output flush failed, disabling it: {}", err);
                self.writer = None;
            }
        }
    }

    /// Flushes and releases the writer; later writes are ignored.
    pub fn close(&mut self) {
        self.flush();
        self.writer = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// Clonable in-memory writer so tests can read what a logger wrote.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that fails on every call.
    pub struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Broken, SharedBuffer};
    use super::*;

    #[test]
    fn test_closed_stream_ignores_writes() {
        let mut stream = OutputStream::default();
        assert!(!stream.is_open());
        stream.write("ignored");
        stream.close();
    }

    #[test]
    fn test_close_stops_further_writes() {
        let buffer = SharedBuffer::default();
        let mut stream = OutputStream::open(OutputTarget::Writer(Box::new(buffer.clone())));
        stream.write("first\n");
        stream.close();
        stream.write("second");
        assert_eq!(buffer.contents(), "first\n");
    }

    #[test]
    fn test_write_error_closes_stream() {
        let mut stream = OutputStream::open(OutputTarget::Writer(Box::new(Broken)));
        assert!(stream.is_open());
        stream.write("boom");
        assert!(!stream.is_open());
    }

    #[test]
    fn test_file_target_is_written_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut stream = OutputStream::open(OutputTarget::from_filename(Some(&path)));
        stream.write("hello");
        stream.close();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_unopenable_file_leaves_stream_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");
        let stream = OutputStream::open(OutputTarget::File(path));
        assert!(!stream.is_open());
    }
}
