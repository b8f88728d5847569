//! Synchronized destination streams

use super::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// A byte stream shared by every core and error channel writing to it.
///
/// Each [`SyncWriter::write_record`] call holds the lock for the whole record,
/// so concurrent emitters never interleave partial lines. Clones share the
/// same stream.
#[derive(Clone)]
pub struct SyncWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SyncWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::from_boxed(Box::new(writer))
    }

    pub fn from_boxed(writer: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Process standard error
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    /// Write one complete record
    pub fn write_record(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = self.inner.lock();
        writer
            .write_all(bytes)
            .map_err(|e| LoggerError::io_operation("writing record", e.to_string(), e))
    }

    /// Flush buffered bytes to the underlying stream
    pub fn sync(&self) -> Result<()> {
        self.inner
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("syncing sink", e.to_string(), e))
    }

    /// Whether two writers share the same stream
    pub fn ptr_eq(&self, other: &SyncWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SyncWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncWriter").finish_non_exhaustive()
    }
}

/// In-memory writer whose contents stay readable after it is handed to a sink.
///
/// Used by tests and benches to observe what a sink received.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
