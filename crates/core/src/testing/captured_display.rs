//! In-memory progress display sink.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::progress::DisplaySink;

/// Collects everything the progress reporter draws.
#[derive(Debug, Clone, Default)]
pub struct CapturedDisplay {
    buffer: Arc<Mutex<Vec<u8>>>,
}

struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("display buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink writing into this capture.
    pub fn sink(&self) -> DisplaySink {
        Box::new(CapturedWriter {
            buffer: Arc::clone(&self.buffer),
        })
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }
}
