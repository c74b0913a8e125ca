use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex};

use crate::error::LogError;

/// Shared read handle onto an in-memory sink, for asserting on emitted
/// records without touching the filesystem.
#[derive(Clone, Default, Debug)]
pub struct BufferHandle(Arc<Mutex<Vec<u8>>>);

impl BufferHandle {
    /// Everything written so far, as UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// The emitted records, one per line.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    fn append(&self, bytes: &[u8]) {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(bytes);
    }
}

#[derive(Debug)]
enum SinkKind {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(BufWriter<std::fs::File>),
    Buffer(BufferHandle),
}

/// A log output destination.
///
/// Writes are serialized through one internal lock, so a record's bytes are
/// never interleaved with another caller's.
#[derive(Debug)]
pub struct Sink {
    kind: Mutex<SinkKind>,
}

impl Sink {
    /// Open a destination identifier: the literals `stdout` / `stderr`, or
    /// a file path (created if missing, appended to).
    pub fn open(output: &str) -> Result<Self, LogError> {
        let kind = match output {
            "stdout" => SinkKind::Stdout(io::stdout()),
            "stderr" => SinkKind::Stderr(io::stderr()),
            path => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LogError::OpenSink {
                        path: path.to_string(),
                        source,
                    })?;
                SinkKind::File(BufWriter::new(file))
            }
        };
        Ok(Self {
            kind: Mutex::new(kind),
        })
    }

    /// An in-memory sink plus the handle for reading it back.
    pub fn buffer() -> (Self, BufferHandle) {
        let handle = BufferHandle::default();
        let sink = Self {
            kind: Mutex::new(SinkKind::Buffer(handle.clone())),
        };
        (sink, handle)
    }

    /// Write one encoded record, optionally flushing before returning.
    pub fn write_record(&self, bytes: &[u8], flush: bool) -> io::Result<()> {
        let mut kind = self.kind.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *kind {
            SinkKind::Stdout(out) => {
                out.write_all(bytes)?;
                if flush {
                    out.flush()?;
                }
            }
            SinkKind::Stderr(err) => {
                err.write_all(bytes)?;
                if flush {
                    err.flush()?;
                }
            }
            SinkKind::File(file) => {
                file.write_all(bytes)?;
                if flush {
                    file.flush()?;
                }
            }
            SinkKind::Buffer(handle) => handle.append(bytes),
        }
        Ok(())
    }
}
