//! Buffered write sink for one file.
//!
//! A [`Sink`] owns a local copy of the target file's bytes and applies
//! write/seek/truncate operations to it in memory. Nothing touches the
//! store until [`Sink::close`], which commits the staged buffer in a single
//! `put` after re-checking that the file still exists. A sink that is
//! dropped without closing has no effect.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::store::BlobStore;
use crate::types::{Blob, BlobKind};

/// One staged mutation against a sink.
///
/// Serialized with a `"type"` tag so adapters can hand wire-shaped operation
/// payloads straight to [`WriteCommand::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WriteCommand {
    /// Write `data`, optionally relocating the cursor first.
    Write {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u64>,
        data: Vec<u8>,
    },
    /// Move the cursor without touching any bytes.
    Seek { position: u64 },
    /// Shrink or zero-extend the buffer to `size`.
    Truncate { size: u64 },
}

impl WriteCommand {
    /// Decode a JSON operation payload. A missing required field or an
    /// unknown tag is a [`FsError::Syntax`] error.
    pub fn parse(payload: &[u8]) -> FsResult<Self> {
        serde_json::from_slice(payload).map_err(|e| FsError::syntax(e.to_string()))
    }
}

/// In-memory staging buffer bound to one file path.
pub struct Sink {
    store: Arc<dyn BlobStore>,
    path: String,
    buffer: Vec<u8>,
    position: usize,
}

impl Sink {
    pub(crate) fn new(store: Arc<dyn BlobStore>, path: String, data: Vec<u8>) -> Self {
        Self {
            store,
            path,
            buffer: data,
            position: 0,
        }
    }

    /// Current staged size in bytes.
    pub fn len(&self) -> u64 {
        self.buffer.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.position as u64
    }

    /// Write `data` at the cursor, splicing it into the buffer.
    ///
    /// Bytes before the cursor are kept, bytes past the written range are
    /// kept, and any gap between the old end and the cursor is zero-filled.
    /// The cursor advances past the written bytes.
    pub fn write(&mut self, data: &[u8]) {
        let len = self.buffer.len();
        let pos = self.position;
        let head = pos.min(len);
        let tail = pos + data.len();

        let mut next = Vec::with_capacity(tail.max(len));
        next.extend_from_slice(&self.buffer[..head]);
        next.resize(pos, 0);
        next.extend_from_slice(data);
        if tail < len {
            next.extend_from_slice(&self.buffer[tail..]);
        }

        self.buffer = next;
        self.position = tail;
    }

    /// Move the cursor. Seeking past the end of the staged data fails with
    /// [`FsError::InvalidArgument`].
    pub fn seek(&mut self, position: u64) -> FsResult<()> {
        if position > self.len() {
            return Err(FsError::InvalidArgument);
        }
        self.position = position as usize;
        Ok(())
    }

    /// Resize the staged buffer: trailing bytes are dropped on shrink, zero
    /// bytes are appended on grow. The cursor clamps to the new size if it
    /// would land past it.
    pub fn truncate(&mut self, size: u64) {
        let size = size as usize;
        self.buffer.resize(size, 0);
        if self.position > size {
            self.position = size;
        }
    }

    /// Apply one staged operation.
    ///
    /// A positional write may target any offset, including past the end of
    /// the staged data; the gap is zero-filled by the splice. An explicit
    /// seek stays bounded by the current size.
    pub fn apply(&mut self, op: WriteCommand) -> FsResult<()> {
        match op {
            WriteCommand::Write { position, data } => {
                if let Some(position) = position {
                    self.position = position as usize;
                }
                self.write(&data);
                Ok(())
            }
            WriteCommand::Seek { position } => self.seek(position),
            WriteCommand::Truncate { size } => {
                self.truncate(size);
                Ok(())
            }
        }
    }

    /// Commit the staged buffer, consuming the sink.
    ///
    /// Re-checks that the target key still holds a file so a deletion raced
    /// during the sink's lifetime surfaces as [`FsError::NotFound`] instead
    /// of resurrecting the file. A key re-created as a directory in the
    /// meantime counts as gone too; committing would clobber its entry map.
    pub async fn close(self) -> FsResult<()> {
        match self.store.get(&self.path).await? {
            Some(blob) if blob.kind == BlobKind::File => {}
            _ => return Err(FsError::NotFound),
        }
        debug!(path = %self.path, size = self.buffer.len(), "sink commit");
        self.store.put(&self.path, Blob::file(self.buffer)).await
    }
}
