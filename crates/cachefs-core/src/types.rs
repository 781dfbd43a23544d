//! Core type definitions for cachefs

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Content-kind marker stored with every blob, so a reader can tell a tree
/// node from file content without consulting the parent directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    File,
    Directory,
}

/// The unit held by a [`BlobStore`](crate::store::BlobStore): opaque bytes
/// plus small metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub kind: BlobKind,
    pub data: Vec<u8>,
    /// Milliseconds since the Unix epoch; stale until the owning sink closes.
    pub modified_ms: i64,
}

impl Blob {
    /// A freshly created, empty file blob.
    pub fn empty_file() -> Self {
        Self::file(Vec::new())
    }

    /// A file blob over `data`, stamped with the current time.
    pub fn file(data: Vec<u8>) -> Self {
        Self {
            kind: BlobKind::File,
            data,
            modified_ms: now_ms(),
        }
    }

    /// A directory blob holding the serialized entry map.
    pub fn directory(data: Vec<u8>) -> Self {
        Self {
            kind: BlobKind::Directory,
            data,
            modified_ms: now_ms(),
        }
    }
}

/// One directory's listing: absolute child path -> `is_file` flag.
///
/// Serialized as a JSON object at the directory's own store key. `BTreeMap`
/// keeps the encoding deterministic; lookup is by exact path.
pub type EntryMap = BTreeMap<String, bool>;

/// A file read result: bytes plus last-modified metadata.
#[derive(Clone, Debug)]
pub struct FileData {
    pub name: String,
    pub data: Vec<u8>,
    pub modified_ms: i64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
