//! File handles.

use std::sync::Arc;

use crate::error::{FsError, FsResult};
use crate::sink::Sink;
use crate::store::BlobStore;
use crate::types::{BlobKind, FileData};

/// Lightweight handle to one file path.
///
/// Holds no cached state beyond the path itself; every operation re-fetches
/// the authoritative blob from the store, so a handle stays valid across
/// concurrent mutation and simply reports `NotFound` once the file is gone.
#[derive(Clone)]
pub struct FileHandle {
    store: Arc<dyn BlobStore>,
    path: String,
}

impl FileHandle {
    pub(crate) fn new(store: Arc<dyn BlobStore>, path: String) -> Self {
        Self { store, path }
    }

    /// Absolute path of this file, which is also its store key.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Fetch the file's bytes and last-modified metadata.
    ///
    /// Fails with [`FsError::NotFound`] if the key is absent, which covers a
    /// deletion raced between handle creation and this read.
    pub async fn read(&self) -> FsResult<FileData> {
        let blob = self.store.get(&self.path).await?.ok_or(FsError::NotFound)?;
        if blob.kind != BlobKind::File {
            return Err(FsError::TypeMismatch);
        }
        Ok(FileData {
            name: self.name().to_string(),
            data: blob.data,
            modified_ms: blob.modified_ms,
        })
    }

    /// Open a write sink over a copy of the current bytes.
    ///
    /// The file is not locked against other readers or writers; the last
    /// sink to close wins.
    pub async fn create_writable(&self) -> FsResult<Sink> {
        let file = self.read().await?;
        Ok(Sink::new(self.store.clone(), self.path.clone(), file.data))
    }
}
