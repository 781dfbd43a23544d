//! cachefs — a virtual hierarchical filesystem over a flat key-value blob
//! store.
//!
//! Directories and files are addressed by path strings into a
//! [`BlobStore`]: file content is stored as-is under the file's path, and
//! each directory's listing is a JSON entry map stored under the
//! directory's own path. [`mount`] initializes the root entry map and hands
//! back a [`DirectoryHandle`]; from there, callers navigate with
//! [`DirectoryHandle::get_directory`] / [`DirectoryHandle::get_file`] and
//! write through a buffered [`Sink`] that commits atomically on close.
//!
//! The store is a passed-in collaborator with per-key atomicity only. There
//! is no cross-handle locking: concurrent mutators of the same directory or
//! file follow last-writer-wins.

use std::sync::Arc;

use tracing::debug;

pub mod config;
pub mod dir;
pub mod error;
pub mod file;
pub mod sink;
pub mod store;
pub mod types;

pub use config::FsConfig;
pub use dir::{DirectoryHandle, EntryHandle};
pub use error::{FsError, FsResult};
pub use file::FileHandle;
pub use sink::{Sink, WriteCommand};
pub use store::{BlobStore, DirStore, MemoryStore};
pub use types::{Blob, BlobKind, EntryMap, FileData};

/// Open the filesystem rooted in `store`.
///
/// Creates the root entry map if the store does not hold one yet, so
/// mounting an already-populated store preserves its tree. Returns the root
/// directory handle.
pub async fn mount(store: Arc<dyn BlobStore>, config: FsConfig) -> FsResult<DirectoryHandle> {
    if store.get(&config.root_path).await?.is_none() {
        let empty = serde_json::to_vec(&EntryMap::new())?;
        store.put(&config.root_path, Blob::directory(empty)).await?;
        debug!(root = %config.root_path, "initialized root entry map");
    }
    Ok(DirectoryHandle::new(store, config.root_path))
}
