//! Blob store abstraction and backends.
//!
//! The tree and sink logic sit on top of a flat key-value store of
//! [`Blob`]s keyed by path strings. Keys are atomic per-entry; there are no
//! multi-key transactions, and no enumeration is required (directory
//! listings are maintained as entry maps by the tree layer itself).

use async_trait::async_trait;

use crate::error::FsResult;
use crate::types::Blob;

mod disk;
mod memory;

pub use disk::DirStore;
pub use memory::MemoryStore;

/// Flat key-value blob store the filesystem is built on.
///
/// All three operations may suspend the caller; none of them may be
/// retried internally. An absent key is a normal outcome of `get`, not a
/// failure, and deleting an absent key is a no-op.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> FsResult<Option<Blob>>;

    /// Store `blob` at `key`, overwriting unconditionally.
    async fn put(&self, key: &str, blob: Blob) -> FsResult<()>;

    /// Remove `key`. Absent keys are ignored.
    async fn delete(&self, key: &str) -> FsResult<()>;
}
