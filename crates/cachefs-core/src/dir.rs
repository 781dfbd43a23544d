//! Directory handles and entry-map maintenance.
//!
//! Each directory's listing lives in the store as a JSON entry map under the
//! directory's own path key. All edits are read-modify-write against that
//! one blob: fetch the map, mutate it in memory, persist the whole map back.
//! The store offers no multi-key transactions, so the last writer of a full
//! map persist wins; callers needing stronger guarantees must serialize
//! access to a given directory path externally.

use std::sync::Arc;

use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::file::FileHandle;
use crate::store::BlobStore;
use crate::types::{Blob, BlobKind, EntryMap};

/// One child of a directory listing.
pub enum EntryHandle {
    File(FileHandle),
    Directory(DirectoryHandle),
}

impl EntryHandle {
    pub fn path(&self) -> &str {
        match self {
            EntryHandle::File(f) => f.path(),
            EntryHandle::Directory(d) => d.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntryHandle::File(f) => f.name(),
            EntryHandle::Directory(d) => d.name(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, EntryHandle::File(_))
    }
}

/// Lightweight handle to one directory path.
///
/// Never caches the entry map across calls; every operation re-reads the
/// minimal authoritative state it needs, since no two handles are
/// guaranteed a consistent snapshot under concurrent mutation.
#[derive(Clone)]
pub struct DirectoryHandle {
    store: Arc<dyn BlobStore>,
    path: String,
}

impl DirectoryHandle {
    pub(crate) fn new(store: Arc<dyn BlobStore>, path: String) -> Self {
        Self { store, path }
    }

    /// Absolute path of this directory, which is also its store key.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment (empty for the root).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Join a child name onto this directory's path with a single separator.
    fn child_path(&self, name: &str) -> String {
        if self.path.ends_with('/') {
            format!("{}{}", self.path, name)
        } else {
            format!("{}/{}", self.path, name)
        }
    }

    /// Fetch this directory's entry map fresh from the store.
    ///
    /// An absent key, a file blob, or an unreadable map all read as the
    /// directory being gone.
    async fn tree(&self) -> FsResult<EntryMap> {
        read_entry_map(&self.store, &self.path)
            .await?
            .ok_or(FsError::NotFound)
    }

    /// Persist the whole entry map back under this directory's key.
    async fn save_tree(&self, tree: &EntryMap) -> FsResult<()> {
        let encoded = serde_json::to_vec(tree)?;
        self.store.put(&self.path, Blob::directory(encoded)).await
    }

    /// List the children, re-reading the entry map at call time.
    ///
    /// Each call observes the listing as of that moment; the returned
    /// handles are as lightweight as the one they came from.
    pub async fn entries(&self) -> FsResult<Vec<EntryHandle>> {
        let tree = self.tree().await?;
        Ok(tree
            .into_iter()
            .map(|(path, is_file)| {
                if is_file {
                    EntryHandle::File(FileHandle::new(self.store.clone(), path))
                } else {
                    EntryHandle::Directory(DirectoryHandle::new(self.store.clone(), path))
                }
            })
            .collect())
    }

    /// Look up (or create) the child directory `name`.
    ///
    /// A file registered at that path fails with [`FsError::TypeMismatch`];
    /// an absent path fails with [`FsError::NotFound`] unless `create` is
    /// set. Creation writes the child's empty entry map before updating the
    /// parent, so an interruption between the two writes can leave an orphan
    /// blob but never a dangling reference.
    pub async fn get_directory(&self, name: &str, create: bool) -> FsResult<DirectoryHandle> {
        let path = self.child_path(name);
        let mut tree = self.tree().await?;
        match tree.get(&path) {
            Some(true) => Err(FsError::TypeMismatch),
            Some(false) => Ok(DirectoryHandle::new(self.store.clone(), path)),
            None if create => {
                let empty = serde_json::to_vec(&EntryMap::new())?;
                self.store.put(&path, Blob::directory(empty)).await?;
                tree.insert(path.clone(), false);
                self.save_tree(&tree).await?;
                debug!(path = %path, "created directory");
                Ok(DirectoryHandle::new(self.store.clone(), path))
            }
            None => Err(FsError::NotFound),
        }
    }

    /// Look up (or create) the child file `name`.
    ///
    /// Symmetric to [`get_directory`](Self::get_directory); creation writes
    /// an empty file blob at the child path and registers it in the parent.
    pub async fn get_file(&self, name: &str, create: bool) -> FsResult<FileHandle> {
        let path = self.child_path(name);
        let mut tree = self.tree().await?;
        match tree.get(&path) {
            Some(false) => Err(FsError::TypeMismatch),
            Some(true) => Ok(FileHandle::new(self.store.clone(), path)),
            None if create => {
                self.store.put(&path, Blob::empty_file()).await?;
                tree.insert(path.clone(), true);
                self.save_tree(&tree).await?;
                debug!(path = %path, "created file");
                Ok(FileHandle::new(self.store.clone(), path))
            }
            None => Err(FsError::NotFound),
        }
    }

    /// Remove the child `name`.
    ///
    /// Files are deleted outright. A directory must be empty unless
    /// `recursive` is set, in which case every descendant blob and entry map
    /// is deleted via an explicit worklist (no call-stack recursion, so tree
    /// depth is not bounded by stack size). The parent map is persisted only
    /// after the deletions succeed.
    pub async fn remove_entry(&self, name: &str, recursive: bool) -> FsResult<()> {
        let path = self.child_path(name);
        let mut tree = self.tree().await?;
        let Some(&is_file) = tree.get(&path) else {
            return Err(FsError::NotFound);
        };

        if is_file {
            self.store.delete(&path).await?;
        } else if recursive {
            let mut worklist = vec![path.clone()];
            while let Some(dir) = worklist.pop() {
                let entries = read_entry_map(&self.store, &dir).await?.unwrap_or_default();
                for (child, child_is_file) in entries {
                    if child_is_file {
                        self.store.delete(&child).await?;
                    } else {
                        worklist.push(child);
                    }
                }
                self.store.delete(&dir).await?;
            }
        } else {
            let entries = read_entry_map(&self.store, &path).await?.unwrap_or_default();
            if !entries.is_empty() {
                return Err(FsError::InvalidModification);
            }
            self.store.delete(&path).await?;
        }

        tree.remove(&path);
        self.save_tree(&tree).await?;
        debug!(path = %path, recursive, "removed entry");
        Ok(())
    }
}

/// Fetch and decode the entry map at `path`, if one is there.
///
/// Returns `None` for an absent key, a file blob, or a map that fails to
/// decode; the tree layer treats all three as the directory being gone.
async fn read_entry_map(store: &Arc<dyn BlobStore>, path: &str) -> FsResult<Option<EntryMap>> {
    let Some(blob) = store.get(path).await? else {
        return Ok(None);
    };
    if blob.kind != BlobKind::Directory {
        return Ok(None);
    }
    Ok(serde_json::from_slice(&blob.data).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FsConfig;
    use crate::mount;
    use crate::store::MemoryStore;

    async fn fresh_root() -> (Arc<MemoryStore>, DirectoryHandle) {
        let store = Arc::new(MemoryStore::new());
        let root = mount(store.clone(), FsConfig::default()).await.unwrap();
        (store, root)
    }

    #[tokio::test]
    async fn test_create_and_list_nested_entries() {
        let (_, root) = fresh_root().await;

        let docs = root.get_directory("docs", true).await.unwrap();
        docs.get_file("a.txt", true).await.unwrap();
        docs.get_directory("inner", true).await.unwrap();

        let entries = docs.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.name() == "a.txt" && e.is_file()));
        assert!(entries.iter().any(|e| e.name() == "inner" && !e.is_file()));

        // Lookups without create resolve the same handles.
        root.get_directory("docs", false).await.unwrap();
        docs.get_file("a.txt", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_child_paths_join_with_single_separator() {
        let (_, root) = fresh_root().await;
        let a = root.get_directory("a", true).await.unwrap();
        assert_eq!(a.path(), "/a");
        let b = a.get_directory("b", true).await.unwrap();
        assert_eq!(b.path(), "/a/b");
        let f = b.get_file("c.txt", true).await.unwrap();
        assert_eq!(f.path(), "/a/b/c.txt");
    }

    #[tokio::test]
    async fn test_lookup_absent_without_create_is_gone() {
        let (_, root) = fresh_root().await;
        assert!(matches!(
            root.get_directory("missing", false).await,
            Err(FsError::NotFound)
        ));
        assert!(matches!(
            root.get_file("missing", false).await,
            Err(FsError::NotFound)
        ));
        assert!(matches!(
            root.remove_entry("missing", false).await,
            Err(FsError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_kind_mismatch_does_not_mutate() {
        let (_, root) = fresh_root().await;
        root.get_file("f", true).await.unwrap();
        root.get_directory("d", true).await.unwrap();

        assert!(matches!(
            root.get_directory("f", true).await,
            Err(FsError::TypeMismatch)
        ));
        assert!(matches!(
            root.get_file("d", true).await,
            Err(FsError::TypeMismatch)
        ));

        // Both entries survive with their original kinds.
        let entries = root.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.name() == "f" && e.is_file()));
        assert!(entries.iter().any(|e| e.name() == "d" && !e.is_file()));
    }

    #[tokio::test]
    async fn test_remove_file_deletes_blob_and_registration() {
        let (store, root) = fresh_root().await;
        root.get_file("f", true).await.unwrap();
        root.remove_entry("f", false).await.unwrap();

        assert!(store.get("/f").await.unwrap().is_none());
        assert!(root.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_nonempty_directory_requires_recursive() {
        let (store, root) = fresh_root().await;
        let d = root.get_directory("d", true).await.unwrap();
        d.get_file("f", true).await.unwrap();

        assert!(matches!(
            root.remove_entry("d", false).await,
            Err(FsError::InvalidModification)
        ));
        // Still listed and intact after the failed removal.
        assert_eq!(root.entries().await.unwrap().len(), 1);
        assert!(store.get("/d/f").await.unwrap().is_some());

        root.remove_entry("d", true).await.unwrap();
        assert!(root.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recursive_remove_deletes_all_descendant_keys() {
        let (store, root) = fresh_root().await;
        let a = root.get_directory("a", true).await.unwrap();
        let b = a.get_directory("b", true).await.unwrap();
        b.get_file("deep.txt", true).await.unwrap();
        a.get_file("shallow.txt", true).await.unwrap();
        root.get_file("sibling.txt", true).await.unwrap();

        root.remove_entry("a", true).await.unwrap();

        for key in ["/a", "/a/b", "/a/b/deep.txt", "/a/shallow.txt"] {
            assert!(store.get(key).await.unwrap().is_none(), "{key} leaked");
        }
        // The sibling outside the removed subtree is untouched.
        assert!(store.get("/sibling.txt").await.unwrap().is_some());
        assert_eq!(store.len(), 2); // root map + sibling
    }

    #[tokio::test]
    async fn test_remove_empty_directory_without_recursive() {
        let (store, root) = fresh_root().await;
        root.get_directory("empty", true).await.unwrap();
        root.remove_entry("empty", false).await.unwrap();
        assert!(store.get("/empty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_map_reads_as_gone() {
        let (store, root) = fresh_root().await;
        let d = root.get_directory("d", true).await.unwrap();

        // Clobber the directory's entry map with bytes that do not decode.
        store
            .put("/d", Blob::directory(b"not json".to_vec()))
            .await
            .unwrap();

        assert!(matches!(d.entries().await, Err(FsError::NotFound)));
        assert!(matches!(
            d.get_directory("child", false).await,
            Err(FsError::NotFound)
        ));
        assert!(matches!(
            d.get_file("child", false).await,
            Err(FsError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_recreation_after_deletion_is_fresh() {
        let (_, root) = fresh_root().await;

        let f = root.get_file("f", true).await.unwrap();
        let mut sink = f.create_writable().await.unwrap();
        sink.write(b"old contents");
        sink.close().await.unwrap();

        root.remove_entry("f", false).await.unwrap();
        let f = root.get_file("f", true).await.unwrap();
        assert!(f.read().await.unwrap().data.is_empty());

        let d = root.get_directory("d", true).await.unwrap();
        d.get_file("inner", true).await.unwrap();
        root.remove_entry("d", true).await.unwrap();
        let d = root.get_directory("d", true).await.unwrap();
        assert!(d.entries().await.unwrap().is_empty());
    }
}
