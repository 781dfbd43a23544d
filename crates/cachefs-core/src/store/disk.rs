//! Directory-backed blob store backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::FsResult;
use crate::store::BlobStore;
use crate::types::{Blob, BlobKind};

/// Sidecar metadata written next to each data file.
#[derive(Serialize, Deserialize)]
struct BlobMeta {
    kind: BlobKind,
    modified_ms: i64,
}

/// Directory-backed store: one data file plus one `.meta.json` sidecar per
/// key, all in a single flat directory.
///
/// Keys are path strings and may nest (`/a` and `/a/b` are both plain keys),
/// so they are escaped to flat file names rather than mapped onto the host
/// directory structure.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open<P: AsRef<Path>>(root: P) -> FsResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn data_path(&self, key: &str) -> PathBuf {
        self.root.join(escape_key(key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.meta.json", escape_key(key)))
    }
}

/// Escape a store key to a flat file name.
///
/// `[A-Za-z0-9_-]` passes through; every other byte becomes `%XX`. Escaped
/// names never contain `.`, so the `.meta.json` sidecar suffix cannot
/// collide with another key's data file.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[async_trait]
impl BlobStore for DirStore {
    async fn get(&self, key: &str) -> FsResult<Option<Blob>> {
        let meta_bytes = match fs::read(self.meta_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: BlobMeta = serde_json::from_slice(&meta_bytes)?;
        let data = fs::read(self.data_path(key)).await?;
        Ok(Some(Blob {
            kind: meta.kind,
            data,
            modified_ms: meta.modified_ms,
        }))
    }

    async fn put(&self, key: &str, blob: Blob) -> FsResult<()> {
        let meta = BlobMeta {
            kind: blob.kind,
            modified_ms: blob.modified_ms,
        };
        // Data first so a reader never sees metadata for absent bytes.
        fs::write(self.data_path(key), &blob.data).await?;
        fs::write(self.meta_path(key), serde_json::to_vec(&meta)?).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> FsResult<()> {
        for path in [self.meta_path(key), self.data_path(key)] {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
