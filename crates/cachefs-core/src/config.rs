//! Configuration types for cachefs

use serde::{Deserialize, Serialize};

/// Filesystem configuration carried by [`mount`](crate::mount).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FsConfig {
    /// Store key of the root directory's entry map. Every other key in the
    /// tree descends from this sentinel.
    pub root_path: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
        }
    }
}
