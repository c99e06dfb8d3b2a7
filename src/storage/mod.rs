//! Storage backends for persisting and restoring [`Config`] instances
//!
//! A [`Storage`] is a strategy object bound to one destination (a file path,
//! plus backend-specific addressing such as a group path). Two backends are
//! provided: [`TreeStorage`], which maps configs onto a tree of named groups
//! with typed leaf datasets, and [`YamlStorage`], which maps them onto a
//! nested YAML document.
//!
//! All I/O is synchronous and single-attempt; the backends take no locks, so
//! concurrent access to the same destination must be serialized externally.

use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};

pub mod tree;
pub mod yaml;

pub use tree::{Dataset, Group, Node, TreeFile, TreeStorage};
pub use yaml::YamlStorage;

/// Load/save contract every backend implements.
///
/// `merge = true` means "reset the config to defaults before the operation" —
/// deliberately not a field-wise union. Loading is additive: fields absent
/// from the persisted data keep their in-memory values.
pub trait Storage: Send + Sync {
    /// Load persisted values into `config`
    fn load(&self, config: &mut Config, merge: bool) -> Result<()>;

    /// Persist the current values of `config`
    fn save(&self, config: &mut Config, merge: bool) -> Result<()>;

    /// Drop the persisted data at this storage's destination
    fn clear(&self) -> Result<()>;
}

/// Create the parent directory of `path` if it does not exist yet
pub(crate) fn create_basedir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write file contents in place.
///
/// Deliberately not an atomic temp-and-rename: the concurrency contract
/// leaves serialization of same-destination access to the caller.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    create_basedir(path)?;
    std::fs::write(path, contents).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
