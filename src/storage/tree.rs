//! Hierarchical tree backend
//!
//! Maps a [`Config`] onto a tree of named groups with typed leaf datasets:
//! every scalar or list setting becomes one [`Dataset`] (scalar or 1-D),
//! nested configs become sub-groups, and config lists become sub-groups
//! with zero-indexed numeric child groups. Groups along an address path are
//! created on demand; a dataset squatting on a group path is a structural
//! conflict unless `force` replaces it.
//!
//! The on-disk encoding of the tree is an opaque serde codec; the structure
//! above it is the interface. A zero-length or missing file reads as an
//! empty root, never as a parse failure.

use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::setting::{Setting, SettingKind};
use crate::storage::{Storage, write_file};
use crate::value::Value;

// =============================================================================
// Tree Model
// =============================================================================

/// Typed leaf value: scalar or 1-D only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    TextVec(Vec<String>),
    IntVec(Vec<i64>),
    FloatVec(Vec<f64>),
}

impl Dataset {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Dataset::Text(_) => "text dataset",
            Dataset::Bool(_) => "bool dataset",
            Dataset::Int(_) => "int dataset",
            Dataset::Float(_) => "float dataset",
            Dataset::TextVec(_) => "text vector",
            Dataset::IntVec(_) => "int vector",
            Dataset::FloatVec(_) => "float vector",
        }
    }
}

/// A tree node: either a named group of further nodes, or a leaf dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
}

/// Ordered name-to-node mapping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    entries: Vec<(String, Node)>,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Insert a node, replacing any existing entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, node));
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn child_group_mut(&mut self, name: &str, full_path: &str, force: bool) -> Result<&mut Group> {
        let create = match self.get(name) {
            None => {
                debug!("creating group {full_path}");
                true
            }
            Some(Node::Dataset(_)) => {
                if !force {
                    return Err(Error::NotAGroup {
                        path: full_path.to_string(),
                    });
                }
                info!("overwriting dataset at {full_path} with a group");
                true
            }
            Some(Node::Group(_)) => false,
        };
        if create {
            self.insert(name, Node::Group(Group::new()));
        }
        match self.get_mut(name) {
            Some(Node::Group(group)) => Ok(group),
            _ => Err(Error::NotAGroup {
                path: full_path.to_string(),
            }),
        }
    }
}

/// Walk a `/`-delimited path below `root`, creating intermediate groups on
/// demand. Idempotent for existing group paths.
///
/// # Errors
///
/// [`Error::NotAGroup`] when a dataset occupies a path component and `force`
/// is false; with `force`, the dataset is deleted and replaced by a group.
pub fn ensure_group<'a>(root: &'a mut Group, path: &str, force: bool) -> Result<&'a mut Group> {
    let mut current = root;
    let mut walked = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        walked.push('/');
        walked.push_str(part);
        current = current.child_group_mut(part, &walked, force)?;
    }
    Ok(current)
}

fn find_group<'a>(root: &'a Group, path: &str) -> Option<&'a Group> {
    let mut current = root;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        match current.get(part) {
            Some(Node::Group(group)) => current = group,
            _ => return None,
        }
    }
    Some(current)
}

// =============================================================================
// Tree File
// =============================================================================

/// An open tree file: the whole group tree held in memory, flushed back as a
/// unit. Several configs can share one `TreeFile` by addressing different
/// groups through [`TreeStorage::save_group`] / [`TreeStorage::load_group`].
pub struct TreeFile {
    path: PathBuf,
    root: Group,
}

impl TreeFile {
    /// Open a tree file. A missing or zero-length file yields an empty root.
    ///
    /// # Errors
    ///
    /// I/O failures other than "not found" carry the path; decode failures
    /// surface as [`Error::Serialize`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let root = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Group::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Group::new(),
            Err(e) => {
                return Err(Error::FileRead {
                    path: path.clone(),
                    source: e,
                });
            }
        };
        Ok(Self { path, root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn root(&self) -> &Group {
        &self.root
    }

    #[must_use]
    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    /// Group at a `/`-delimited path, created on demand
    ///
    /// # Errors
    ///
    /// See [`ensure_group`].
    pub fn group_mut(&mut self, path: &str, force: bool) -> Result<&mut Group> {
        ensure_group(&mut self.root, path, force)
    }

    /// Write the tree back to disk
    ///
    /// # Errors
    ///
    /// Encode or write failures, with path context.
    pub fn flush(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.root)?;
        write_file(&self.path, &bytes)
    }
}

// =============================================================================
// Tree Storage
// =============================================================================

/// Storage backend persisting configs under a group path in a tree file.
///
/// The addressed group (and the file itself) is created on first use, so a
/// load against a fresh path leaves a stub group behind — matching the
/// "open for append" semantics the layout expects.
#[derive(Debug, Clone)]
pub struct TreeStorage {
    path: PathBuf,
    group: String,
}

impl TreeStorage {
    /// File extension used for tree files
    pub const EXTENSION: &'static str = "tree";

    /// Storage rooted at `/` in the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            group: "/".to_string(),
        }
    }

    /// Address a sub-group instead of the file root
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Save a config into an externally managed group
    ///
    /// # Errors
    ///
    /// Conversion or structural failures; nothing is written to disk here.
    pub fn save_group(config: &Config, group: &mut Group) -> Result<()> {
        save_into(config, group, "")
    }

    /// Load a config from an externally managed group
    ///
    /// # Errors
    ///
    /// Conversion or coercion failures, logged with the full path.
    pub fn load_group(config: &mut Config, group: &Group) -> Result<()> {
        load_from(config, group, "")
    }
}

impl Storage for TreeStorage {
    fn load(&self, config: &mut Config, merge: bool) -> Result<()> {
        if merge {
            config.clear();
        }
        let mut file = TreeFile::open(&self.path)?;
        let need_stub = !self.path.exists() || find_group(file.root(), &self.group).is_none();
        let group = file.group_mut(&self.group, false)?;
        load_from(config, group, &group_prefix(&self.group))?;
        if need_stub {
            file.flush()?;
        }
        Ok(())
    }

    fn save(&self, config: &mut Config, merge: bool) -> Result<()> {
        if merge {
            config.clear();
        }
        let mut file = TreeFile::open(&self.path)?;
        let group = file.group_mut(&self.group, false)?;
        save_into(config, group, &group_prefix(&self.group))?;
        file.flush()
    }

    fn clear(&self) -> Result<()> {
        let mut file = TreeFile::open(&self.path)?;
        let group = file.group_mut(&self.group, false)?;
        *group = Group::new();
        file.flush()
    }
}

fn group_prefix(group: &str) -> String {
    let trimmed = group.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// =============================================================================
// Config <-> Group Mapping
// =============================================================================

fn save_into(config: &Config, group: &mut Group, path: &str) -> Result<()> {
    for setting in config.schema().settings() {
        let name = setting.name();
        let Some(value) = config.get(name) else {
            continue;
        };
        match setting.kind() {
            SettingKind::Config(_) => {
                if let Value::Config(child) = value {
                    group.remove(name);
                    let sub = ensure_group(group, name, true)?;
                    save_into(child, sub, &format!("{path}/{name}"))?;
                    continue;
                }
                // unset: empty-text placeholder keeps the name present
                let text = setting.convert_to_text(value)?;
                group.insert(name, Node::Dataset(Dataset::Text(text)));
            }
            SettingKind::ConfigList(_) => {
                if let Value::ConfigList(children) = value {
                    if !children.is_empty() {
                        group.remove(name);
                        let sub = ensure_group(group, name, true)?;
                        for (i, child) in children.iter().enumerate() {
                            let child_group = ensure_group(sub, &i.to_string(), true)?;
                            save_into(child, child_group, &format!("{path}/{name}/{i}"))?;
                        }
                        continue;
                    }
                }
                let text = setting.convert_to_text(value)?;
                group.insert(name, Node::Dataset(Dataset::Text(text)));
            }
            _ => {
                let dataset = dataset_for(setting, value)?;
                group.insert(name, Node::Dataset(dataset));
            }
        }
    }
    Ok(())
}

/// Typed leaf for a scalar/list setting; `None` and empty lists go through
/// the text form so "unset" stays distinguishable from a concrete value.
fn dataset_for(setting: &Setting, value: &Value) -> Result<Dataset> {
    if value.is_unset() {
        return Ok(Dataset::Text(setting.convert_to_text(value)?));
    }
    let dataset = match (setting.kind(), value) {
        (SettingKind::Boolean, Value::Bool(b)) => Dataset::Bool(*b),
        (SettingKind::Integer, Value::Int(i)) => Dataset::Int(*i),
        (SettingKind::Float, Value::Float(x)) => Dataset::Float(*x),
        (SettingKind::Float, Value::Int(i)) => Dataset::Float(*i as f64),
        (SettingKind::TextList, Value::TextList(v)) => Dataset::TextVec(v.clone()),
        (SettingKind::IntegerList, Value::IntList(v)) => Dataset::IntVec(v.clone()),
        (SettingKind::FloatList, Value::FloatList(v)) => Dataset::FloatVec(v.clone()),
        _ => Dataset::Text(setting.convert_to_text(value)?),
    };
    Ok(dataset)
}

fn load_from(config: &mut Config, group: &Group, path: &str) -> Result<()> {
    let schema = config.schema().clone();
    // settings absent from the group keep their in-memory values
    for setting in schema.settings() {
        let name = setting.name();
        let Some(node) = group.get(name) else {
            continue;
        };
        let full_path = format!("{path}/{name}");
        match (setting.kind(), node) {
            (SettingKind::ConfigList(_), Node::Group(sub)) => {
                let schema = setting.nested_schema()?.clone();
                let mut indices: Vec<usize> = sub
                    .names()
                    .filter_map(|n| n.parse::<usize>().ok())
                    .collect();
                indices.sort_unstable();
                let mut children = Vec::with_capacity(indices.len());
                for index in indices {
                    let child_name = index.to_string();
                    if let Some(Node::Group(child_group)) = sub.get(&child_name) {
                        let mut child = Config::new(&schema);
                        load_from(&mut child, child_group, &format!("{full_path}/{index}"))?;
                        children.push(child);
                    }
                }
                config.set(name, Value::ConfigList(children))?;
            }
            // empty-text placeholder from an unset save: leave value as-is
            (SettingKind::ConfigList(_) | SettingKind::Config(_), Node::Dataset(_)) => {}
            (SettingKind::Config(_), Node::Group(sub)) => {
                let schema = setting.nested_schema()?.clone();
                if !matches!(config.get(name), Some(Value::Config(_))) {
                    config.set(name, Value::Config(Box::new(Config::new(&schema))))?;
                }
                if let Some(Value::Config(child)) = config.get_mut(name) {
                    load_from(child, sub, &full_path)?;
                }
            }
            (_, Node::Dataset(dataset)) => {
                let value = coerce_dataset(setting, dataset, &full_path)?;
                config.set(name, value)?;
            }
            (_, Node::Group(_)) => {
                let err = Error::TypeMismatch {
                    path: full_path,
                    expected: "dataset".to_string(),
                    actual: "group".to_string(),
                };
                error!("could not read {path}/{name}: {err}");
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Coerce a typed leaf into the setting's native value. Text datasets go
/// through `convert_from_text` to normalize sentinel forms like `None`.
fn coerce_dataset(setting: &Setting, dataset: &Dataset, path: &str) -> Result<Value> {
    let value = match (setting.kind(), dataset) {
        (_, Dataset::Text(text)) => Some(setting.convert_from_text(text)?),
        (SettingKind::Boolean, Dataset::Bool(b)) => Some(Value::Bool(*b)),
        (SettingKind::Boolean, Dataset::Int(i)) => Some(Value::Bool(*i != 0)),
        (SettingKind::Integer, Dataset::Int(i)) => Some(Value::Int(*i)),
        (SettingKind::Integer, Dataset::Float(x)) => Some(Value::Int(*x as i64)),
        (SettingKind::Float, Dataset::Float(x)) => Some(Value::Float(*x)),
        (SettingKind::Float, Dataset::Int(i)) => Some(Value::Float(*i as f64)),
        (SettingKind::TextList, Dataset::TextVec(v)) => Some(Value::TextList(v.clone())),
        (SettingKind::IntegerList, Dataset::IntVec(v)) => Some(Value::IntList(v.clone())),
        (SettingKind::IntegerList, Dataset::FloatVec(v)) => {
            Some(Value::IntList(v.iter().map(|x| *x as i64).collect()))
        }
        (SettingKind::FloatList, Dataset::FloatVec(v)) => Some(Value::FloatList(v.clone())),
        (SettingKind::FloatList, Dataset::IntVec(v)) => {
            Some(Value::FloatList(v.iter().map(|i| *i as f64).collect()))
        }
        _ => None,
    };
    value.ok_or_else(|| {
        let err = Error::TypeMismatch {
            path: path.to_string(),
            expected: setting_kind_name(setting.kind()).to_string(),
            actual: dataset.kind_name().to_string(),
        };
        error!("could not read {path}: {err}");
        err
    })
}

fn setting_kind_name(kind: &SettingKind) -> &'static str {
    match kind {
        SettingKind::Text => "text",
        SettingKind::Choice(_) => "choice",
        SettingKind::Boolean => "boolean",
        SettingKind::Integer => "integer",
        SettingKind::Float => "float",
        SettingKind::TextList => "text list",
        SettingKind::IntegerList => "integer list",
        SettingKind::FloatList => "float list",
        SettingKind::Config(_) => "config",
        SettingKind::ConfigList(_) => "config list",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_group_is_idempotent() {
        let mut root = Group::new();
        ensure_group(&mut root, "/a/b/c", false).unwrap();
        ensure_group(&mut root, "/a/b/c", false).unwrap();
        assert_eq!(root.len(), 1);
        assert!(find_group(&root, "/a/b/c").is_some());
    }

    #[test]
    fn test_ensure_group_conflict_with_dataset() {
        let mut root = Group::new();
        root.insert("a", Node::Dataset(Dataset::Int(1)));
        assert!(matches!(
            ensure_group(&mut root, "/a/b", false),
            Err(Error::NotAGroup { .. })
        ));

        // force replaces the leaf with a group
        ensure_group(&mut root, "/a/b", true).unwrap();
        assert!(find_group(&root, "/a/b").is_some());
    }

    #[test]
    fn test_group_insert_replaces() {
        let mut group = Group::new();
        group.insert("x", Node::Dataset(Dataset::Int(1)));
        group.insert("x", Node::Dataset(Dataset::Int(2)));
        assert_eq!(group.len(), 1);
        assert_eq!(group.get("x"), Some(&Node::Dataset(Dataset::Int(2))));
    }

    #[test]
    fn test_coerce_truthy_scalar_to_bool() {
        let s = Setting::boolean("alive");
        assert_eq!(
            coerce_dataset(&s, &Dataset::Int(1), "/alive").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            coerce_dataset(&s, &Dataset::Int(0), "/alive").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_coerce_text_dataset_normalizes_sentinels() {
        let s = Setting::integer("daisies");
        assert_eq!(
            coerce_dataset(&s, &Dataset::Text("None".into()), "/daisies").unwrap(),
            Value::None
        );
    }

    #[test]
    fn test_coerce_mismatch_is_an_error() {
        let s = Setting::integer_list("claws");
        assert!(matches!(
            coerce_dataset(&s, &Dataset::Bool(true), "/claws"),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
