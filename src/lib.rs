//! # conftree - Schema-Driven Configuration
//!
//! A library for declaring typed configuration schemas and persisting the
//! resulting configs through interchangeable storage backends.
//!
//! ## Features
//!
//! - **Setting descriptors**: text, choice, boolean, numeric, list, and
//!   nested-config settings, each with a deterministic text conversion
//! - **Schema-bound configs**: ordered fixed-key containers populated from
//!   deep-copied defaults, with recursive dump and selection helpers
//! - **Hierarchical backend**: configs mapped onto a tree of named groups
//!   with typed leaf datasets; nested configs become sub-groups, config
//!   lists become numerically indexed sub-groups
//! - **Flat backend**: configs mapped onto a nested YAML document, with
//!   booleans rendered as `yes`/`no` tokens
//! - **Additive loading**: fields absent from the persisted data keep their
//!   in-memory values; a missing or empty file is "no data", not an error
//! - **Package bootstrap**: config-file discovery over an ordered search
//!   path, wired to the `log` facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use conftree::{Config, Schema, Setting, YamlStorage};
//!
//! # fn example() -> conftree::Result<()> {
//! let schema = Schema::new(vec![
//!     Setting::text("name").help("Display name."),
//!     Setting::boolean("alive").help("Still kicking."),
//! ]);
//!
//! let storage = Arc::new(YamlStorage::new("parrot.yaml"));
//! let mut config = Config::with_storage(&schema, storage);
//! config.set("alive", true)?;
//! config.save(false)?;
//!
//! config.clear();
//! config.load(false)?;
//! assert_eq!(config.get("alive").and_then(|v| v.as_bool()), Some(true));
//! # Ok(())
//! # }
//! ```
//!
//! ## Nested and Self-Referential Schemas
//!
//! Settings can nest whole configs, including instances of the enclosing
//! schema, through two-phase [`SchemaRef`] binding:
//!
//! ```rust
//! use conftree::{Schema, SchemaRef, Setting};
//!
//! let nested = SchemaRef::deferred();
//! let schema = Schema::new(vec![
//!     Setting::text("name"),
//!     Setting::config("spouse", nested.clone()),
//!     Setting::config_list("children", nested.clone()),
//! ]);
//! nested.bind(&schema);
//! ```
//!
//! ## Merge Semantics
//!
//! `load(merge = true)` and `save(merge = true)` reset the config to its
//! defaults before the operation. This is a full reset, not a field-wise
//! union.

// Core modules
mod config;
mod error;
mod setting;
mod value;

// Grouped modules
pub mod bootstrap;
pub mod storage;

// Re-exports from core
pub use config::Config;
pub use error::{Error, Result};
pub use setting::{Schema, SchemaRef, Setting, SettingKind};
pub use value::Value;

// Storage re-exports
pub use storage::{Dataset, Group, Node, Storage, TreeFile, TreeStorage, YamlStorage};

// Bootstrap re-export
pub use bootstrap::PackageConfig;
