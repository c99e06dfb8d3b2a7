//! Package bootstrap configuration
//!
//! Wires a package-wide config file to the `log` facade. The config file is
//! discovered by probing an ordered list of candidate path stems (user,
//! system, distribution) across the known backend extensions; the first
//! existing file wins. Without one, the highest-priority backend pointed at
//! the highest-priority path is used (and only persisted on first load).

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use log::{LevelFilter, debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::setting::{Schema, Setting};
use crate::storage::{Storage, TreeStorage, YamlStorage};
use crate::value::Value;

fn package_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new(vec![
            Setting::choice(
                "log-level",
                vec![
                    ("error", Value::Text("error".into())),
                    ("warn", Value::Text("warn".into())),
                    ("info", Value::Text("info".into())),
                    ("debug", Value::Text("debug".into())),
                    ("trace", Value::Text("trace".into())),
                ],
            )
            .help("Package logging level.")
            .default("warn"),
        ])
    })
}

/// Package-level configuration: a small schema (currently the log level)
/// backed by a config file discovered on the filesystem.
pub struct PackageConfig {
    package: String,
    search_stems: Vec<PathBuf>,
    config: Config,
}

impl PackageConfig {
    /// Bootstrap config for a package, probing the standard locations:
    /// the user config directory, `/etc/<package>/config`, and
    /// `/usr/share/<package>/config`.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        let package = package.into();
        let mut stems = Vec::new();
        if let Some(user) = dirs::config_dir() {
            stems.push(user.join(&package));
        }
        stems.push(PathBuf::from("/etc").join(&package).join("config"));
        stems.push(PathBuf::from("/usr/share").join(&package).join("config"));
        Self::with_search_stems(package, stems)
    }

    /// Bootstrap config with explicit candidate path stems, highest
    /// priority first. Each stem is tried with every backend extension.
    #[must_use]
    pub fn with_search_stems(package: impl Into<String>, search_stems: Vec<PathBuf>) -> Self {
        Self {
            package: package.into(),
            search_stems,
            config: Config::new(package_schema()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Candidate config files in priority order: stems outrank extensions.
    #[must_use]
    pub fn candidate_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for stem in &self.search_stems {
            for extension in [TreeStorage::EXTENSION, YamlStorage::EXTENSION] {
                files.push(stem.with_extension(extension));
            }
        }
        files
    }

    fn storage_for(path: &PathBuf) -> Arc<dyn Storage> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(YamlStorage::EXTENSION) => Arc::new(YamlStorage::new(path)),
            _ => Arc::new(TreeStorage::new(path)),
        }
    }

    /// Scan the filesystem for the best config file, load it, and apply it.
    ///
    /// If no candidate exists, the highest-priority backend at the
    /// highest-priority stem is attached instead; its first load leaves a
    /// stub file behind.
    ///
    /// # Errors
    ///
    /// Load or conversion failures from the chosen backend.
    pub fn load_system(&mut self) -> Result<()> {
        info!("looking for {} config file", self.package);
        for path in self.candidate_files() {
            if path.exists() {
                info!("config file found at {}", path.display());
                self.config.set_storage(Self::storage_for(&path));
                self.config.load(false)?;
                return self.setup();
            }
            debug!("no config file at {}", path.display());
        }
        let path = match self.search_stems.first() {
            Some(stem) => stem.with_extension(TreeStorage::EXTENSION),
            None => PathBuf::from(format!("{}.{}", self.package, TreeStorage::EXTENSION)),
        };
        info!("new config file at {}", path.display());
        self.config.set_storage(Self::storage_for(&path));
        self.config.load(false)?;
        self.setup()
    }

    /// Apply the loaded settings: set the process log level and report.
    ///
    /// # Errors
    ///
    /// Dump conversion failures.
    pub fn setup(&self) -> Result<()> {
        let level = match self.config.get("log-level").and_then(Value::as_text) {
            Some("error") => LevelFilter::Error,
            Some("info") => LevelFilter::Info,
            Some("debug") => LevelFilter::Debug,
            Some("trace") => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        };
        log::set_max_level(level);
        info!(
            "setup {} package config:\n{}",
            self.package,
            self.config.dump(false)?
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
