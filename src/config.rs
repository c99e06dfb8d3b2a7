//! Schema-bound configuration container
//!
//! A [`Config`] is an ordered map from setting name to current [`Value`],
//! with exactly one entry per setting in its [`Schema`]. Values live in
//! schema order; unknown keys are rejected. A config optionally holds one
//! [`Storage`] backend, swappable at any time, through which `load` and
//! `save` run.

use std::sync::Arc;

use log::error;

use crate::error::{Error, Result};
use crate::setting::{Schema, SettingKind};
use crate::storage::Storage;
use crate::value::Value;

/// One configuration instance: a fixed key set from a schema, plus current
/// values and an optional storage backend.
#[derive(Clone)]
pub struct Config {
    schema: Schema,
    values: Vec<Value>,
    storage: Option<Arc<dyn Storage>>,
}

impl Config {
    /// Create an instance populated with deep copies of the schema defaults
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        let mut config = Self {
            schema: schema.clone(),
            values: Vec::new(),
            storage: None,
        };
        config.clear();
        config
    }

    /// Create an instance bound to a storage backend
    #[must_use]
    pub fn with_storage(schema: &Schema, storage: Arc<dyn Storage>) -> Self {
        let mut config = Self::new(schema);
        config.storage = Some(storage);
        config
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Attach or swap the storage backend
    pub fn set_storage(&mut self, storage: Arc<dyn Storage>) {
        self.storage = Some(storage);
    }

    /// Reset every field to a deep copy of its setting's default.
    ///
    /// Deep copies keep mutable defaults (lists, nested configs) from being
    /// aliased between instances.
    pub fn clear(&mut self) {
        self.values = self
            .schema
            .settings()
            .iter()
            .map(|s| s.default_value().clone())
            .collect();
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.schema.position(name).map(|i| &mut self.values[i])
    }

    /// Set a field's value.
    ///
    /// # Errors
    ///
    /// [`Error::SettingNotFound`] if the name is not in the schema.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| Error::SettingNotFound(name.to_string()))?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .settings()
            .iter()
            .zip(&self.values)
            .map(|(s, v)| (s.name(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // -------------------------------------------------------------------------
    // Storage Delegation
    // -------------------------------------------------------------------------

    /// Load from the attached storage backend.
    ///
    /// `merge = true` resets the config to defaults first, then loads — a
    /// full reset before the operation, not a field-wise union.
    ///
    /// # Errors
    ///
    /// [`Error::NoStorage`] without an attached backend; otherwise whatever
    /// the backend raises.
    pub fn load(&mut self, merge: bool) -> Result<()> {
        let storage = self.storage.clone().ok_or(Error::NoStorage)?;
        storage.load(self, merge)
    }

    /// Save to the attached storage backend.
    ///
    /// `merge = true` resets the config to defaults first, then saves.
    ///
    /// # Errors
    ///
    /// [`Error::NoStorage`] without an attached backend; otherwise whatever
    /// the backend raises.
    pub fn save(&mut self, merge: bool) -> Result<()> {
        let storage = self.storage.clone().ok_or(Error::NoStorage)?;
        storage.save(self, merge)
    }

    // -------------------------------------------------------------------------
    // Dump
    // -------------------------------------------------------------------------

    /// Render all settings and their values as text, one `name: value` line
    /// per scalar setting. Non-empty nested configs recurse with increased
    /// indentation under a `name:` header; config lists add a numeric index
    /// header per element.
    ///
    /// # Errors
    ///
    /// Conversion failures are logged and propagated, never swallowed.
    pub fn dump(&self, with_help: bool) -> Result<String> {
        let mut lines = Vec::new();
        self.dump_into(with_help, "", &mut lines)?;
        Ok(lines.join("\n"))
    }

    fn dump_into(&self, with_help: bool, prefix: &str, lines: &mut Vec<String>) -> Result<()> {
        for (setting, value) in self.schema.settings().iter().zip(&self.values) {
            let name = setting.name();
            match (setting.kind(), value) {
                (SettingKind::ConfigList(_), Value::ConfigList(configs))
                    if !configs.is_empty() =>
                {
                    lines.push(format!("{prefix}{name}:"));
                    for (i, config) in configs.iter().enumerate() {
                        lines.push(format!("{prefix}  {i}:"));
                        config.dump_into(with_help, &format!("{prefix}    "), lines)?;
                    }
                }
                (SettingKind::Config(_), Value::Config(config)) => {
                    lines.push(format!("{prefix}{name}:"));
                    config.dump_into(with_help, &format!("{prefix}  "), lines)?;
                }
                _ => {
                    let text = setting.convert_to_text(value).inspect_err(|e| {
                        error!("could not dump {name} ({value}): {e}");
                    })?;
                    let help = if with_help {
                        format!("\t({})", setting.help_text())
                    } else {
                        String::new()
                    };
                    lines.push(format!("{prefix}{name}: {text}{help}"));
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Select an element of a config-list setting by its `name` field
    ///
    /// # Errors
    ///
    /// [`Error::SettingNotFound`] when the named setting is absent or empty,
    /// [`Error::NoMatch`] when no element's `name` equals `attribute_value`.
    pub fn select_config(&self, setting_name: &str, attribute_value: &Value) -> Result<&Config> {
        self.select_config_by(setting_name, attribute_value, |config| {
            config.get("name").cloned().unwrap_or(Value::None)
        })
    }

    /// Select an element of a config-list setting by an arbitrary key
    /// function, e.g. to drill into nested fields.
    ///
    /// # Errors
    ///
    /// Same discrimination as [`Config::select_config`].
    pub fn select_config_by<F>(
        &self,
        setting_name: &str,
        attribute_value: &Value,
        get_attribute: F,
    ) -> Result<&Config>
    where
        F: Fn(&Config) -> Value,
    {
        let configs = match self.get(setting_name) {
            Some(Value::ConfigList(configs)) if !configs.is_empty() => configs,
            _ => return Err(Error::SettingNotFound(setting_name.to_string())),
        };
        configs
            .iter()
            .find(|config| get_attribute(config) == *attribute_value)
            .ok_or_else(|| Error::NoMatch {
                setting: setting_name.to_string(),
                value: attribute_value.to_string(),
            })
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.schema.same_as(&other.schema) && self.values == other.values
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.iter() {
            map.entry(&name, value);
        }
        map.finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
