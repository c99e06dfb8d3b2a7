//! Flat YAML backend
//!
//! Maps a [`Config`] onto a nested YAML document that mirrors the config
//! shape: top-level keys are setting names, nested configs become nested
//! mappings, and config lists become sequences of mappings. Scalar and list
//! settings store their native values; booleans are written as the `yes`/`no`
//! tokens rather than YAML's own boolean literals, and read back through the
//! settings' text conversion.
//!
//! A missing file is created empty on load and treated as "no data"; an
//! empty or all-null document clears nothing. A document key with no
//! matching setting is a hard error.

use std::path::PathBuf;

use log::debug;
use serde_yaml::{Mapping, Value as Yaml};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::setting::{Setting, SettingKind};
use crate::storage::{Storage, create_basedir, write_file};
use crate::value::Value;

/// Storage backend persisting configs as a single YAML document.
#[derive(Debug, Clone)]
pub struct YamlStorage {
    path: PathBuf,
}

impl YamlStorage {
    /// File extension used for YAML files
    pub const EXTENSION: &'static str = "yaml";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Render a config as a YAML mapping without touching disk
    ///
    /// # Errors
    ///
    /// Conversion failures from the settings' text rendering.
    pub fn to_document(config: &Config) -> Result<Yaml> {
        let mut mapping = Mapping::new();
        for setting in config.schema().settings() {
            let name = setting.name();
            let Some(value) = config.get(name) else {
                continue;
            };
            let rendered = render_value(setting, value)?;
            mapping.insert(Yaml::String(name.to_string()), rendered);
        }
        Ok(Yaml::Mapping(mapping))
    }

    /// Apply a YAML mapping onto a config. Missing keys leave the current
    /// values in place; unknown keys are a hard error.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownSetting`] for keys without a schema entry, plus any
    /// conversion failure.
    pub fn from_document(config: &mut Config, document: &Yaml) -> Result<()> {
        let Yaml::Mapping(mapping) = document else {
            return Err(Error::Parse(
                "YAML document root is not a mapping".to_string(),
            ));
        };
        let schema = config.schema().clone();
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                return Err(Error::Parse(format!(
                    "YAML document key {key:?} is not a string"
                )));
            };
            let setting = schema
                .get(name)
                .ok_or_else(|| Error::UnknownSetting(name.to_string()))?;
            let native = absorb_value(setting, value)?;
            config.set(name, native)?;
        }
        Ok(())
    }
}

impl Storage for YamlStorage {
    fn load(&self, config: &mut Config, merge: bool) -> Result<()> {
        if merge {
            config.clear();
        }
        if !self.path.exists() {
            // first use: leave an empty file behind, nothing to read
            debug!("creating empty config file {}", self.path.display());
            create_basedir(&self.path)?;
            write_file(&self.path, b"")?;
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| Error::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(());
        }
        let document: Yaml = serde_yaml::from_str(&content)?;
        if document.is_null() {
            return Ok(());
        }
        YamlStorage::from_document(config, &document)
    }

    fn save(&self, config: &mut Config, merge: bool) -> Result<()> {
        if merge {
            config.clear();
        }
        let document = YamlStorage::to_document(config)?;
        let text = serde_yaml::to_string(&document)?;
        write_file(&self.path, text.as_bytes())
    }

    fn clear(&self) -> Result<()> {
        write_file(&self.path, b"")
    }
}

// =============================================================================
// Config <-> Document Mapping
// =============================================================================

fn render_value(setting: &Setting, value: &Value) -> Result<Yaml> {
    let rendered = match (setting.kind(), value) {
        // booleans keep the yes/no tokens instead of YAML's true/false
        (SettingKind::Boolean, Value::Bool(_)) => {
            Yaml::String(setting.convert_to_text(value)?)
        }
        (SettingKind::Integer, Value::Int(i)) => Yaml::Number((*i).into()),
        (SettingKind::Float, Value::Float(x)) => Yaml::Number((*x).into()),
        (SettingKind::Float, Value::Int(i)) => Yaml::Number((*i).into()),
        (
            SettingKind::Boolean | SettingKind::Integer | SettingKind::Float,
            Value::None,
        ) => Yaml::Null,

        (SettingKind::TextList, Value::TextList(v)) => {
            Yaml::Sequence(v.iter().map(|s| Yaml::String(s.clone())).collect())
        }
        (SettingKind::IntegerList, Value::IntList(v)) => {
            Yaml::Sequence(v.iter().map(|i| Yaml::Number((*i).into())).collect())
        }
        (SettingKind::FloatList, Value::FloatList(v)) => {
            Yaml::Sequence(v.iter().map(|x| Yaml::Number((*x).into())).collect())
        }
        (
            SettingKind::TextList | SettingKind::IntegerList | SettingKind::FloatList,
            Value::None,
        ) => Yaml::Null,

        (SettingKind::Config(_), Value::Config(child)) => YamlStorage::to_document(child)?,
        (SettingKind::ConfigList(_), Value::ConfigList(children)) if !children.is_empty() => {
            let documents: Result<Vec<Yaml>> =
                children.iter().map(YamlStorage::to_document).collect();
            Yaml::Sequence(documents?)
        }

        // everything else (text, choice, unset nested) through the text form
        _ => Yaml::String(setting.convert_to_text(value)?),
    };
    Ok(rendered)
}

fn absorb_value(setting: &Setting, value: &Yaml) -> Result<Value> {
    // textual values always route through the setting's own conversion,
    // normalizing sentinel forms like "None" and the yes/no tokens
    if let Yaml::String(text) = value {
        return setting.convert_from_text(text);
    }
    match (setting.kind(), value) {
        (SettingKind::Boolean, Yaml::Bool(b)) => Ok(Value::Bool(*b)),
        (SettingKind::Integer, Yaml::Number(n)) => {
            n.as_i64().map(Value::Int).ok_or_else(|| {
                Error::Parse(format!(
                    "number {n} is not an integer for setting '{}'",
                    setting.name()
                ))
            })
        }
        (SettingKind::Float, Yaml::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| Error::Parse(format!("unreadable number for '{}'", setting.name()))),
        (
            SettingKind::Boolean
            | SettingKind::Integer
            | SettingKind::Float
            | SettingKind::Text
            | SettingKind::TextList
            | SettingKind::IntegerList
            | SettingKind::FloatList,
            Yaml::Null,
        ) => Ok(Value::None),

        (SettingKind::TextList, Yaml::Sequence(seq)) => {
            let elements: Result<Vec<String>> = seq
                .iter()
                .map(|e| match e {
                    Yaml::String(s) => Ok(s.clone()),
                    other => Err(element_error(setting, other)),
                })
                .collect();
            Ok(Value::TextList(elements?))
        }
        (SettingKind::IntegerList, Yaml::Sequence(seq)) => {
            let elements: Result<Vec<i64>> = seq
                .iter()
                .map(|e| {
                    e.as_i64().ok_or_else(|| element_error(setting, e))
                })
                .collect();
            Ok(Value::IntList(elements?))
        }
        (SettingKind::FloatList, Yaml::Sequence(seq)) => {
            let elements: Result<Vec<f64>> = seq
                .iter()
                .map(|e| {
                    e.as_f64().ok_or_else(|| element_error(setting, e))
                })
                .collect();
            Ok(Value::FloatList(elements?))
        }

        (SettingKind::Config(_), Yaml::Mapping(m)) if !m.is_empty() => {
            let schema = setting.nested_schema()?;
            let mut child = Config::new(schema);
            YamlStorage::from_document(&mut child, value)?;
            Ok(Value::Config(Box::new(child)))
        }
        (SettingKind::Config(_), Yaml::Mapping(_) | Yaml::Null) => Ok(Value::None),

        (SettingKind::ConfigList(_), Yaml::Sequence(seq)) => {
            let schema = setting.nested_schema()?;
            let mut children = Vec::with_capacity(seq.len());
            for element in seq {
                let mut child = Config::new(schema);
                YamlStorage::from_document(&mut child, element)?;
                children.push(child);
            }
            Ok(Value::ConfigList(children))
        }
        (SettingKind::ConfigList(_), Yaml::Null) => Ok(Value::ConfigList(Vec::new())),

        (SettingKind::Choice(_), Yaml::Null) => Err(Error::UnknownChoiceToken {
            setting: setting.name().to_string(),
            token: "null".to_string(),
        }),
        (SettingKind::Choice(_), Yaml::Number(n)) => setting.convert_from_text(&n.to_string()),

        _ => Err(Error::Parse(format!(
            "document value {value:?} does not fit setting '{}'",
            setting.name()
        ))),
    }
}

fn element_error(setting: &Setting, element: &Yaml) -> Error {
    Error::Parse(format!(
        "list element {element:?} does not fit setting '{}'",
        setting.name()
    ))
}

// =============================================================================
// Tests
// =============================================================================
