//! Setting descriptors and schemas
//!
//! A [`Setting`] is an immutable descriptor for one named, typed
//! configuration field: its name, help text, default value, and a
//! [`SettingKind`] that fixes the conversion contract between the native
//! [`Value`] and its text form. A [`Schema`] is an ordered, shared list of
//! settings; [`Config`](crate::Config) instances are populated from it.
//!
//! Nested settings point at their child schema through a [`SchemaRef`],
//! which supports two-phase binding so a schema can nest instances of
//! itself.

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::value::Value;

// =============================================================================
// Setting Kinds
// =============================================================================

/// Closed set of setting kinds.
///
/// Backends dispatch over this tag; there is no open subclassing.
#[derive(Debug, Clone)]
pub enum SettingKind {
    /// Free-form text; empty text and `None` are interchangeable
    Text,
    /// One of an ordered list of `(token, value)` pairs
    Choice(Vec<(String, Value)>),
    /// `yes` / `no` toggle
    Boolean,
    /// Integer scalar; text `None` or empty means unset
    Integer,
    /// Float scalar; text `None` or empty means unset
    Float,
    /// Comma-joined list of text elements
    TextList,
    /// Comma-joined list of integers
    IntegerList,
    /// Comma-joined list of floats
    FloatList,
    /// Single nested configuration
    Config(SchemaRef),
    /// Ordered list of nested configurations
    ConfigList(SchemaRef),
}

const BOOLEAN_TOKENS: [(&str, bool); 2] = [("yes", true), ("no", false)];

// =============================================================================
// Setting
// =============================================================================

/// Immutable descriptor for one named, typed setting.
#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    help: String,
    default: Value,
    kind: SettingKind,
}

impl Setting {
    fn new(name: impl Into<String>, kind: SettingKind, default: Value) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            default,
            kind,
        }
    }

    /// Free-form text setting, default unset
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::Text, Value::None)
    }

    /// Enumerated setting over ordered `(token, value)` pairs.
    ///
    /// Unless an explicit default is given, the first pair's value becomes
    /// the default — except when some pair maps to `None`, in which case
    /// the default stays unset.
    pub fn choice(name: impl Into<String>, choices: Vec<(&str, Value)>) -> Self {
        let choices: Vec<(String, Value)> = choices
            .into_iter()
            .map(|(token, value)| (token.to_string(), value))
            .collect();
        let default = if choices.iter().any(|(_, v)| v.is_none()) {
            Value::None
        } else {
            choices.first().map(|(_, v)| v.clone()).unwrap_or_default()
        };
        Self::new(name, SettingKind::Choice(choices), default)
    }

    /// `yes`/`no` toggle, default `false`
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::Boolean, Value::Bool(false))
    }

    /// Integer setting, default `1`
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::Integer, Value::Int(1))
    }

    /// Float setting, default `1.0`
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::Float, Value::Float(1.0))
    }

    /// List-of-text setting, default empty
    pub fn text_list(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::TextList, Value::TextList(Vec::new()))
    }

    /// List-of-integers setting, default empty
    pub fn integer_list(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::IntegerList, Value::IntList(Vec::new()))
    }

    /// List-of-floats setting, default empty
    pub fn float_list(name: impl Into<String>) -> Self {
        Self::new(name, SettingKind::FloatList, Value::FloatList(Vec::new()))
    }

    /// Nested configuration setting, default unset
    pub fn config(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self::new(name, SettingKind::Config(schema), Value::None)
    }

    /// List-of-configurations setting, default empty
    pub fn config_list(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self::new(
            name,
            SettingKind::ConfigList(schema),
            Value::ConfigList(Vec::new()),
        )
    }

    /// Set the help text
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Override the default value
    #[must_use]
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    #[must_use]
    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    /// Child schema for nested-config kinds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaUnbound`] if the reference was deferred and
    /// never bound, and [`Error::SettingNotFound`] for non-nested kinds.
    pub fn nested_schema(&self) -> Result<&Schema> {
        match &self.kind {
            SettingKind::Config(r) | SettingKind::ConfigList(r) => r
                .get()
                .ok_or_else(|| Error::SchemaUnbound(self.name.clone())),
            _ => Err(Error::SettingNotFound(self.name.clone())),
        }
    }

    /// Human-readable summary: help text, default, and valid tokens for
    /// choice-family settings.
    #[must_use]
    pub fn help_text(&self) -> String {
        let default_text = self.convert_to_text(&self.default).unwrap_or_default();
        let mut out = format!("{}  Default: {}.", self.help, default_text)
            .trim()
            .to_string();
        match &self.kind {
            SettingKind::Choice(choices) => {
                let tokens: Vec<&str> = choices.iter().map(|(t, _)| t.as_str()).collect();
                out = format!("{}  Choices: {}", out, tokens.join(", "));
            }
            SettingKind::Boolean => {
                out = format!("{out}  Choices: yes, no");
            }
            _ => {}
        }
        out.trim().to_string()
    }

    // -------------------------------------------------------------------------
    // Text Conversion
    // -------------------------------------------------------------------------

    /// Convert a native value to its text form.
    ///
    /// Pure and deterministic. For the choice family this matches by value
    /// equality, never by identity.
    ///
    /// # Errors
    ///
    /// [`Error::NoMatchingChoice`] when a choice-family value equals none of
    /// the configured pairs; [`Error::Parse`] when the value's variant does
    /// not fit the setting kind.
    pub fn convert_to_text(&self, value: &Value) -> Result<String> {
        match (&self.kind, value) {
            (SettingKind::Text, Value::None) => Ok(String::new()),
            (SettingKind::Text, Value::Text(s)) => Ok(s.clone()),

            (SettingKind::Choice(choices), v) => choices
                .iter()
                .find(|(_, cv)| cv == v)
                .map(|(token, _)| token.clone())
                .ok_or_else(|| Error::NoMatchingChoice {
                    setting: self.name.clone(),
                    value: v.to_string(),
                }),

            (SettingKind::Boolean, v) => BOOLEAN_TOKENS
                .iter()
                .find(|(_, b)| Value::Bool(*b) == *v)
                .map(|(token, _)| (*token).to_string())
                .ok_or_else(|| Error::NoMatchingChoice {
                    setting: self.name.clone(),
                    value: v.to_string(),
                }),

            (SettingKind::Integer | SettingKind::Float, Value::None) => Ok("None".to_string()),
            (SettingKind::Integer, Value::Int(i)) => Ok(i.to_string()),
            (SettingKind::Float, Value::Float(x)) => Ok(x.to_string()),
            (SettingKind::Float, Value::Int(i)) => Ok(i.to_string()),

            (SettingKind::TextList, Value::None) => Ok(String::new()),
            (SettingKind::TextList, Value::TextList(v)) => Ok(v.join(",")),
            (SettingKind::IntegerList, Value::None) => Ok(String::new()),
            (SettingKind::IntegerList, Value::IntList(v)) => {
                let parts: Vec<String> = v.iter().map(ToString::to_string).collect();
                Ok(parts.join(","))
            }
            (SettingKind::FloatList, Value::None) => Ok(String::new()),
            (SettingKind::FloatList, Value::FloatList(v)) => {
                let parts: Vec<String> = v.iter().map(ToString::to_string).collect();
                Ok(parts.join(","))
            }

            // Placeholder text for unset nested settings
            (SettingKind::Config(_), Value::None) => Ok(String::new()),
            (SettingKind::ConfigList(_), Value::None) => Ok(String::new()),
            (SettingKind::ConfigList(_), Value::ConfigList(v)) if v.is_empty() => {
                Ok(String::new())
            }

            (_, v) => Err(Error::Parse(format!(
                "cannot render {} value for setting '{}'",
                v.kind_name(),
                self.name
            ))),
        }
    }

    /// Convert a text form back to a native value.
    ///
    /// For the numeric and list families, `""` and `"None"` are sentinels
    /// (unset and the empty list respectively), never errors. Splitting a
    /// list on commas keeps interior whitespace; only the integer and float
    /// element converters trim before parsing.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownChoiceToken`] for unmapped choice-family tokens;
    /// [`Error::Parse`] for unparseable numeric elements.
    pub fn convert_from_text(&self, text: &str) -> Result<Value> {
        match &self.kind {
            SettingKind::Text => {
                if text.is_empty() {
                    Ok(Value::None)
                } else {
                    Ok(Value::Text(text.to_string()))
                }
            }

            SettingKind::Choice(choices) => choices
                .iter()
                .find(|(token, _)| token == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| Error::UnknownChoiceToken {
                    setting: self.name.clone(),
                    token: text.to_string(),
                }),

            SettingKind::Boolean => BOOLEAN_TOKENS
                .iter()
                .find(|(token, _)| *token == text)
                .map(|(_, b)| Value::Bool(*b))
                .ok_or_else(|| Error::UnknownChoiceToken {
                    setting: self.name.clone(),
                    token: text.to_string(),
                }),

            SettingKind::Integer => {
                if text.is_empty() || text == "None" {
                    return Ok(Value::None);
                }
                self.parse_int(text).map(Value::Int)
            }
            SettingKind::Float => {
                if text.is_empty() || text == "None" {
                    return Ok(Value::None);
                }
                self.parse_float(text).map(Value::Float)
            }

            SettingKind::TextList => {
                if text.is_empty() || text == "None" {
                    return Ok(Value::TextList(Vec::new()));
                }
                Ok(Value::TextList(
                    text.split(',').map(str::to_string).collect(),
                ))
            }
            SettingKind::IntegerList => {
                if text.is_empty() || text == "None" {
                    return Ok(Value::IntList(Vec::new()));
                }
                let elements: Result<Vec<i64>> =
                    text.split(',').map(|e| self.parse_int(e)).collect();
                Ok(Value::IntList(elements?))
            }
            SettingKind::FloatList => {
                if text.is_empty() || text == "None" {
                    return Ok(Value::FloatList(Vec::new()));
                }
                let elements: Result<Vec<f64>> =
                    text.split(',').map(|e| self.parse_float(e)).collect();
                Ok(Value::FloatList(elements?))
            }

            SettingKind::Config(_) => {
                if text.is_empty() || text == "None" {
                    Ok(Value::None)
                } else {
                    Err(Error::Parse(format!(
                        "nested setting '{}' cannot be built from text '{text}'",
                        self.name
                    )))
                }
            }
            SettingKind::ConfigList(_) => {
                if text.is_empty() || text == "None" {
                    Ok(Value::ConfigList(Vec::new()))
                } else {
                    Err(Error::Parse(format!(
                        "nested setting '{}' cannot be built from text '{text}'",
                        self.name
                    )))
                }
            }
        }
    }

    fn parse_int(&self, text: &str) -> Result<i64> {
        text.trim().parse().map_err(|_| {
            Error::Parse(format!(
                "invalid integer '{text}' for setting '{}'",
                self.name
            ))
        })
    }

    fn parse_float(&self, text: &str) -> Result<f64> {
        text.trim().parse().map_err(|_| {
            Error::Parse(format!(
                "invalid float '{text}' for setting '{}'",
                self.name
            ))
        })
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Immutable ordered list of settings, shared read-only across all configs
/// built from it.
#[derive(Debug, Clone)]
pub struct Schema {
    settings: Arc<[Setting]>,
}

impl Schema {
    /// Build a schema from an ordered list of settings.
    ///
    /// # Panics
    ///
    /// Panics if two settings share a name; schemas are definition-time
    /// constants and a duplicate is a programming error.
    #[must_use]
    pub fn new(settings: Vec<Setting>) -> Self {
        for (i, s) in settings.iter().enumerate() {
            assert!(
                !settings[..i].iter().any(|other| other.name == s.name),
                "duplicate setting name '{}' in schema",
                s.name
            );
        }
        Self {
            settings: settings.into(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.settings.iter().position(|s| s.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Pointer identity: two configs share a schema only if they were built
    /// from the same `Schema` value.
    #[must_use]
    pub fn same_as(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.settings, &other.settings)
    }
}

// =============================================================================
// SchemaRef
// =============================================================================

/// Two-phase reference to a nested schema.
///
/// A schema that nests itself cannot name its own `Schema` value while the
/// setting list is still being declared. `SchemaRef::deferred()` gives an
/// unbound reference to use in the declaration; call [`SchemaRef::bind`]
/// once the enclosing schema exists.
///
/// ```
/// use conftree::{Schema, SchemaRef, Setting};
///
/// let nested = SchemaRef::deferred();
/// let schema = Schema::new(vec![
///     Setting::text("name"),
///     Setting::config_list("children", nested.clone()),
/// ]);
/// nested.bind(&schema);
/// ```
#[derive(Clone, Default)]
pub struct SchemaRef(Arc<OnceLock<Schema>>);

impl SchemaRef {
    /// An unbound reference, to be bound after the enclosing schema exists
    #[must_use]
    pub fn deferred() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    /// A reference bound immediately to a known schema
    #[must_use]
    pub fn resolved(schema: &Schema) -> Self {
        let r = Self::deferred();
        r.bind(schema);
        r
    }

    /// Bind the referenced schema. Later calls on an already-bound
    /// reference are ignored.
    pub fn bind(&self, schema: &Schema) {
        let _ = self.0.set(schema.clone());
    }

    #[must_use]
    pub fn get(&self) -> Option<&Schema> {
        self.0.get()
    }
}

impl std::fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.get() {
            Some(schema) => write!(f, "SchemaRef({} settings)", schema.len()),
            None => write!(f, "SchemaRef(deferred)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_tokens() {
        let s = Setting::boolean("alive");
        assert_eq!(s.convert_to_text(&Value::Bool(true)).unwrap(), "yes");
        assert_eq!(s.convert_to_text(&Value::Bool(false)).unwrap(), "no");
        assert_eq!(s.convert_from_text("yes").unwrap(), Value::Bool(true));
        assert_eq!(s.convert_from_text("no").unwrap(), Value::Bool(false));
        assert!(matches!(
            s.convert_from_text("anything-else"),
            Err(Error::UnknownChoiceToken { .. })
        ));
    }

    #[test]
    fn test_choice_matches_by_value_equality() {
        let s = Setting::choice(
            "species",
            vec![
                ("Norwegian Blue", Value::Int(0)),
                ("Macaw", Value::Int(1)),
            ],
        );
        assert_eq!(s.convert_to_text(&Value::Int(1)).unwrap(), "Macaw");
        assert_eq!(
            s.convert_from_text("Norwegian Blue").unwrap(),
            Value::Int(0)
        );
        assert!(matches!(
            s.convert_to_text(&Value::Int(7)),
            Err(Error::NoMatchingChoice { .. })
        ));
    }

    #[test]
    fn test_choice_default_is_first_pair() {
        let s = Setting::choice("number", vec![("one", Value::Int(1)), ("two", Value::Int(2))]);
        assert_eq!(*s.default_value(), Value::Int(1));
    }

    #[test]
    fn test_choice_default_stays_unset_when_a_pair_maps_to_none() {
        let s = Setting::choice("maybe", vec![("unset", Value::None), ("one", Value::Int(1))]);
        assert_eq!(*s.default_value(), Value::None);
    }

    #[test]
    fn test_numeric_none_sentinel() {
        let s = Setting::integer("daisies");
        assert_eq!(s.convert_to_text(&Value::None).unwrap(), "None");
        assert_eq!(s.convert_from_text("None").unwrap(), Value::None);
        assert_eq!(s.convert_from_text("").unwrap(), Value::None);
        assert_eq!(s.convert_from_text("8").unwrap(), Value::Int(8));

        let f = Setting::float("age");
        assert_eq!(f.convert_from_text("8").unwrap(), Value::Float(8.0));
        assert!(f.convert_from_text("invalid").is_err());
    }

    #[test]
    fn test_text_list_keeps_interior_whitespace() {
        let s = Setting::text_list("words");
        assert_eq!(
            s.convert_from_text("uvw, xyz").unwrap(),
            Value::TextList(vec!["uvw".into(), " xyz".into()])
        );
        assert_eq!(
            s.convert_to_text(&Value::TextList(vec!["abc".into(), "def".into()]))
                .unwrap(),
            "abc,def"
        );
    }

    #[test]
    fn test_numeric_list_elements_trim_before_parsing() {
        let s = Setting::integer_list("claws");
        assert_eq!(
            s.convert_from_text("4, -6").unwrap(),
            Value::IntList(vec![4, -6])
        );
        let f = Setting::float_list("bids");
        assert_eq!(
            f.convert_from_text("4.5, -6.7").unwrap(),
            Value::FloatList(vec![4.5, -6.7])
        );
    }

    #[test]
    fn test_empty_list_sentinels() {
        let s = Setting::integer_list("claws");
        assert_eq!(s.convert_from_text("").unwrap(), Value::IntList(vec![]));
        assert_eq!(
            s.convert_to_text(&Value::IntList(vec![])).unwrap(),
            ""
        );
        assert_eq!(
            s.convert_to_text(&Value::IntList(vec![1, 3])).unwrap(),
            "1,3"
        );
    }

    #[test]
    fn test_round_trip_all_scalar_kinds() {
        let cases: Vec<(Setting, Value)> = vec![
            (Setting::text("t"), Value::Text("hello".into())),
            (Setting::boolean("b"), Value::Bool(true)),
            (Setting::integer("i"), Value::Int(-42)),
            (Setting::float("f"), Value::Float(1.25)),
            (
                Setting::text_list("tl"),
                Value::TextList(vec!["a".into(), "b".into()]),
            ),
            (Setting::integer_list("il"), Value::IntList(vec![1, 2, 3])),
            (
                Setting::float_list("fl"),
                Value::FloatList(vec![5.4, 3.2, 1.0]),
            ),
        ];
        for (setting, value) in cases {
            let text = setting.convert_to_text(&value).unwrap();
            assert_eq!(setting.convert_from_text(&text).unwrap(), value);
        }
    }

    #[test]
    fn test_help_text() {
        let s = Setting::boolean("odd").help("The number behind my back is odd.");
        assert_eq!(
            s.help_text(),
            "The number behind my back is odd.  Default: no.  Choices: yes, no"
        );

        let bare = Setting::integer("guesses").default(2_i64);
        assert_eq!(bare.help_text(), "Default: 2.");
    }

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let result = std::panic::catch_unwind(|| {
            Schema::new(vec![Setting::text("a"), Setting::text("a")])
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_deferred_schema_ref() {
        let nested = SchemaRef::deferred();
        let schema = Schema::new(vec![
            Setting::text("name"),
            Setting::config_list("children", nested.clone()),
        ]);
        assert!(matches!(
            schema.get("children").unwrap().nested_schema(),
            Err(Error::SchemaUnbound(_))
        ));
        nested.bind(&schema);
        let child_schema = schema.get("children").unwrap().nested_schema().unwrap();
        assert!(child_schema.same_as(&schema));
    }
}
