//! Dynamic value type shared by settings, configs, and storage backends
//!
//! Every value a [`Config`](crate::Config) can hold is one of a closed set of
//! variants. Backends dispatch on the setting kind rather than on the value,
//! so a `Value` never carries its own schema information.

use crate::config::Config;

/// A single configuration value.
///
/// `None` doubles as the "unset" sentinel: numeric settings render it as the
/// text `None`, text settings as the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Unset / no value
    #[default]
    None,
    /// Free-form text
    Text(String),
    /// Boolean toggle
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Ordered list of text elements
    TextList(Vec<String>),
    /// Ordered list of integers
    IntList(Vec<i64>),
    /// Ordered list of floats
    FloatList(Vec<f64>),
    /// Nested configuration
    Config(Box<Config>),
    /// Ordered list of nested configurations
    ConfigList(Vec<Config>),
}

impl Value {
    /// Short variant name, used in type-mismatch errors
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::TextList(_) => "text list",
            Value::IntList(_) => "int list",
            Value::FloatList(_) => "float list",
            Value::Config(_) => "config",
            Value::ConfigList(_) => "config list",
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// True for `None`, empty lists, and empty config lists.
    ///
    /// Backends use this to decide between a typed leaf and the textual
    /// "unset" placeholder.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            Value::None => true,
            Value::TextList(v) => v.is_empty(),
            Value::IntList(v) => v.is_empty(),
            Value::FloatList(v) => v.is_empty(),
            Value::ConfigList(v) => v.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Value::Config(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_config_mut(&mut self) -> Option<&mut Config> {
        match self {
            Value::Config(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_config_list(&self) -> Option<&[Config]> {
        match self {
            Value::ConfigList(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_config_list_mut(&mut self) -> Option<&mut Vec<Config>> {
        match self {
            Value::ConfigList(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::TextList(v) => write!(f, "{}", v.join(",")),
            Value::IntList(v) => {
                let parts: Vec<String> = v.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::FloatList(v) => {
                let parts: Vec<String> = v.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Config(_) => write!(f, "<config>"),
            Value::ConfigList(v) => write!(f, "<{} configs>", v.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::TextList(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatList(v)
    }
}

impl From<Config> for Value {
    fn from(c: Config) -> Self {
        Value::Config(Box::new(c))
    }
}

impl From<Vec<Config>> for Value {
    fn from(v: Vec<Config>) -> Self {
        Value::ConfigList(v)
    }
}
