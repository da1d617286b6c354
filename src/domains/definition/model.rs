//! Definition tree types.
//!
//! A [`Definition`] is an immutable mapping from property names to [`Value`]s.
//! Values are literals, nested definitions, or references to be followed by
//! the visitor at resolution time.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix that marks a string value as a reference.
const REFERENCE_PREFIX: char = '$';

/// Namespace for environment-variable references (`$env.NAME`).
const ENV_NAMESPACE: &str = "env.";

/// A pointer to a value that lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// `$name`: a root-level property of the same document.
    Property(String),

    /// `$env.NAME`: a process environment variable.
    Env(String),
}

impl Reference {
    /// Parse a reference from a raw document string.
    ///
    /// Returns `None` when the string is not a reference: it does not start
    /// with `$`, is a bare `$`, or is escaped as `$$...`.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.strip_prefix(REFERENCE_PREFIX)?;
        if name.is_empty() || name.starts_with(REFERENCE_PREFIX) {
            return None;
        }

        match name.strip_prefix(ENV_NAMESPACE) {
            Some(var) if !var.is_empty() => Some(Self::Env(var.to_string())),
            _ => Some(Self::Property(name.to_string())),
        }
    }

    /// The name being referenced, without the namespace.
    pub fn name(&self) -> &str {
        match self {
            Self::Property(name) | Self::Env(name) => name,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => write!(f, "${name}"),
            Self::Env(var) => write!(f, "${ENV_NAMESPACE}{var}"),
        }
    }
}

/// A property value inside a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar or list, used as-is.
    Literal(serde_json::Value),

    /// A nested definition that must be resolved through the registry.
    Definition(Definition),

    /// A reference followed by the visitor.
    Reference(Reference),
}

impl Value {
    /// Convert a parsed document value, attaching `source` to every nested
    /// definition.
    pub fn from_json(json: serde_json::Value, source: &Arc<PathBuf>) -> Self {
        match json {
            serde_json::Value::Object(map) => {
                Self::Definition(Definition::from_json_map(map, Arc::clone(source)))
            }
            serde_json::Value::String(raw) => match Reference::parse(&raw) {
                Some(reference) => Self::Reference(reference),
                None => Self::Literal(serde_json::Value::String(unescape(raw))),
            },
            other => Self::Literal(other),
        }
    }

    /// Shorthand for a literal string.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(serde_json::Value::String(value.into()))
    }

    /// The value in its document form. References are rendered back to
    /// their `$` syntax and literal strings starting with `$` are escaped.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Literal(serde_json::Value::String(s)) if s.starts_with(REFERENCE_PREFIX) => {
                serde_json::Value::String(format!("{REFERENCE_PREFIX}{s}"))
            }
            Self::Literal(value) => value.clone(),
            Self::Definition(definition) => definition.to_json(),
            Self::Reference(reference) => serde_json::Value::String(reference.to_string()),
        }
    }

    /// The value as data: literal strings without their escape, references
    /// in their `$` syntax.
    pub fn to_literal_json(&self) -> serde_json::Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Definition(definition) => definition.to_literal_json(),
            Self::Reference(reference) => serde_json::Value::String(reference.to_string()),
        }
    }

    /// Short description of the value's shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(value) => json_kind(value),
            Self::Definition(_) => "definition",
            Self::Reference(_) => "reference",
        }
    }
}

/// Drop the escaping `$` from `$$...` strings.
fn unescape(raw: String) -> String {
    if raw.starts_with("$$") {
        raw[1..].to_string()
    } else {
        raw
    }
}

/// Describe the shape of a JSON value.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A node of the definition tree.
///
/// Properties are kept sorted so that telltale scans and diagnostics are
/// deterministic. The `source` is the document the node was parsed from and
/// is shared by every node of that document.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    properties: BTreeMap<String, Value>,
    source: Arc<PathBuf>,
}

impl Definition {
    /// Create an empty definition originating from `source`.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            properties: BTreeMap::new(),
            source: Arc::new(source.into()),
        }
    }

    /// Build a definition from a parsed mapping.
    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>, source: Arc<PathBuf>) -> Self {
        let properties = map
            .into_iter()
            .map(|(name, value)| {
                let value = Value::from_json(value, &source);
                (name, value)
            })
            .collect();

        Self { properties, source }
    }

    /// Return a copy with `name` set to `value`.
    ///
    /// Nested definitions keep their own source.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Look up a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Whether the definition carries `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Property names in sorted order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The document this definition was parsed from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The definition in its document form.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.properties
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn to_literal_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.properties
                .iter()
                .map(|(name, value)| (name.clone(), value.to_literal_json()))
                .collect(),
        )
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
