//! Declarative config schema: a tree of typed fields with defaults.
//!
//! The schema carries no I/O and no resolution logic; [`crate::resolve`]
//! interprets it.

use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// Expected JSON kind of a config value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    /// A nested object with its own sub-schema.
    Object(Schema),
}

impl FieldKind {
    /// Whether `value` has this kind. Nested objects only check the outer kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Object(_) => value.is_object(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Object(_) => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the JSON kind of an arbitrary value (for diagnostics).
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Field spec
// ---------------------------------------------------------------------------

/// One recognised option.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Default for scalar kinds. Object kinds derive theirs from the sub-schema.
    pub default: Option<Value>,
    /// Startup fails when a required field has no value of the right kind.
    pub required: bool,
    /// Secret values coming from overrides are never written to disk.
    pub secret: bool,
}

impl FieldSpec {
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::scalar(name, FieldKind::String, Some(Value::String(default.into())))
    }

    pub fn number(name: impl Into<String>, default: impl Into<serde_json::Number>) -> Self {
        Self::scalar(name, FieldKind::Number, Some(Value::Number(default.into())))
    }

    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self::scalar(name, FieldKind::Object(schema), None)
    }

    /// A required string with no default (e.g. the bot token).
    pub fn required_string(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::scalar(name, FieldKind::String, None)
        }
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn scalar(name: impl Into<String>, kind: FieldKind, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
            required: false,
            secret: false,
        }
    }

    /// The value used when nothing valid was supplied, if any.
    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            FieldKind::Object(sub) => Some(sub.defaults()),
            _ => self.default.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered set of fields describing one config object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Object holding every default this schema declares (recursively).
    pub fn defaults(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            if let Some(value) = field.default_value() {
                map.insert(field.name.clone(), value);
            }
        }
        Value::Object(map)
    }

    /// Whether the top-level field `name` is marked secret.
    pub fn is_secret(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.secret)
    }
}

// ---------------------------------------------------------------------------
// Bot schema
// ---------------------------------------------------------------------------

pub const DEFAULT_BOT_NAME: &str = "tavern";
pub const DEFAULT_PREFIX: &str = "!";

pub const DEFAULT_COLOR_SUCCESS: &str = "#41b95f";
pub const DEFAULT_COLOR_NEUTRAL: &str = "#287db4";
pub const DEFAULT_COLOR_WARNING: &str = "#ff7100";
pub const DEFAULT_COLOR_ERROR: &str = "#c63737";

/// Schema every bot config is resolved against.
pub fn bot_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::required_string("token").secret())
        .field(FieldSpec::string("name", DEFAULT_BOT_NAME))
        .field(FieldSpec::string("prefix", DEFAULT_PREFIX))
        .field(FieldSpec::object(
            "defaultColors",
            Schema::new()
                .field(FieldSpec::string("success", DEFAULT_COLOR_SUCCESS))
                .field(FieldSpec::string("neutral", DEFAULT_COLOR_NEUTRAL))
                .field(FieldSpec::string("warning", DEFAULT_COLOR_WARNING))
                .field(FieldSpec::string("error", DEFAULT_COLOR_ERROR)),
        ))
}
