//! Generic recursive resolver: schema + overrides + persisted values → config.

use serde_json::{Map, Value};

use crate::error::{ConfigError, MalformedField};
use crate::schema::{value_kind, FieldKind, Schema, DEFAULT_BOT_NAME, DEFAULT_PREFIX};
use crate::validation::parse_hex_color;

/// Result of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Effective config: normalized persisted values with overrides applied.
    pub config: ResolvedConfig,
    /// Normalized persisted view (no overrides). This is what belongs on disk.
    pub normalized: Map<String, Value>,
    /// Persisted fields that had the wrong kind and were reset.
    pub malformed: Vec<MalformedField>,
}

/// Resolve `schema` against an optional persisted source and a set of overrides.
///
/// - Every schema field ends up holding a value of its declared kind, or is
///   absent when it has no default and nothing valid was supplied.
/// - Persisted values of the wrong kind are reset to the default and reported
///   in [`Resolution::malformed`].
/// - Keys unknown to the schema pass through unchanged.
/// - Override values are checked against the schema like persisted ones:
///   wrong kinds are dropped and reported, objects merge field by field.
///
/// Fails only when a required field is still missing after overrides.
pub fn resolve(
    overrides: &Map<String, Value>,
    schema: &Schema,
    persisted: Option<&Value>,
) -> Result<Resolution, ConfigError> {
    let mut malformed = Vec::new();

    let persisted_map = match persisted {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            malformed.push(MalformedField::new(
                "",
                &FieldKind::Object(Schema::new()),
                value_kind(other),
            ));
            None
        }
    };

    let normalized = resolve_object(schema, persisted_map, "", &mut malformed);

    let mut effective = normalized.clone();
    apply_overrides(schema, &mut effective, overrides, "", &mut malformed);

    for field in schema.fields.iter().filter(|f| f.required) {
        let present = effective
            .get(&field.name)
            .is_some_and(|v| field.kind.matches(v) && !is_blank(v));
        if !present {
            return Err(ConfigError::MissingRequiredField {
                field: field.name.clone(),
                location: "the environment or the persisted config".into(),
            });
        }
    }

    Ok(Resolution {
        config: ResolvedConfig::new(effective),
        normalized,
        malformed,
    })
}

fn resolve_object(
    schema: &Schema,
    persisted: Option<&Map<String, Value>>,
    path: &str,
    malformed: &mut Vec<MalformedField>,
) -> Map<String, Value> {
    let mut out = persisted.cloned().unwrap_or_default();

    for field in &schema.fields {
        let field_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{path}.{}", field.name)
        };

        let value = match (persisted.and_then(|m| m.get(&field.name)), &field.kind) {
            (Some(Value::Object(inner)), FieldKind::Object(sub)) => Some(Value::Object(
                resolve_object(sub, Some(inner), &field_path, malformed),
            )),
            (Some(v), kind) if kind.matches(v) => Some(v.clone()),
            (Some(v), kind) => {
                malformed.push(MalformedField::new(&field_path, kind, value_kind(v)));
                field.default_value()
            }
            (None, _) => field.default_value(),
        };

        match value {
            Some(v) => {
                out.insert(field.name.clone(), v);
            }
            None => {
                out.remove(&field.name);
            }
        }
    }

    out
}

/// Layer `overrides` onto `base`, checking each known key against `schema`.
///
/// Object overrides merge into the existing sub-object. Values of the wrong
/// kind are dropped and reported; unknown keys pass through.
pub(crate) fn apply_overrides(
    schema: &Schema,
    base: &mut Map<String, Value>,
    overrides: &Map<String, Value>,
    path: &str,
    malformed: &mut Vec<MalformedField>,
) {
    for (key, value) in overrides {
        let field_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        let Some(field) = schema.get(key) else {
            base.insert(key.clone(), value.clone());
            continue;
        };

        match (&field.kind, value) {
            (FieldKind::Object(sub), Value::Object(inner)) => {
                let mut merged = match base.remove(key) {
                    Some(Value::Object(existing)) => existing,
                    _ => match sub.defaults() {
                        Value::Object(defaults) => defaults,
                        _ => Map::new(),
                    },
                };
                apply_overrides(sub, &mut merged, inner, &field_path, malformed);
                base.insert(key.clone(), Value::Object(merged));
            }
            (kind, v) if kind.matches(v) => {
                base.insert(key.clone(), v.clone());
            }
            (kind, v) => malformed.push(MalformedField::new(&field_path, kind, value_kind(v))),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

/// Immutable, fully resolved bot configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    values: Map<String, Value>,
}

impl ResolvedConfig {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a dotted path such as `defaultColors.success`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.values.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn token(&self) -> Option<&str> {
        self.get_str("token")
    }

    pub fn name(&self) -> &str {
        self.get_str("name").unwrap_or(DEFAULT_BOT_NAME)
    }

    pub fn prefix(&self) -> &str {
        self.get_str("prefix").unwrap_or(DEFAULT_PREFIX)
    }

    /// Colour `key` from `defaultColors` as 0xRRGGBB.
    pub fn color(&self, key: &str) -> Option<u32> {
        self.get_path(&format!("defaultColors.{key}"))
            .and_then(Value::as_str)
            .and_then(parse_hex_color)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
