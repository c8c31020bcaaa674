//! Declarative configuration schema.
//!
//! Every known configuration field is described by one [`FieldDescriptor`] in
//! a static table (see `fields.rs`). Validation, coercion and merging are
//! small interpreters over that table; nothing in the engine hard-codes a
//! field name except the derived channel logic in the context.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde_json::Value;

mod fields;

pub use fields::descriptors;

/// Declared type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    /// Closed string set; the slice is the permitted values.
    Enum(&'static [&'static str]),
    /// Ordered sequence of strings.
    SeqStr,
    /// Ordered sequence whose entries are strings or single-key mappings
    /// (the `channels` shape).
    SeqStrOrMap,
    /// Mapping of string to string.
    MapStr,
    /// Mapping of string to sequence-of-string.
    MapSeq,
    /// Free-form nested mapping.
    Map,
}

/// Per-field rule governing how two fragments' values combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Higher-precedence value wins outright.
    Override,
    /// Order-preserving, duplicate-eliminating concatenation.
    Concat,
    /// Key-wise union; higher-precedence side wins on key conflicts.
    MapUnion,
}

/// Delimiter used when a sequence field is read from an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvDelimiter {
    #[default]
    Comma,
    Colon,
    Ampersand,
}

impl EnvDelimiter {
    pub fn as_char(self) -> char {
        match self {
            EnvDelimiter::Comma => ',',
            EnvDelimiter::Colon => ':',
            EnvDelimiter::Ampersand => '&',
        }
    }
}

/// One declared configuration field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Canonical name.
    pub name: &'static str,
    pub field_type: FieldType,
    /// Schema default. `None` means "absent", which is distinct from a
    /// present-but-empty value.
    pub default: Option<Value>,
    /// Legacy/alternate names accepted in raw fragments.
    pub aliases: &'static [&'static str],
    pub merge: MergeStrategy,
    /// Only consulted for sequence-typed fields.
    pub env_delimiter: EnvDelimiter,
}

static BY_NAME: LazyLock<HashMap<&'static str, &'static FieldDescriptor>> = LazyLock::new(|| {
    descriptors().iter().map(|d| (d.name, d)).collect()
});

static BY_ALIAS: LazyLock<HashMap<&'static str, &'static FieldDescriptor>> = LazyLock::new(|| {
    descriptors()
        .iter()
        .flat_map(|d| d.aliases.iter().map(move |a| (*a, d)))
        .collect()
});

/// Look up a field by canonical name.
pub fn field(name: &str) -> Option<&'static FieldDescriptor> {
    BY_NAME.get(name).copied()
}

/// Look up a field by canonical name or alias.
pub fn resolve(name: &str) -> Option<&'static FieldDescriptor> {
    field(name).or_else(|| BY_ALIAS.get(name).copied())
}

/// Canonical name for an alias, if `name` is a known alias.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    BY_ALIAS.get(name).map(|d| d.name)
}

/// Failure produced by [`coerce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub message: String,
    pub given: Option<String>,
    pub permitted: Option<&'static [&'static str]>,
}

impl CoerceError {
    fn mismatch(expected: &str, got: &Value) -> Self {
        Self {
            message: format!("expected {expected}, got {}", type_name(got)),
            given: None,
            permitted: None,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Check and coerce `value` against the field's declared type, returning the
/// canonical representation stored in typed fragments.
pub fn coerce(desc: &FieldDescriptor, value: &Value) -> Result<Value, CoerceError> {
    match desc.field_type {
        FieldType::Bool => coerce_bool(value).ok_or_else(|| CoerceError::mismatch("a boolean", value)),
        FieldType::Int => coerce_int(value).ok_or_else(|| CoerceError::mismatch("an integer", value)),
        FieldType::Float => coerce_float(value).ok_or_else(|| CoerceError::mismatch("a number", value)),
        FieldType::Str => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            other => Err(CoerceError::mismatch("a string", other)),
        },
        FieldType::Enum(permitted) => match value {
            Value::String(s) if permitted.contains(&s.as_str()) => Ok(Value::String(s.clone())),
            Value::String(s) => {
                let quoted: Vec<String> = permitted.iter().map(|v| format!("'{v}'")).collect();
                Err(CoerceError {
                    message: format!(
                        "value is not a valid enumeration member; permitted: {}",
                        quoted.join(", ")
                    ),
                    given: Some(s.clone()),
                    permitted: Some(permitted),
                })
            }
            other => Err(CoerceError::mismatch("a string", other)),
        },
        FieldType::SeqStr => coerce_seq(value, |item| match item {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        })
        .ok_or_else(|| CoerceError::mismatch("a sequence of strings", value)),
        FieldType::SeqStrOrMap => coerce_seq(value, |item| match item {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Object(m) => Some(Value::Object(m.clone())),
            _ => None,
        })
        .ok_or_else(|| CoerceError::mismatch("a sequence of strings or mappings", value)),
        FieldType::MapStr => match value {
            Value::Object(map) if map.values().all(Value::is_string) => Ok(value.clone()),
            other => Err(CoerceError::mismatch("a mapping of string to string", other)),
        },
        FieldType::MapSeq => match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, item) in map {
                    let seq = coerce_seq(item, |v| match v {
                        Value::String(s) => Some(Value::String(s.clone())),
                        _ => None,
                    })
                    .ok_or_else(|| {
                        CoerceError::mismatch("a mapping of string to sequence-of-string", value)
                    })?;
                    out.insert(key.clone(), seq);
                }
                Ok(Value::Object(out))
            }
            other => Err(CoerceError::mismatch(
                "a mapping of string to sequence-of-string",
                other,
            )),
        },
        FieldType::Map => match value {
            Value::Object(_) => Ok(value.clone()),
            other => Err(CoerceError::mismatch("a mapping", other)),
        },
    }
}

fn coerce_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        // YAML 1.2 parses `yes`/`no`/`on`/`off` as plain strings; condarc
        // files rely on the 1.1 reading.
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_int(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_i64().map(Value::from),
        // Accept booleans for int-or-bool fields such as local_repodata_ttl.
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().and_then(|f| serde_json::Number::from_f64(f).map(Value::Number)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number)),
        _ => None,
    }
}

fn coerce_seq(value: &Value, item: impl Fn(&Value) -> Option<Value>) -> Option<Value> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for v in items {
                out.push(item(v)?);
            }
            Some(Value::Array(out))
        }
        // A bare scalar is accepted as a one-element sequence.
        other => item(other).map(|v| Value::Array(vec![v])),
    }
}

macro_rules! closed_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{other}' is not one of {}",
                        Self::VALUES.join(", ")
                    )),
                }
            }
        }
    };
}

closed_enum! {
    /// How channel order interacts with the solver.
    ChannelPriority {
        Flexible => "flexible",
        Strict => "strict",
        Disabled => "disabled",
    }
}

closed_enum! {
    /// How conflicting/overlapping paths are handled during link operations.
    PathConflict {
        Clobber => "clobber",
        Warn => "warn",
        Prevent => "prevent",
    }
}

closed_enum! {
    /// Enforcement level for install-time safety guarantees.
    SafetyChecks {
        Warn => "warn",
        Enabled => "enabled",
        Disabled => "disabled",
    }
}
