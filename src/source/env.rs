//! Environment-variable configuration.

use serde_json::Value;
use tracing::warn;

use crate::schema::{self, FieldType};
use crate::source::ConfigSource;

/// Prefix for configuration environment variables.
pub const ENV_VAR_PREFIX: &str = "CONDA_";

/// Reads fields from `CONDA_*` environment variables, lazily per lookup.
///
/// Variable name is the prefix plus the upper-cased canonical field name.
/// Sequence fields split on their declared delimiter; scalar fields go
/// through ordinary schema coercion. A value that fails coercion is logged
/// and treated as absent rather than failing the lookup.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvSource {
    pub fn new() -> Self {
        Self::with_prefix(ENV_VAR_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field.to_uppercase())
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, name: &str) -> Option<Value> {
        let desc = schema::field(name)?;
        let var = self.var_name(name);
        let raw = std::env::var(&var).ok()?;

        let candidate = match desc.field_type {
            FieldType::SeqStr | FieldType::SeqStrOrMap => Value::Array(
                raw.split(desc.env_delimiter.as_char())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ),
            _ => Value::String(raw),
        };

        match schema::coerce(desc, &candidate) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%var, field = name, message = %err.message, "ignoring unusable environment value");
                None
            }
        }
    }

    fn has(&self, name: &str) -> bool {
        schema::field(name).is_some() && std::env::var_os(self.var_name(name)).is_some()
    }
}
