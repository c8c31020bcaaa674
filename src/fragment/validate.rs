//! Schema validation of raw fragments.

use serde_json::Value;

use crate::error::{FieldError, SourceError};
use crate::fragment::{RawFragment, TypedFragment};
use crate::schema;

/// Validate an arbitrary parsed document against the schema.
///
/// `label` names the source (usually a file path) and is carried into any
/// error. A null document (empty file) validates to an empty fragment; any
/// other non-mapping document is reported as unparsable.
pub fn validate_raw(value: Value, label: &str) -> Result<TypedFragment, SourceError> {
    match value {
        Value::Null => Ok(TypedFragment::new()),
        Value::Object(map) => validate_mapping(&map, label),
        _ => Err(SourceError::Unparsable {
            source: label.to_string(),
        }),
    }
}

/// Validate a key/value bag whose keys are already canonical.
///
/// Collects every field error before failing, so a broken file reports all of
/// its problems in one pass. Null values are treated as "not set" and
/// skipped, matching how an empty `key:` line in YAML reads.
pub fn validate_mapping(raw: &RawFragment, label: &str) -> Result<TypedFragment, SourceError> {
    let mut typed = TypedFragment::new();
    let mut errors = Vec::new();

    for (key, value) in raw {
        let Some(desc) = schema::field(key) else {
            errors.push(FieldError::unknown(key));
            continue;
        };
        if value.is_null() {
            continue;
        }
        match schema::coerce(desc, value) {
            Ok(coerced) => typed.insert(desc.name, coerced),
            Err(err) => {
                let field_err = match (&err.given, err.permitted) {
                    (Some(given), Some(permitted)) => {
                        FieldError::not_permitted(desc.name, given, permitted)
                    }
                    _ => FieldError {
                        field: desc.name.to_string(),
                        message: err.message,
                        given: err.given,
                        permitted: err.permitted,
                    },
                };
                errors.push(field_err);
            }
        }
    }

    if errors.is_empty() {
        Ok(typed)
    } else {
        Err(SourceError::Invalid {
            source: label.to_string(),
            errors,
        })
    }
}
