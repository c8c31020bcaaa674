//! Error types for configuration resolution.
//!
//! File-level validation problems are collected per file and surfaced exactly
//! once as an [`AggregatedError`], so a user sees every broken file in one
//! pass. Lookup and precondition failures abort only the operation that
//! triggered them.

use std::fmt;

use thiserror::Error;

/// Prefix used for every per-file error block.
pub const CONFIG_ERROR_PREFIX: &str = "Unable to parse configuration file";

/// Pointer to the configuration reference, appended to aggregated errors.
pub const PARSE_ERROR_SUGGESTION: &str = "Please refer to our documentation to read more about \
     configuration variables and the values they can have:\n\
     https://docs.conda.io/projects/conda/en/latest/configuration.html";

/// One field that failed validation inside a single fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Canonical field name (or the raw key, for unknown fields).
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// The offending value, when the failure is "value not permitted".
    pub given: Option<String>,
    /// The permitted value set, when the field is enum-typed.
    pub permitted: Option<&'static [&'static str]>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            given: None,
            permitted: None,
        }
    }

    pub fn unknown(field: &str) -> Self {
        Self::new(field, "unknown configuration field")
    }

    pub fn not_permitted(field: &str, given: &str, permitted: &'static [&'static str]) -> Self {
        let quoted: Vec<String> = permitted.iter().map(|v| format!("'{v}'")).collect();
        Self {
            field: field.to_string(),
            message: format!(
                "value is not a valid enumeration member; permitted: {}",
                quoted.join(", ")
            ),
            given: Some(given.to_string()),
            permitted: Some(permitted),
        }
    }
}

/// All problems found in one fragment (one file, or the CLI bag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The content was not a mapping at all, i.e. the file failed to parse
    /// into anything usable.
    Unparsable { source: String },
    /// The content was a mapping but one or more fields failed validation.
    Invalid {
        source: String,
        errors: Vec<FieldError>,
    },
}

impl SourceError {
    /// The originating file path or source label.
    pub fn source(&self) -> &str {
        match self {
            SourceError::Unparsable { source } => source,
            SourceError::Invalid { source, .. } => source,
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unparsable { source } => {
                write!(f, "{CONFIG_ERROR_PREFIX}: {source}")
            }
            SourceError::Invalid { source, errors } => {
                writeln!(f, "{CONFIG_ERROR_PREFIX}: {source}")?;
                for err in errors {
                    writeln!(f, "\n  {}: ", err.field)?;
                    writeln!(f, "    {}", err.message)?;
                    if let (Some(given), Some(_)) = (&err.given, &err.permitted) {
                        writeln!(f, "  provided_value: '{given}'")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Every [`SourceError`] collected across a whole resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedError {
    pub errors: Vec<SourceError>,
}

impl AggregatedError {
    pub fn new(errors: Vec<SourceError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}\n\n{}", blocks.join("\n\n"), PARSE_ERROR_SUGGESTION)
    }
}

impl std::error::Error for AggregatedError {}

/// Top-level error type for configuration resolution and lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more configuration fragments failed validation.
    #[error(transparent)]
    Validation(#[from] AggregatedError),

    /// The requested attribute is not declared in the schema and no source
    /// (including system defaults) provides it.
    #[error("attribute '{name}' was not found in any configured source")]
    AttributeNotFound { name: String },

    /// A required command-line precondition was not met.
    #[error("{0}")]
    Argument(String),

    /// A disabled feature was invoked.
    #[error("{0}")]
    OperationNotAllowed(String),

    /// A resolved value did not have the type the caller asked for.
    #[error("configuration value '{name}' has an unexpected type")]
    UnexpectedType { name: String },
}

impl ConfigError {
    pub fn attribute_not_found(name: &str) -> Self {
        ConfigError::AttributeNotFound {
            name: name.to_string(),
        }
    }
}
