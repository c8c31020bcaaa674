//! Multi-source condarc configuration resolution.
//!
//! Configuration arrives from four places with fixed precedence: command
//! line, then `CONDA_*` environment variables, then condarc files, then
//! system defaults. Each source produces a schema-validated fragment;
//! fragments merge per field (override, concatenate, or map-union) and the
//! [`context::Context`] answers lookups over the merged whole.
//!
//! ```no_run
//! use condarc::context::Context;
//!
//! let ctx = Context::resolve(Default::default(), &[])?;
//! let channels = ctx.channels()?;
//! # Ok::<(), condarc::error::ConfigError>(())
//! ```

pub mod cli;
pub mod context;
pub mod error;
pub mod fragment;
pub mod schema;
pub mod source;
pub mod system;

pub use context::{Context, DEFAULTS_CHANNEL_NAME, LOCAL_CHANNEL_NAME, RC_FILE_ENV_VAR};
pub use error::{AggregatedError, ConfigError, FieldError, SourceError};
pub use fragment::{RawFragment, TypedFragment};
pub use schema::{ChannelPriority, FieldDescriptor, FieldType, MergeStrategy, PathConflict, SafetyChecks};
pub use source::{CliSource, ConfigSource, EnvSource, FileSource};
pub use system::SystemConfig;
