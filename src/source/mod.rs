//! Configuration sources.
//!
//! Each source answers "do you define this field, and with what value"
//! through the [`ConfigSource`] trait. Precedence between sources is the
//! aggregator's business; a source only reports its own contribution.

use serde_json::Value;

mod cli;
mod env;
mod file;

pub use cli::CliSource;
pub use env::EnvSource;
pub use file::{read_json_file, read_yaml_file, FileSource};

/// A single provider of configuration values.
pub trait ConfigSource {
    /// The source's value for the canonical field `name`, if it defines one.
    fn get(&self, name: &str) -> Option<Value>;

    /// Whether the source defines `name` at all.
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
