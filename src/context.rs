//! The aggregated configuration context.
//!
//! One immutable object answering every configuration question, resolved
//! over the precedence chain command line > environment > files > system,
//! with schema defaults as the final fallback.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AggregatedError, ConfigError};
use crate::fragment::RawFragment;
use crate::schema::{self, ChannelPriority, MergeStrategy};
use crate::source::{CliSource, ConfigSource, EnvSource, FileSource};
use crate::system::SystemConfig;

/// Name of the reserved local multichannel.
pub const LOCAL_CHANNEL_NAME: &str = "local";

/// Name of the reserved defaults multichannel.
pub const DEFAULTS_CHANNEL_NAME: &str = "defaults";

/// Environment variable naming one extra config file appended with the
/// highest file precedence.
pub const RC_FILE_ENV_VAR: &str = "CONDARC_NEW";

/// Aggregated view over every configuration source.
#[derive(Debug, Clone)]
pub struct Context {
    cli: Option<CliSource>,
    env: Option<EnvSource>,
    file: Option<FileSource>,
    system: SystemConfig,
}

impl Context {
    pub fn new(
        system: SystemConfig,
        file: Option<FileSource>,
        env: Option<EnvSource>,
        cli: Option<CliSource>,
    ) -> Self {
        Self {
            cli,
            env,
            file,
            system,
        }
    }

    /// Resolve a full context from the process environment.
    ///
    /// The file list is the system search path's existing rc files, then
    /// `extra_files`, then the file named by `CONDARC_NEW` (skipped with a
    /// warning when it does not exist). All file and command-line validation
    /// problems abort resolution as one aggregated error.
    pub fn resolve(cli_bag: RawFragment, extra_files: &[PathBuf]) -> Result<Self, ConfigError> {
        Self::resolve_with(SystemConfig::from_env(), cli_bag, extra_files)
    }

    pub fn resolve_with(
        system: SystemConfig,
        cli_bag: RawFragment,
        extra_files: &[PathBuf],
    ) -> Result<Self, ConfigError> {
        let mut files = system.valid_rc_files();
        files.extend(extra_files.iter().cloned());

        if let Ok(path) = std::env::var(RC_FILE_ENV_VAR) {
            if !path.is_empty() {
                let path = PathBuf::from(path);
                if path.is_file() {
                    files.push(path);
                } else {
                    warn!(env_var = RC_FILE_ENV_VAR, path = %path.display(), "rc file named by environment does not exist");
                }
            }
        }

        debug!(count = files.len(), "resolving configuration files");
        let file = FileSource::load(&files)?;
        let cli =
            CliSource::from_bag(cli_bag).map_err(|err| AggregatedError::new(vec![err]))?;

        Ok(Self::new(
            system,
            Some(file),
            Some(EnvSource::new()),
            Some(cli),
        ))
    }

    pub fn system(&self) -> &SystemConfig {
        &self.system
    }

    /// Sources in precedence order, highest first.
    fn sources(&self) -> impl Iterator<Item = &dyn ConfigSource> {
        let cli = self.cli.as_ref().map(|s| s as &dyn ConfigSource);
        let env = self.env.as_ref().map(|s| s as &dyn ConfigSource);
        let file = self.file.as_ref().map(|s| s as &dyn ConfigSource);
        [cli, env, file].into_iter().flatten()
    }

    /// Resolve `name` across every source.
    ///
    /// Declared fields follow their merge strategy across the defining
    /// sources, then fall back to the system configuration and the schema
    /// default. Undeclared names are answered by the system configuration
    /// alone.
    pub fn get(&self, name: &str) -> Result<Value, ConfigError> {
        let Some(desc) = schema::field(name) else {
            return self
                .system
                .get(name)
                .ok_or_else(|| ConfigError::attribute_not_found(name));
        };

        let resolved = match desc.merge {
            MergeStrategy::Override => self.sources().find_map(|s| s.get(name)),
            MergeStrategy::Concat => {
                let mut out: Vec<Value> = Vec::new();
                let mut defined = false;
                for source in self.sources() {
                    if let Some(value) = source.get(name) {
                        defined = true;
                        for item in as_items(&value) {
                            if !out.contains(item) {
                                out.push(item.clone());
                            }
                        }
                    }
                }
                defined.then_some(Value::Array(out))
            }
            MergeStrategy::MapUnion => {
                let mut out = serde_json::Map::new();
                let mut defined = false;
                // Lowest precedence first so later inserts win.
                let from_sources: Vec<Value> = self.sources().filter_map(|s| s.get(name)).collect();
                for value in from_sources.into_iter().rev() {
                    if let Value::Object(map) = value {
                        defined = true;
                        out.extend(map);
                    }
                }
                defined.then_some(Value::Object(out))
            }
        };

        if let Some(value) = resolved {
            return Ok(value);
        }
        if let Some(value) = self.system.get(name) {
            return Ok(value);
        }
        desc.default
            .clone()
            .ok_or_else(|| ConfigError::attribute_not_found(name))
    }

    pub fn has(&self, name: &str) -> bool {
        match schema::field(name) {
            Some(desc) => {
                self.sources().any(|s| s.get(name).is_some())
                    || self.system.get(name).is_some()
                    || desc.default.is_some()
            }
            None => self.system.get(name).is_some(),
        }
    }

    /// The effective channel list.
    ///
    /// Channel resolution has its own rules layered over the ordinary
    /// lookup: `--override-channels` restricts the list to the command
    /// line's channels (guarded by `override_channels_enabled`), command-line
    /// channels combine with the aggregated channel list when any file
    /// declares channels (or with the `defaults` multichannel when none
    /// does), and `use_local` prepends the local channel. First-seen order,
    /// deduped.
    pub fn channels(&self) -> Result<Vec<String>, ConfigError> {
        let mut out: Vec<String> = Vec::new();
        if self.get_bool("use_local")? {
            out.push(LOCAL_CHANNEL_NAME.to_string());
        }

        let cli_channels = self
            .cli
            .as_ref()
            .and_then(|cli| cli.get("channels"))
            .map(|value| channel_names(&value))
            .unwrap_or_default();
        let override_channels = self
            .cli
            .as_ref()
            .and_then(|cli| cli.get("override_channels"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if override_channels {
            if !self.get_bool("override_channels_enabled")? {
                return Err(ConfigError::OperationNotAllowed(
                    "Overriding channels has been disabled.".to_string(),
                ));
            }
            if cli_channels.is_empty() {
                return Err(ConfigError::Argument(
                    "At least one -c / --channel flag must be supplied when using \
                     --override-channels."
                        .to_string(),
                ));
            }
            extend_unique(&mut out, cli_channels);
            return Ok(out);
        }

        if !cli_channels.is_empty() {
            extend_unique(&mut out, cli_channels);
            let file_declares = self
                .file
                .as_ref()
                .is_some_and(|file| file.declares("channels"));
            if file_declares {
                extend_unique(&mut out, channel_names(&self.get("channels")?));
            } else {
                extend_unique(&mut out, vec![DEFAULTS_CHANNEL_NAME.to_string()]);
            }
            return Ok(out);
        }

        extend_unique(&mut out, channel_names(&self.get("channels")?));
        Ok(out)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ConfigError> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| ConfigError::UnexpectedType {
                name: name.to_string(),
            })
    }

    pub fn get_int(&self, name: &str) -> Result<i64, ConfigError> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| ConfigError::UnexpectedType {
                name: name.to_string(),
            })
    }

    pub fn get_str(&self, name: &str) -> Result<String, ConfigError> {
        match self.get(name)? {
            Value::String(s) => Ok(s),
            _ => Err(ConfigError::UnexpectedType {
                name: name.to_string(),
            }),
        }
    }

    pub fn always_yes(&self) -> Result<bool, ConfigError> {
        self.get_bool("always_yes")
    }

    pub fn changeps1(&self) -> Result<bool, ConfigError> {
        self.get_bool("changeps1")
    }

    pub fn quiet(&self) -> Result<bool, ConfigError> {
        self.get_bool("quiet")
    }

    pub fn json(&self) -> Result<bool, ConfigError> {
        self.get_bool("json")
    }

    pub fn offline(&self) -> Result<bool, ConfigError> {
        self.get_bool("offline")
    }

    pub fn verbosity(&self) -> Result<i64, ConfigError> {
        self.get_int("verbosity")
    }

    pub fn channel_priority(&self) -> Result<ChannelPriority, ConfigError> {
        self.get_str("channel_priority")?
            .parse()
            .map_err(|_| ConfigError::UnexpectedType {
                name: "channel_priority".to_string(),
            })
    }

    /// Every declared field with its resolved value, for display.
    pub fn snapshot(&self) -> serde_json::Map<String, Value> {
        let mut out = serde_json::Map::new();
        for desc in schema::descriptors() {
            if let Ok(value) = self.get(desc.name) {
                out.insert(desc.name.to_string(), value);
            }
        }
        out
    }
}

fn as_items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => std::slice::from_ref(value),
    }
}

/// Extract channel names from a channels value; entries are strings or
/// single-key mappings whose key is the channel name.
fn channel_names(value: &Value) -> Vec<String> {
    as_items(value)
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.keys().next().cloned(),
            _ => None,
        })
        .collect()
}

fn extend_unique(out: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
}
