//! File-backed configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{AggregatedError, SourceError};
use crate::fragment::{self, RawFragment, TypedFragment};
use crate::source::ConfigSource;

/// Parse a YAML file into a JSON value. Any I/O or parse error is logged and
/// an empty mapping returned; a missing or broken file never aborts loading.
pub fn read_yaml_file(path: &Path) -> Value {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %path.display(), %err, "failed to read config file");
            return Value::Object(serde_json::Map::new());
        }
    };
    match serde_yaml::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            error!(path = %path.display(), %err, "failed to parse YAML config file");
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Parse a JSON file, with the same never-fail contract as
/// [`read_yaml_file`].
pub fn read_json_file(path: &Path) -> Value {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %path.display(), %err, "failed to read config file");
            return Value::Object(serde_json::Map::new());
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            error!(path = %path.display(), %err, "failed to parse JSON config file");
            Value::Object(serde_json::Map::new())
        }
    }
}

fn read_config_file(path: &Path) -> Value {
    if path.extension().is_some_and(|ext| ext == "json") {
        read_json_file(path)
    } else {
        read_yaml_file(path)
    }
}

/// All configuration files, parsed, validated and merged.
///
/// File order is precedence order: later files override earlier ones for
/// override-strategy fields and their entries lead for concatenated ones.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    /// Normalized raw bags per file, kept for declared-key checks.
    raw: Vec<(PathBuf, RawFragment)>,
    merged: TypedFragment,
}

impl FileSource {
    /// Parse and validate every file, then merge the valid fragments.
    ///
    /// Validation problems are collected across all files and returned as a
    /// single [`AggregatedError`] once the whole list has been processed.
    pub fn load(paths: &[PathBuf]) -> Result<Self, AggregatedError> {
        let mut raw = Vec::with_capacity(paths.len());
        let mut fragments = Vec::with_capacity(paths.len());
        let mut errors: Vec<SourceError> = Vec::new();

        for path in paths {
            debug!(path = %path.display(), "loading config file");
            let label = path.display().to_string();
            let value = match read_config_file(path) {
                Value::Object(mut bag) => {
                    fragment::normalize_aliases(&mut bag);
                    raw.push((path.clone(), bag.clone()));
                    Value::Object(bag)
                }
                other => {
                    raw.push((path.clone(), RawFragment::new()));
                    other
                }
            };
            match fragment::validate_raw(value, &label) {
                Ok(typed) => fragments.push(typed),
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            return Err(AggregatedError::new(errors));
        }

        Ok(Self {
            merged: fragment::reduce(&fragments),
            raw,
        })
    }

    /// Build directly from already-typed fragments. Used by tests and by
    /// callers that assemble fragments without touching the filesystem.
    pub fn from_fragments(fragments: Vec<TypedFragment>) -> Self {
        let raw = fragments
            .iter()
            .enumerate()
            .map(|(i, frag)| (PathBuf::from(format!("<fragment {i}>")), frag.as_map().clone()))
            .collect();
        Self {
            merged: fragment::reduce(&fragments),
            raw,
        }
    }

    /// Whether any file declared `name`, even if its merged value is empty.
    pub fn declares(&self, name: &str) -> bool {
        self.raw.iter().any(|(_, bag)| bag.contains_key(name))
    }

    /// The merged view across every file.
    pub fn merged(&self) -> &TypedFragment {
        &self.merged
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.raw.iter().map(|(path, _)| path.as_path())
    }
}

impl ConfigSource for FileSource {
    fn get(&self, name: &str) -> Option<Value> {
        self.merged.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.merged.has(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_reads_as_empty_mapping() {
        let value = read_yaml_file(Path::new("/no/such/file.yml"));
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            ".condarc",
            "channels:\n  - conda-forge\nalways_yes: yes\n",
        );
        let source = FileSource::load(&[path]).unwrap();
        assert_eq!(source.get("channels"), Some(json!(["conda-forge"])));
        assert_eq!(source.get("always_yes"), Some(json!(true)));
        assert!(source.declares("channels"));
        assert!(!source.declares("offline"));
    }

    #[test]
    fn test_json_extension_dispatch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "condarc.json", r#"{"offline": true}"#);
        let source = FileSource::load(&[path]).unwrap();
        assert_eq!(source.get("offline"), Some(json!(true)));
    }

    #[test]
    fn test_later_file_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let low = write_file(&dir, "low.yml", "channels: [defaults]\nalways_yes: true\n");
        let high = write_file(&dir, "high.yml", "channels: [conda-forge]\nalways_yes: false\n");
        let source = FileSource::load(&[low, high]).unwrap();
        assert_eq!(
            source.get("channels"),
            Some(json!(["conda-forge", "defaults"]))
        );
        assert_eq!(source.get("always_yes"), Some(json!(false)));
    }

    #[test]
    fn test_later_file_channels_lead_merged_sequence() {
        let dir = TempDir::new().unwrap();
        let one = write_file(&dir, "one.yml", "channels:\n  - conda-forge\nalways_yes: false\n");
        let two = write_file(&dir, "two.yml", "channels:\n  - defaults\nalways_yes: true\n");
        let source = FileSource::load(&[one, two]).unwrap();
        assert_eq!(
            source.get("channels"),
            Some(json!(["defaults", "conda-forge"]))
        );
        assert_eq!(source.get("always_yes"), Some(json!(true)));
    }

    #[test]
    fn test_aliases_normalized_before_declares_check() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, ".condarc", "channel: [conda-forge]\n");
        let source = FileSource::load(&[path]).unwrap();
        assert!(source.declares("channels"));
        assert_eq!(source.get("channels"), Some(json!(["conda-forge"])));
    }

    #[test]
    fn test_errors_aggregate_across_files() {
        let dir = TempDir::new().unwrap();
        let bad_enum = write_file(&dir, "a.yml", "channel_priority: severe\n");
        let unknown = write_file(&dir, "b.yml", "mystery: 1\n");
        let fine = write_file(&dir, "c.yml", "quiet: true\n");
        let err = FileSource::load(&[bad_enum, unknown, fine]).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn test_empty_file_is_fine() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, ".condarc", "");
        let source = FileSource::load(&[path]).unwrap();
        assert!(!source.has("channels"));
    }

    #[test]
    fn test_scalar_document_is_unparsable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, ".condarc", "just a bare string");
        let err = FileSource::load(&[path]).unwrap_err();
        assert!(matches!(err.errors[0], SourceError::Unparsable { .. }));
    }
}
