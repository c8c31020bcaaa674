//! The static field table.
//!
//! One entry per recognized configuration field, grouped the way the
//! documentation groups them. Defaults here are the bottom of the precedence
//! chain; `None` means the field has no default and stays absent until some
//! source defines it.

use std::sync::LazyLock;

use serde_json::{json, Value};

use super::{
    ChannelPriority, EnvDelimiter, FieldDescriptor, FieldType, MergeStrategy, PathConflict,
    SafetyChecks,
};

impl FieldDescriptor {
    fn new(name: &'static str, field_type: FieldType, default: Option<Value>) -> Self {
        let merge = match field_type {
            FieldType::SeqStr | FieldType::SeqStrOrMap => MergeStrategy::Concat,
            FieldType::MapStr | FieldType::MapSeq | FieldType::Map => MergeStrategy::MapUnion,
            _ => MergeStrategy::Override,
        };
        Self {
            name,
            field_type,
            default,
            aliases: &[],
            merge,
            env_delimiter: EnvDelimiter::Comma,
        }
    }

    fn aliased(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn split_on(mut self, delimiter: EnvDelimiter) -> Self {
        self.env_delimiter = delimiter;
        self
    }
}

fn flag(name: &'static str, default: bool) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::Bool, Some(Value::Bool(default)))
}

fn int(name: &'static str, default: i64) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::Int, Some(Value::from(default)))
}

fn float(name: &'static str, default: f64) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::Float, Some(json!(default)))
}

fn string(name: &'static str, default: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::Str, Some(Value::from(default)))
}

fn seq(name: &'static str, default: &[&str]) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::SeqStr, Some(json!(default)))
}

fn map_str(name: &'static str, default: Value) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldType::MapStr, Some(default))
}

static TABLE: LazyLock<Vec<FieldDescriptor>> = LazyLock::new(|| {
    vec![
        // Channel configuration
        FieldDescriptor::new(
            "channels",
            FieldType::SeqStrOrMap,
            Some(json!(["defaults"])),
        )
        .aliased(&["channel"]),
        string("channel_alias", "https://conda.anaconda.org"),
        seq(
            "default_channels",
            &[
                "https://repo.anaconda.com/pkgs/main",
                "https://repo.anaconda.com/pkgs/r",
            ],
        ),
        flag("override_channels_enabled", true),
        flag("use_local", false),
        seq("allowlist_channels", &[]),
        map_str(
            "custom_channels",
            json!({"pkgs/pro": "https://repo.anaconda.com"}),
        ),
        FieldDescriptor::new("custom_multichannels", FieldType::MapSeq, Some(json!({}))),
        seq("migrated_channel_aliases", &[]),
        map_str("migrated_custom_channels", json!({})),
        flag("add_anaconda_token", true).aliased(&["add_binstar_token"]),
        flag("allow_non_channel_urls", false),
        flag("restore_free_channel", false),
        seq("repodata_fns", &["current_repodata.json", "repodata.json"]),
        FieldDescriptor::new("use_only_tar_bz2", FieldType::Bool, None),
        int("repodata_threads", 0),
        // Basic configuration
        seq("envs_dirs", &[])
            .aliased(&["envs_path"])
            .split_on(EnvDelimiter::Colon),
        seq("pkgs_dirs", &[]),
        int("default_threads", 0),
        // Network configuration
        FieldDescriptor::new("client_ssl_cert", FieldType::Str, None).aliased(&["client_cert"]),
        FieldDescriptor::new("client_ssl_cert_key", FieldType::Str, None)
            .aliased(&["client_cert_key"]),
        int("local_repodata_ttl", 1),
        flag("offline", false),
        map_str("proxy_servers", json!({})),
        float("remote_connect_timeout_secs", 9.15),
        int("remote_max_retries", 3),
        int("remote_backoff_factor", 1),
        float("remote_read_timeout_secs", 60.0),
        flag("ssl_verify", true).aliased(&["verify_ssl"]),
        // Solver configuration
        seq(
            "aggressive_update_packages",
            &["ca-certificates", "certifi", "openssl"],
        ),
        flag("auto_update_conda", true).aliased(&["self_update"]),
        FieldDescriptor::new(
            "channel_priority",
            FieldType::Enum(ChannelPriority::VALUES),
            Some(json!(ChannelPriority::Flexible.as_str())),
        ),
        seq("create_default_packages", &[]),
        seq("disallowed_packages", &[])
            .aliased(&["disallow"])
            .split_on(EnvDelimiter::Ampersand),
        flag("force_reinstall", false),
        seq("pinned_packages", &[]).split_on(EnvDelimiter::Ampersand),
        flag("pip_interop_enabled", false),
        seq("track_features", &[]),
        string("solver", "classic"),
        // Package linking and install-time configuration
        flag("allow_softlinks", false),
        flag("always_copy", false).aliased(&["copy"]),
        flag("always_softlink", false).aliased(&["softlink"]),
        FieldDescriptor::new(
            "path_conflict",
            FieldType::Enum(PathConflict::VALUES),
            Some(json!(PathConflict::Clobber.as_str())),
        ),
        flag("rollback_enabled", true),
        FieldDescriptor::new(
            "safety_checks",
            FieldType::Enum(SafetyChecks::VALUES),
            Some(json!(SafetyChecks::Warn.as_str())),
        ),
        flag("extra_safety_checks", false),
        FieldDescriptor::new("signing_metadata_url_base", FieldType::Str, None),
        flag("shortcuts", true),
        flag("non_admin_enabled", true),
        flag("separate_format_cache", false),
        int("verify_threads", 0),
        int("execute_threads", 0),
        // Conda-build configuration
        string("bld_path", ""),
        string("croot", ""),
        flag("anaconda_upload", false).aliased(&["binstar_upload"]),
        FieldDescriptor::new("conda_build", FieldType::Map, Some(json!({})))
            .aliased(&["conda-build"]),
        // Output, prompt, and flow control
        flag("always_yes", false).aliased(&["yes"]),
        flag("auto_activate_base", true),
        int("auto_stack", 0),
        flag("changeps1", true),
        string("env_prompt", "({default_env})"),
        flag("json", false),
        flag("notify_outdated_conda", true),
        flag("quiet", false),
        flag("report_errors", false),
        FieldDescriptor::new("show_channel_urls", FieldType::Bool, None),
        int("verbosity", 0).aliased(&["verbose"]),
        flag("unsatisfiable_hints", true),
        int("unsatisfiable_hints_check_depth", 2),
        // Declared for the command-line bag; files never set it.
        flag("override_channels", false),
    ]
});

/// All known fields, in declaration order.
pub fn descriptors() -> &'static [FieldDescriptor] {
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_expected_fields() {
        let table = descriptors();
        assert!(table.len() >= 65, "table unexpectedly small: {}", table.len());
        for name in [
            "channels",
            "channel_priority",
            "envs_dirs",
            "pinned_packages",
            "conda_build",
            "always_yes",
            "override_channels",
        ] {
            assert!(
                table.iter().any(|d| d.name == name),
                "missing field {name}"
            );
        }
    }

    #[test]
    fn test_sequence_fields_concat_and_maps_union() {
        for desc in descriptors() {
            match desc.field_type {
                FieldType::SeqStr | FieldType::SeqStrOrMap => {
                    assert_eq!(desc.merge, MergeStrategy::Concat, "{}", desc.name)
                }
                FieldType::MapStr | FieldType::MapSeq | FieldType::Map => {
                    assert_eq!(desc.merge, MergeStrategy::MapUnion, "{}", desc.name)
                }
                _ => assert_eq!(desc.merge, MergeStrategy::Override, "{}", desc.name),
            }
        }
    }

    #[test]
    fn test_env_delimiters() {
        assert_eq!(
            super::super::field("envs_dirs").unwrap().env_delimiter,
            EnvDelimiter::Colon
        );
        assert_eq!(
            super::super::field("pinned_packages").unwrap().env_delimiter,
            EnvDelimiter::Ampersand
        );
        assert_eq!(
            super::super::field("channels").unwrap().env_delimiter,
            EnvDelimiter::Comma
        );
    }
}
