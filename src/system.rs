//! System-level configuration.
//!
//! Captures everything about the host that the resolver consults: paths,
//! platform, the active environment, and the condarc search path. Built once
//! from the process environment and immutable afterwards.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Default channels on non-Windows hosts.
pub const DEFAULT_CHANNELS_UNIX: &[&str] = &[
    "https://repo.anaconda.com/pkgs/main",
    "https://repo.anaconda.com/pkgs/r",
];

/// Default channels on Windows hosts; msys2 carries the POSIX toolchain.
pub const DEFAULT_CHANNELS_WIN: &[&str] = &[
    "https://repo.anaconda.com/pkgs/main",
    "https://repo.anaconda.com/pkgs/r",
    "https://repo.anaconda.com/pkgs/msys2",
];

const COMPATIBLE_SHELLS_UNIX: &[&str] = &["bash", "fish", "tcsh", "xonsh", "zsh", "powershell"];

const COMPATIBLE_SHELLS_WIN: &[&str] = &[
    "bash",
    "cmd.exe",
    "fish",
    "tcsh",
    "xonsh",
    "zsh",
    "powershell",
];

fn env_string(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Host-specific configuration, lowest in the precedence chain.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub home: String,
    pub path: String,
    pub shell: String,
    pub conda_root: String,
    pub conda_prefix: String,
    pub conda_exe: String,
    pub conda_python_exe: String,
    pub conda_shlvl: i64,
    pub conda_default_env: String,
    pub condarc: String,
    pub xdg_config_home: String,
    pub user_rc_path: PathBuf,
    pub sys_rc_path: PathBuf,
    pub is_windows: bool,
    pub search_path: Vec<PathBuf>,
}

impl SystemConfig {
    /// Capture the current process environment.
    pub fn from_env() -> Self {
        let home = match std::env::var("HOME") {
            Ok(home) if !home.is_empty() => home,
            _ => dirs::home_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        };
        Self::from_parts(
            home,
            env_string("PATH"),
            env_string("SHELL"),
            env_string("CONDA_ROOT"),
            env_string("CONDA_PREFIX"),
            env_string("CONDA_EXE"),
            env_string("CONDA_PYTHON_EXE"),
            env_string("CONDA_SHLVL").parse().unwrap_or(1),
            env_string("CONDA_DEFAULT_ENV"),
            env_string("CONDARC"),
            env_string("XDG_CONFIG_HOME"),
            cfg!(windows),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        home: String,
        path: String,
        shell: String,
        conda_root: String,
        conda_prefix: String,
        conda_exe: String,
        conda_python_exe: String,
        conda_shlvl: i64,
        conda_default_env: String,
        condarc: String,
        xdg_config_home: String,
        is_windows: bool,
    ) -> Self {
        let user_rc_path = Path::new(&home).join(".condarc");
        let sys_rc_path = if conda_root.is_empty() {
            if is_windows {
                PathBuf::from("C:/ProgramData/conda/.condarc")
            } else {
                PathBuf::from("/etc/conda/.condarc")
            }
        } else {
            Path::new(&conda_root).join(".condarc")
        };

        let mut config = Self {
            home,
            path,
            shell,
            conda_root,
            conda_prefix,
            conda_exe,
            conda_python_exe,
            conda_shlvl,
            conda_default_env,
            condarc,
            xdg_config_home,
            user_rc_path,
            sys_rc_path,
            is_windows,
            search_path: Vec::new(),
        };
        config.search_path = build_search_path(&config);
        config
    }

    /// Short platform name in channel-subdir convention.
    pub fn platform(&self) -> &'static str {
        if self.is_windows {
            return "win";
        }
        match std::env::consts::OS {
            "macos" => "osx",
            // Other OS names already match the channel-subdir convention.
            other => other,
        }
    }

    /// Channel URLs that make up the `defaults` multichannel on this host.
    pub fn default_channels(&self) -> &'static [&'static str] {
        if self.is_windows {
            DEFAULT_CHANNELS_WIN
        } else {
            DEFAULT_CHANNELS_UNIX
        }
    }

    pub fn compatible_shells(&self) -> &'static [&'static str] {
        if self.is_windows {
            COMPATIBLE_SHELLS_WIN
        } else {
            COMPATIBLE_SHELLS_UNIX
        }
    }

    /// The search path entries that exist as regular files, with `condarc.d`
    /// directories expanded to their sorted `*.yml`/`*.yaml` contents.
    pub fn valid_rc_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in &self.search_path {
            if entry.is_dir() {
                files.extend(rc_dir_files(entry));
            } else if entry.is_file() {
                files.push(entry.clone());
            }
        }
        files
    }

    /// String-keyed lookup over the system fields, the tail of every
    /// aggregated lookup.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "home" => Some(Value::String(self.home.clone())),
            "path" => Some(Value::String(self.path.clone())),
            "shell" => Some(Value::String(self.shell.clone())),
            "conda_root" => Some(Value::String(self.conda_root.clone())),
            "conda_prefix" => Some(Value::String(self.conda_prefix.clone())),
            "conda_exe" => Some(Value::String(self.conda_exe.clone())),
            "conda_python_exe" => Some(Value::String(self.conda_python_exe.clone())),
            "conda_shlvl" => Some(Value::from(self.conda_shlvl)),
            "conda_default_env" => Some(Value::String(self.conda_default_env.clone())),
            "condarc" => Some(Value::String(self.condarc.clone())),
            "xdg_config_home" => Some(Value::String(self.xdg_config_home.clone())),
            "user_rc_path" => Some(Value::String(self.user_rc_path.display().to_string())),
            "sys_rc_path" => Some(Value::String(self.sys_rc_path.display().to_string())),
            "is_windows" => Some(Value::Bool(self.is_windows)),
            "platform" => Some(Value::String(self.platform().to_string())),
            "default_channels" => Some(json!(self.default_channels())),
            "compatible_shells" => Some(json!(self.compatible_shells())),
            "search_path" => Some(json!(self
                .search_path
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>())),
            _ => None,
        }
    }
}

fn rc_dir_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "yml" || ext == "yaml")
        })
        .collect();
    files.sort();
    files
}

fn push_rc_triplet(out: &mut Vec<PathBuf>, base: &Path) {
    out.push(base.join(".condarc"));
    out.push(base.join("condarc"));
    out.push(base.join("condarc.d"));
}

fn build_search_path(config: &SystemConfig) -> Vec<PathBuf> {
    let mut out = Vec::new();

    if config.is_windows {
        push_rc_triplet(&mut out, Path::new("C:/ProgramData/conda"));
    } else {
        push_rc_triplet(&mut out, Path::new("/etc/conda"));
        push_rc_triplet(&mut out, Path::new("/var/lib/conda"));
    }

    if !config.conda_root.is_empty() {
        push_rc_triplet(&mut out, Path::new(&config.conda_root));
    }
    if !config.xdg_config_home.is_empty() {
        push_rc_triplet(&mut out, Path::new(&config.xdg_config_home));
    }
    if !config.conda_prefix.is_empty() {
        push_rc_triplet(&mut out, Path::new(&config.conda_prefix));
    }

    let home = Path::new(&config.home);
    push_rc_triplet(&mut out, &home.join(".config/conda"));
    push_rc_triplet(&mut out, &home.join(".conda"));
    out.push(home.join(".condarc"));

    if !config.condarc.is_empty() {
        out.push(PathBuf::from(&config.condarc));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample(home: &str) -> SystemConfig {
        SystemConfig::from_parts(
            home.to_string(),
            "/usr/bin".to_string(),
            "/bin/bash".to_string(),
            String::new(),
            "/opt/conda/envs/test".to_string(),
            String::new(),
            String::new(),
            1,
            "test".to_string(),
            String::new(),
            String::new(),
            false,
        )
    }

    #[test]
    fn test_search_path_order() {
        let config = sample("/home/u");
        let rendered: Vec<String> = config
            .search_path
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(rendered[0], "/etc/conda/.condarc");
        let prefix_pos = rendered
            .iter()
            .position(|p| p == "/opt/conda/envs/test/.condarc")
            .unwrap();
        let home_pos = rendered.iter().position(|p| p == "/home/u/.condarc").unwrap();
        assert!(prefix_pos < home_pos, "prefix entries come before home");
        assert_eq!(rendered.last().unwrap(), "/home/u/.condarc");
    }

    #[test]
    fn test_xdg_entries_sit_directly_under_xdg_config_home() {
        let config = SystemConfig::from_parts(
            "/home/u".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            1,
            String::new(),
            String::new(),
            "/home/u/.config".to_string(),
            false,
        );
        let rendered: Vec<String> = config
            .search_path
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert!(rendered.contains(&"/home/u/.config/.condarc".to_string()));
        assert!(rendered.contains(&"/home/u/.config/condarc".to_string()));
        assert!(rendered.contains(&"/home/u/.config/condarc.d".to_string()));
        assert!(!rendered.contains(&"/home/u/.config/conda/.condarc".to_string()));
    }

    #[test]
    fn test_valid_rc_files_expands_rc_directories() {
        let dir = TempDir::new().unwrap();
        let home = dir.path();
        let rc_d = home.join(".conda/condarc.d");
        std::fs::create_dir_all(&rc_d).unwrap();
        for name in ["b.yml", "a.yaml", "ignored.txt"] {
            let mut f = std::fs::File::create(rc_d.join(name)).unwrap();
            f.write_all(b"quiet: true\n").unwrap();
        }
        let mut f = std::fs::File::create(home.join(".condarc")).unwrap();
        f.write_all(b"quiet: true\n").unwrap();

        let config = sample(&home.display().to_string());
        let files = config.valid_rc_files();
        let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        let a = names.iter().position(|n| n.ends_with("a.yaml")).unwrap();
        let b = names.iter().position(|n| n.ends_with("b.yml")).unwrap();
        assert!(a < b, "directory entries are sorted");
        assert!(!names.iter().any(|n| n.ends_with("ignored.txt")));
        assert!(names.last().unwrap().ends_with(".condarc"));
    }

    #[test]
    fn test_string_keyed_lookup() {
        let config = sample("/home/u");
        assert_eq!(config.get("shell"), Some(json!("/bin/bash")));
        assert_eq!(config.get("is_windows"), Some(json!(false)));
        assert_eq!(config.get("conda_shlvl"), Some(json!(1)));
        assert_eq!(
            config.get("default_channels"),
            Some(json!(DEFAULT_CHANNELS_UNIX))
        );
        assert_eq!(config.get("nonsense"), None);
    }
}
