//! Process-wide sandbox configuration.
//!
//! Built once at startup from defaults, an optional `.sandbox.toml` in the
//! repository root, and `SANDBOX_*` environment variables (highest
//! precedence), then passed by reference to every operation.
//!
//! Environment variables:
//! - `SANDBOX_MAIN_BRANCH` - branch sandboxes fork from and merge (default `main`)
//! - `SANDBOX_REMOTE` - remote the main branch is fetched from (default `origin`)
//! - `SANDBOX_NAMESPACE` - branch namespace (default `$USER`, else `local`)
//! - `SANDBOX_BASE_DIR` - where sandbox directories live
//! - `SANDBOX_MARKER` - substring identifying sandbox directories
//! - `SANDBOX_FAIL_ON_CONFLICT=1` - exit non-zero when a single-target update conflicts

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::sandbox::naming;

/// File name of the optional per-repository config file.
pub const CONFIG_FILE_NAME: &str = ".sandbox.toml";

const DEFAULT_MAIN_BRANCH: &str = "main";
const DEFAULT_REMOTE: &str = "origin";
const FALLBACK_NAMESPACE: &str = "local";

/// Immutable configuration shared by all sandbox operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the main repository checkout.
    pub repo_path: PathBuf,
    /// Branch sandboxes are created from and updated with.
    pub main_branch: String,
    /// Remote the main branch is fetched from.
    pub remote: String,
    /// Prefix of every sandbox branch (`<namespace>/sandbox/<timestamp>`).
    pub namespace: String,
    /// Directory that holds sandbox worktrees.
    pub base_dir: PathBuf,
    /// Substring that identifies a sandbox directory.
    pub marker: String,
    /// Whether a conflicted single-target update exits non-zero.
    pub fail_on_conflict: bool,
}

/// Contents of `.sandbox.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub main_branch: Option<String>,
    pub remote: Option<String>,
    pub namespace: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub marker: Option<String>,
    pub fail_on_conflict: Option<bool>,
}

impl ConfigFile {
    /// Parses config file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Reads `<repo_path>/.sandbox.toml`, returning `None` when it is absent.
    pub fn read(repo_path: &Path) -> Result<Option<Self>> {
        let path = repo_path.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        tracing::debug!(path = ?path, "loaded config file");
        Self::parse(&contents).map(Some)
    }
}

impl Config {
    /// Creates a configuration with defaults for `repo_path`.
    pub fn new(repo_path: PathBuf, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            base_dir: default_base_dir(&repo_path),
            marker: default_marker(&namespace),
            repo_path,
            main_branch: DEFAULT_MAIN_BRANCH.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            namespace,
            fail_on_conflict: false,
        }
    }

    /// Loads configuration from the config file and the process environment.
    pub fn load(repo_path: PathBuf) -> Result<Self> {
        let file = ConfigFile::read(&repo_path)?;
        let config = Self::from_sources(repo_path, file, |key| std::env::var(key).ok())?;

        for warning in config.validate().into_result()? {
            tracing::warn!(%warning, "configuration warning");
        }

        Ok(config)
    }

    /// Layers defaults, file values, and environment lookups.
    ///
    /// `env` is consulted for the `SANDBOX_*` keys and `USER`.
    pub fn from_sources(
        repo_path: PathBuf,
        file: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let namespace = non_empty("SANDBOX_NAMESPACE")
            .or(file.namespace)
            .or_else(|| non_empty("USER"))
            .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string());

        let mut config = Self::new(repo_path, namespace);

        if let Some(branch) = non_empty("SANDBOX_MAIN_BRANCH").or(file.main_branch) {
            config.main_branch = branch;
        }
        if let Some(remote) = non_empty("SANDBOX_REMOTE").or(file.remote) {
            config.remote = remote;
        }
        if let Some(marker) = non_empty("SANDBOX_MARKER").or(file.marker) {
            config.marker = marker;
        }
        if let Some(dir) = non_empty("SANDBOX_BASE_DIR").map(PathBuf::from).or(file.base_dir) {
            config.base_dir = if dir.is_absolute() {
                dir
            } else {
                config.repo_path.join(dir)
            };
        }

        config.fail_on_conflict = match non_empty("SANDBOX_FAIL_ON_CONFLICT") {
            Some(value) => parse_flag(&value)?,
            None => file.fail_on_conflict.unwrap_or(false),
        };

        Ok(config)
    }

    /// Ref merged into sandboxes, e.g. `origin/main`.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.remote, self.main_branch)
    }
}

fn default_base_dir(repo_path: &Path) -> PathBuf {
    let name = repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    let parent = repo_path.parent().unwrap_or(repo_path);
    parent.join(format!("{}-sandboxes", name))
}

fn default_marker(namespace: &str) -> String {
    format!("{}-sandbox-", namespace)
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "SANDBOX_FAIL_ON_CONFLICT must be a boolean, got '{}'",
            other
        ))),
    }
}

/// Validation result containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

impl Config {
    /// Checks the configuration for values that would break sandbox commands.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (name, value) in [
            ("main_branch", &self.main_branch),
            ("remote", &self.remote),
            ("namespace", &self.namespace),
            ("marker", &self.marker),
        ] {
            if value.is_empty() {
                result.add_error(format!("{} cannot be empty", name));
            } else if value.chars().any(char::is_whitespace) {
                result.add_error(format!("{} '{}' must not contain whitespace", name, value));
            }
        }

        if self.namespace.contains('/') {
            result.add_error(format!("namespace '{}' must not contain '/'", self.namespace));
        }

        // Every other command finds sandboxes by the marker.
        let sample =
            naming::directory_name(&naming::branch_name(&self.namespace, "00000000-000000"));
        if !self.marker.is_empty() && !sample.contains(&self.marker) {
            result.add_error(format!(
                "marker '{}' does not occur in sandbox directory names like '{}'",
                self.marker, sample
            ));
        }

        if self.base_dir.starts_with(&self.repo_path) {
            result.add_warning(format!(
                "base_dir {} is inside the repository; sandboxes will show up as untracked files",
                self.base_dir.display()
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_derive_from_repo_and_user() {
        let config =
            Config::from_sources(PathBuf::from("/work/app"), None, env_from(&[("USER", "alice")]))
                .unwrap();

        assert_eq!(config.main_branch, "main");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.namespace, "alice");
        assert_eq!(config.base_dir, PathBuf::from("/work/app-sandboxes"));
        assert_eq!(config.marker, "alice-sandbox-");
        assert!(!config.fail_on_conflict);
        assert_eq!(config.upstream_ref(), "origin/main");
    }

    #[test]
    fn namespace_falls_back_without_user() {
        let config = Config::from_sources(PathBuf::from("/r"), None, env_from(&[])).unwrap();
        assert_eq!(config.namespace, "local");
        assert_eq!(config.marker, "local-sandbox-");
    }

    #[test]
    fn environment_overrides_file() {
        let file = ConfigFile::parse(
            r#"
            main_branch = "develop"
            remote = "upstream"
            namespace = "team"
            base_dir = "../boxes"
            fail_on_conflict = true
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            PathBuf::from("/work/app"),
            Some(file),
            env_from(&[("SANDBOX_REMOTE", "mirror"), ("SANDBOX_FAIL_ON_CONFLICT", "0")]),
        )
        .unwrap();

        assert_eq!(config.main_branch, "develop");
        assert_eq!(config.remote, "mirror");
        assert_eq!(config.namespace, "team");
        assert_eq!(config.marker, "team-sandbox-");
        assert_eq!(config.base_dir, PathBuf::from("/work/app/../boxes"));
        assert!(!config.fail_on_conflict);
    }

    #[test]
    fn empty_env_flag_keeps_file_setting() {
        let file = ConfigFile::parse("fail_on_conflict = true").unwrap();

        let config = Config::from_sources(
            PathBuf::from("/r"),
            Some(file),
            env_from(&[("SANDBOX_FAIL_ON_CONFLICT", "")]),
        )
        .unwrap();

        assert!(config.fail_on_conflict);
    }

    #[test]
    fn absolute_base_dir_is_kept() {
        let config = Config::from_sources(
            PathBuf::from("/work/app"),
            None,
            env_from(&[("SANDBOX_BASE_DIR", "/tmp/boxes")]),
        )
        .unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/tmp/boxes"));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = Config::from_sources(
            PathBuf::from("/r"),
            None,
            env_from(&[("SANDBOX_FAIL_ON_CONFLICT", "sometimes")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(ConfigFile::parse("main = \"x\"").is_err());
    }

    #[test]
    fn default_config_validates() {
        let config = Config::new(PathBuf::from("/work/app"), "alice");
        let result = config.validate();
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn marker_must_match_generated_directories() {
        let mut config = Config::new(PathBuf::from("/work/app"), "alice");
        config.marker = "bob-sandbox-".to_string();
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn namespace_with_slash_or_space_is_invalid() {
        let mut config = Config::new(PathBuf::from("/work/app"), "a/b");
        config.marker = "a".to_string();
        assert!(!config.validate().is_valid());

        let config = Config::new(PathBuf::from("/work/app"), "a b");
        assert!(config.validate().into_result().is_err());
    }

    #[test]
    fn base_dir_inside_repo_warns() {
        let mut config = Config::new(PathBuf::from("/work/app"), "alice");
        config.base_dir = PathBuf::from("/work/app/.sandboxes");
        let result = config.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
