//! Branch and directory names for new sandboxes.

use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone};

use crate::config::Config;

/// `YYYYMMDD-HHMMSS`; sorts lexicographically in creation order.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Branch and worktree path for a sandbox about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxName {
    pub branch: String,
    pub path: PathBuf,
}

impl SandboxName {
    /// Names a sandbox created now.
    pub fn generate(config: &Config) -> Self {
        Self::at(config, &Local::now())
    }

    /// Names a sandbox created at `time`.
    ///
    /// Resolution is one second, so two calls within the same second give
    /// the same name; git rejects the second `worktree add`.
    pub fn at<Tz: TimeZone>(config: &Config, time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let timestamp = time.format(TIMESTAMP_FORMAT).to_string();
        let branch = branch_name(&config.namespace, &timestamp);
        let path = config.base_dir.join(directory_name(&branch));
        Self { branch, path }
    }
}

/// `<namespace>/sandbox/<timestamp>`
pub fn branch_name(namespace: &str, timestamp: &str) -> String {
    format!("{}/sandbox/{}", namespace, timestamp)
}

/// Flattens a branch name into a single path component.
pub fn directory_name(branch: &str) -> String {
    branch.replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> Config {
        let mut config = Config::new(PathBuf::from("/work/app"), "alice");
        config.base_dir = PathBuf::from("/boxes");
        config
    }

    #[test]
    fn name_embeds_timestamp_in_branch_and_path() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 9, 5, 7).unwrap();
        let name = SandboxName::at(&config(), &time);

        assert_eq!(name.branch, "alice/sandbox/20240102-090507");
        assert_eq!(
            name.path,
            PathBuf::from("/boxes/alice-sandbox-20240102-090507")
        );
    }

    #[test]
    fn same_second_yields_identical_names() {
        let first = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let later_same_second = first + chrono::Duration::milliseconds(900);

        assert_eq!(
            SandboxName::at(&config(), &first),
            SandboxName::at(&config(), &later_same_second)
        );
    }

    #[test]
    fn generated_directory_contains_default_marker() {
        let config = config();
        let name = SandboxName::generate(&config);
        assert!(name.path.to_string_lossy().contains(&config.marker));
        assert!(name.branch.starts_with("alice/sandbox/"));
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        let a = SandboxName::at(&config(), &earlier);
        let b = SandboxName::at(&config(), &later);
        assert!(a.path < b.path);
    }
}
