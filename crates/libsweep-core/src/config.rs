/// Scan configuration — which mount parents and internal root to look at,
/// and whether to measure installation sizes.
use crate::scanner::usage::SizePolicy;
use std::env;
use std::path::{Path, PathBuf};

/// Mount parents that do not depend on the user name.
const SYSTEM_MOUNT_PARENTS: &[&str] = &["/run/media"];

/// Internal library location relative to `$HOME`.
const INTERNAL_LIBRARY_RELATIVE: &str = ".local/share/Steam";

/// Everything discovery and indexing need to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directories whose immediate subdirectories are candidate external roots,
    /// searched in this order.
    pub mount_parents: Vec<PathBuf>,

    /// The internal storage root. `None` when it cannot be determined
    /// (e.g. `$HOME` unset); the scan then covers external roots only.
    pub internal_root: Option<PathBuf>,

    pub sizing: SizePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ScanConfig {
    /// Platform defaults derived from `$HOME` and `$USER`.
    pub fn from_env() -> Self {
        let home = env::var_os("HOME").map(PathBuf::from);
        let user = env::var("USER").ok();
        Self::for_user(home.as_deref(), user.as_deref())
    }

    /// Defaults for the given home directory and user name.
    ///
    /// Removable media is looked for under `/run/media`, `/run/media/<user>`
    /// and `/media/<user>`; the internal library is `<home>/.local/share/Steam`.
    pub fn for_user(home: Option<&Path>, user: Option<&str>) -> Self {
        let mut mount_parents: Vec<PathBuf> =
            SYSTEM_MOUNT_PARENTS.iter().map(PathBuf::from).collect();
        if let Some(user) = user.filter(|u| !u.is_empty()) {
            mount_parents.push(Path::new("/run/media").join(user));
            mount_parents.push(Path::new("/media").join(user));
        }

        Self {
            mount_parents,
            internal_root: home.map(|h| h.join(INTERNAL_LIBRARY_RELATIVE)),
            sizing: SizePolicy::Disabled,
        }
    }

    /// Explicit configuration, mostly for tests and overrides.
    pub fn new(mount_parents: Vec<PathBuf>, internal_root: Option<PathBuf>) -> Self {
        Self {
            mount_parents,
            internal_root,
            sizing: SizePolicy::Disabled,
        }
    }

    pub fn with_sizing(mut self, sizing: SizePolicy) -> Self {
        self.sizing = sizing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_user() {
        let config = ScanConfig::for_user(Some(Path::new("/home/deck")), Some("deck"));
        assert_eq!(
            config.mount_parents,
            vec![
                PathBuf::from("/run/media"),
                PathBuf::from("/run/media/deck"),
                PathBuf::from("/media/deck"),
            ]
        );
        assert_eq!(
            config.internal_root,
            Some(PathBuf::from("/home/deck/.local/share/Steam"))
        );
        assert_eq!(config.sizing, SizePolicy::Disabled);
    }

    #[test]
    fn no_home_means_no_internal_root() {
        let config = ScanConfig::for_user(None, None);
        assert_eq!(config.mount_parents, vec![PathBuf::from("/run/media")]);
        assert_eq!(config.internal_root, None);
    }
}
