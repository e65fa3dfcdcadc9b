/// A single installation directory found under a root.
use super::root::RootId;
use compact_str::CompactString;
use std::path::PathBuf;

/// One installed title's directory on one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationEntry {
    /// Directory basename. This is the index key and the value matched
    /// against a manifest's `installdir`.
    pub name: CompactString,

    /// Root the directory was found under.
    pub root: RootId,

    /// Full path of the installation directory.
    pub path: PathBuf,

    /// Bytes used under `path`. `None` when sizing is disabled or the
    /// directory could not be measured.
    pub size_bytes: Option<u64>,
}

impl InstallationEntry {
    pub fn new(name: impl Into<CompactString>, root: RootId, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root,
            path: path.into(),
            size_bytes: None,
        }
    }

    /// Builder-style setter for a known size.
    pub fn with_size(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }
}
