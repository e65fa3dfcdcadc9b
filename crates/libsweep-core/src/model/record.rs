/// Parsed manifest metadata.
use super::root::RootId;
use std::path::PathBuf;

/// The three fields libsweep reads from an `appmanifest_<id>.acf` file,
/// plus where the file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Taken verbatim from the file name; never validated as a number.
    pub app_id: String,

    /// The `name` key, falling back to `install_dir` when absent.
    pub display_name: Option<String>,

    /// The `installdir` key. `None` means the record cannot be validated
    /// against any directory and is always treated as orphaned.
    pub install_dir: Option<String>,

    pub root: RootId,
    pub file_path: PathBuf,
}
