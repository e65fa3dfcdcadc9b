/// Paired deletion of an installation directory and its manifest.
///
/// A directory and the manifest that points at it are two halves of one
/// library entry. Deleting one without attempting the other leaves the
/// library inconsistent, so [`delete_installation`] always:
///
/// 1. looks up the paired manifest in `<root>/steamapps` (the parent of the
///    installations directory) by matching `installdir` against the name;
/// 2. removes the directory; a failure here stops everything and is the
///    dominant result;
/// 3. removes the manifest if one matched, or reports that none did.
///
/// Each call is its own unit; nothing is rolled back if a later call fails.
use crate::error::DeleteError;
use crate::manifest::read_install_dir;
use crate::platform::manifest_files_in;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The two removal primitives, behind a trait so tests can observe or fail them.
pub trait Deleter {
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Deletes from the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDeleter;

impl Deleter for FsDeleter {
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Result of one paired deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Directory and manifest both removed.
    Deleted { manifest: PathBuf },
    /// Directory removed; no manifest declared this install directory.
    /// The library may need manual correction.
    ManifestNotFound,
    /// Directory removed; the matching manifest could not be.
    ManifestFailed { manifest: PathBuf, error: String },
    /// Directory could not be removed. The manifest was not touched.
    DirectoryFailed { error: String },
}

impl DeletionOutcome {
    /// Returns `true` if the installation directory is gone.
    pub fn directory_removed(&self) -> bool {
        !matches!(self, Self::DirectoryFailed { .. })
    }

    /// Returns `true` if both halves were removed.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Returns `true` if either removal hit an error.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DirectoryFailed { .. } | Self::ManifestFailed { .. })
    }

    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => "deleted",
            Self::ManifestNotFound => "deleted, manifest not found",
            Self::ManifestFailed { .. } => "deleted, manifest removal failed",
            Self::DirectoryFailed { .. } => "directory removal failed",
        }
    }
}

/// The directory holding manifests for an installation path:
/// `<root>/steamapps/common/<name>` → `<root>/steamapps`.
pub fn manifest_dir_for(installation_path: &Path) -> Option<&Path> {
    installation_path.parent()?.parent()
}

/// First manifest, in file-name order, whose `installdir` equals `name`.
///
/// If several manifests declare the same install directory, the first one
/// wins. Unreadable manifests are logged and passed over.
pub fn find_paired_manifest(installation_path: &Path, name: &str) -> Option<PathBuf> {
    let library_dir = manifest_dir_for(installation_path)?;
    manifest_files_in(library_dir)
        .into_iter()
        .find(|path| match read_install_dir(path) {
            Ok(install_dir) => install_dir.as_deref() == Some(name),
            Err(err) => {
                warn!("{err}");
                false
            }
        })
}

/// Delete the installation at `path` (named `name`) and its paired manifest.
pub fn delete_installation(path: &Path, name: &str, deleter: &dyn Deleter) -> DeletionOutcome {
    let manifest = find_paired_manifest(path, name);

    if let Err(err) = remove_installation_dir(path, name, deleter) {
        warn!("{err}");
        return DeletionOutcome::DirectoryFailed {
            error: err.to_string(),
        };
    }
    info!(path = %path.display(), "deleted installation directory");

    let Some(manifest) = manifest else {
        warn!(
            "No manifest declares installdir '{}' next to {}; the library may need manual correction",
            name,
            path.display()
        );
        return DeletionOutcome::ManifestNotFound;
    };

    match delete_manifest(&manifest, deleter) {
        Ok(()) => DeletionOutcome::Deleted { manifest },
        Err(err) => {
            warn!("{err}");
            DeletionOutcome::ManifestFailed {
                manifest,
                error: err.to_string(),
            }
        }
    }
}

/// Remove a single manifest file.
pub fn delete_manifest(path: &Path, deleter: &dyn Deleter) -> Result<(), DeleteError> {
    deleter
        .remove_file(path)
        .map_err(|source| DeleteError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
    info!(manifest = %path.display(), "deleted manifest");
    Ok(())
}

fn remove_installation_dir(path: &Path, name: &str, deleter: &dyn Deleter) -> Result<(), DeleteError> {
    // Only ever remove a directory whose basename is the indexed name.
    if path.file_name().and_then(|n| n.to_str()) != Some(name) {
        return Err(DeleteError::Refused {
            path: path.to_path_buf(),
            reason: format!("path does not end in '{name}'"),
        });
    }
    deleter
        .remove_dir_all(path)
        .map_err(|source| DeleteError::Directory {
            path: path.to_path_buf(),
            source,
        })
}
