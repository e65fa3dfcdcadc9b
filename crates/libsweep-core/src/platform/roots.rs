/// Storage-root discovery and per-root directory listings.
///
/// External roots are the immediate subdirectories of each configured mount
/// parent; the internal root comes last. A candidate only becomes a root if
/// it has a `steamapps/common` directory. Everything that is missing is a
/// normal outcome: it is logged and skipped, never reported as an error.
use crate::config::ScanConfig;
use crate::manifest::is_manifest_file_name;
use crate::model::root::INTERNAL_ROOT_NAME;
use crate::model::{RootKind, RootSet, StorageRoot};
use compact_str::CompactString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Discover every storage root hosting a library, in discovery order.
///
/// The same directory reached twice (overlapping mount parents, a symlinked
/// internal library) is only added once: a root listed twice would make
/// every title it holds look like a duplicate of itself.
pub fn discover_roots(config: &ScanConfig) -> RootSet {
    let mut roots = RootSet::new();

    for parent in &config.mount_parents {
        for candidate in subdirectories(parent) {
            let name = file_name_of(&candidate);
            add_if_library(
                &mut roots,
                StorageRoot::new(name, candidate, RootKind::External),
            );
        }
    }

    match &config.internal_root {
        Some(internal) if internal.is_dir() => add_if_library(
            &mut roots,
            StorageRoot::new(INTERNAL_ROOT_NAME, internal.clone(), RootKind::Internal),
        ),
        Some(internal) => info!("Internal storage not found at {}", internal.display()),
        None => info!("No internal storage root configured"),
    }

    info!("Discovered {} storage root(s)", roots.len());
    roots
}

fn add_if_library(roots: &mut RootSet, root: StorageRoot) {
    if !root.hosts_library() {
        debug!("Skipping {}: no library", root.base_path.display());
        return;
    }

    let canonical = fs::canonicalize(&root.base_path).unwrap_or_else(|_| root.base_path.clone());
    if roots.contains_path(&canonical) {
        debug!("Skipping {}: already discovered", root.base_path.display());
        return;
    }

    info!(
        "{} root '{}' at {}",
        root.kind.label(),
        root.name,
        root.base_path.display()
    );
    roots.push(StorageRoot {
        base_path: canonical,
        ..root
    });
}

/// Installation directories directly under the root's installations
/// directory, sorted by name.
pub fn installation_dirs(root: &StorageRoot) -> Vec<(CompactString, PathBuf)> {
    subdirectories(&root.installations_dir())
        .into_iter()
        .map(|path| (file_name_of(&path), path))
        .collect()
}

/// Manifest files directly under the root's library directory.
pub fn manifest_files(root: &StorageRoot) -> Vec<PathBuf> {
    manifest_files_in(&root.library_dir())
}

/// `appmanifest_*.acf` files directly under `library_dir`, sorted by file
/// name. This is the enumeration order used whenever "first manifest"
/// matters.
pub fn manifest_files_in(library_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(library_dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Cannot list {}: {err}", library_dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(is_manifest_file_name)
        })
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}

/// Immediate subdirectories of `dir`, sorted by path. Symlinks to
/// directories count as directories. A missing or unreadable `dir`
/// yields an empty list.
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("{} does not exist, skipping", dir.display());
            return Vec::new();
        }
        Err(err) => {
            warn!("Cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn file_name_of(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_default()
}
