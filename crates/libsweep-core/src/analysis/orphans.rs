/// Orphaned manifests — records whose install directory does not exist.
///
/// Every finding is independent of installation-directory state, so
/// deleting one never changes whether another is orphaned; findings are
/// processed strictly one at a time in discovery order with no re-scan.
/// Deleting an orphan removes only the manifest file.
use crate::delete::{delete_manifest, Deleter};
use crate::manifest::read_manifest;
use crate::model::{ManifestRecord, RootSet};
use crate::operator::Operator;
use crate::platform::manifest_files;
use compact_str::CompactString;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a manifest was classified as orphaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// The manifest has no `installdir` key, so it can't be validated.
    NoInstallDir,
    /// `installdir` names a directory that does not exist.
    MissingDirectory,
}

impl OrphanReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::NoInstallDir => "no installdir",
            Self::MissingDirectory => "directory missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanFinding {
    pub app_id: String,
    pub display_name: Option<String>,
    pub install_dir: Option<String>,
    pub file_path: PathBuf,
    pub root: CompactString,
    pub reason: OrphanReason,
}

impl OrphanFinding {
    /// Display name, or the app id when the manifest had neither key.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.app_id)
    }
}

/// Classify one record against its root's installations directory.
///
/// Returns `None` when the record's `installdir` exactly names an existing
/// directory directly under `installations_dir`. Values that are not a
/// single plain name (empty, `.`, `..`, absolute, nested) never do.
pub fn classify(record: &ManifestRecord, installations_dir: &Path) -> Option<OrphanReason> {
    match record.install_dir.as_deref() {
        None => Some(OrphanReason::NoInstallDir),
        Some(dir) if is_plain_name(dir) && installations_dir.join(dir).is_dir() => None,
        Some(_) => Some(OrphanReason::MissingDirectory),
    }
}

/// Exactly one normal path component, spelled exactly as given.
fn is_plain_name(dir: &str) -> bool {
    let mut components = Path::new(dir).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == dir
    )
}

/// Read every manifest of every root and collect the orphans, in root
/// discovery order then manifest file-name order.
///
/// Manifests that cannot be read at all are logged and skipped.
pub fn find_orphans(roots: &RootSet) -> Vec<OrphanFinding> {
    let mut findings = Vec::new();

    for (id, root) in roots.iter() {
        let installations_dir = root.installations_dir();
        let files = manifest_files(root);
        debug!("{}: {} manifest(s)", root.name, files.len());

        for path in files {
            let record = match read_manifest(&path, id) {
                Ok(record) => record,
                Err(err) => {
                    warn!("{err}");
                    continue;
                }
            };
            if let Some(reason) = classify(&record, &installations_dir) {
                findings.push(OrphanFinding {
                    app_id: record.app_id,
                    display_name: record.display_name,
                    install_dir: record.install_dir,
                    file_path: record.file_path,
                    root: root.name.clone(),
                    reason,
                });
            }
        }
    }

    info!("Found {} orphaned manifest(s)", findings.len());
    findings
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrphanEvent {
    Finding(OrphanFinding),
    WouldDelete { file_path: PathBuf },
    Deleted { file_path: PathBuf },
    DeleteFailed { file_path: PathBuf, error: String },
    Skipped { file_path: PathBuf },
}

/// Ordered log of an orphan traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanResolution {
    pub events: Vec<OrphanEvent>,
}

impl OrphanResolution {
    pub fn findings(&self) -> impl Iterator<Item = &OrphanFinding> {
        self.events.iter().filter_map(|e| match e {
            OrphanEvent::Finding(f) => Some(f),
            _ => None,
        })
    }

    pub fn deleted_count(&self) -> usize {
        self.count(|e| matches!(e, OrphanEvent::Deleted { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|e| matches!(e, OrphanEvent::DeleteFailed { .. }))
    }

    pub fn would_delete_count(&self) -> usize {
        self.count(|e| matches!(e, OrphanEvent::WouldDelete { .. }))
    }

    fn count(&self, pred: impl Fn(&OrphanEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn push(&mut self, event: OrphanEvent, operator: Option<&mut dyn Operator>) {
        if let Some(op) = operator {
            op.orphan_event(&event);
        }
        self.events.push(event);
    }
}

/// Report-only traversal.
pub fn report(findings: Vec<OrphanFinding>) -> OrphanResolution {
    OrphanResolution {
        events: findings.into_iter().map(OrphanEvent::Finding).collect(),
    }
}

/// Dry run: a `WouldDelete` after every finding; nothing is removed.
pub fn resolve_dry_run(findings: Vec<OrphanFinding>) -> OrphanResolution {
    let mut resolution = OrphanResolution::default();
    for finding in findings {
        let file_path = finding.file_path.clone();
        resolution.push(OrphanEvent::Finding(finding), None);
        resolution.push(OrphanEvent::WouldDelete { file_path }, None);
    }
    resolution
}

/// Ask the operator about each finding in turn; delete the manifest on yes.
pub fn resolve_interactive(
    findings: Vec<OrphanFinding>,
    operator: &mut dyn Operator,
    deleter: &dyn Deleter,
) -> OrphanResolution {
    let mut resolution = OrphanResolution::default();

    for finding in findings {
        let file_path = finding.file_path.clone();
        resolution.push(OrphanEvent::Finding(finding.clone()), Some(&mut *operator));
        let confirmed = operator.confirm_orphan(&finding);

        let event = if !confirmed {
            OrphanEvent::Skipped { file_path }
        } else {
            match delete_manifest(&file_path, deleter) {
                Ok(()) => OrphanEvent::Deleted { file_path },
                Err(err) => {
                    warn!("{err}");
                    OrphanEvent::DeleteFailed {
                        file_path,
                        error: err.to_string(),
                    }
                }
            }
        };
        resolution.push(event, Some(&mut *operator));
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RootId;

    fn record(install_dir: Option<&str>) -> ManifestRecord {
        ManifestRecord {
            app_id: "500".into(),
            display_name: install_dir.map(String::from),
            install_dir: install_dir.map(String::from),
            root: RootId(0),
            file_path: PathBuf::from("appmanifest_500.acf"),
        }
    }

    #[test]
    fn missing_installdir_is_always_orphaned() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert_eq!(
            classify(&record(None), tmp.path()),
            Some(OrphanReason::NoInstallDir)
        );
    }

    #[test]
    fn existing_directory_is_never_orphaned() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("GameX")).unwrap();
        assert_eq!(classify(&record(Some("GameX")), tmp.path()), None);
        assert_eq!(
            classify(&record(Some("gamex")), tmp.path()),
            Some(OrphanReason::MissingDirectory)
        );
    }

    #[test]
    fn installdir_must_be_a_single_plain_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let common = tmp.path().join("steamapps").join("common");
        std::fs::create_dir_all(common.join("GameX").join("bin")).unwrap();

        for dir in ["", ".", "..", "/", "./GameX", "GameX/", "GameX/bin", "../common"] {
            assert_eq!(
                classify(&record(Some(dir)), &common),
                Some(OrphanReason::MissingDirectory),
                "installdir {dir:?}"
            );
        }
        assert_eq!(classify(&record(Some("GameX")), &common), None);
    }

    #[test]
    fn file_with_installdir_name_is_not_a_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("GameX"), "").unwrap();
        assert_eq!(
            classify(&record(Some("GameX")), tmp.path()),
            Some(OrphanReason::MissingDirectory)
        );
    }
}
