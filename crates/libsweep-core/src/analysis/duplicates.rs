/// Duplicate installations — the same directory name under two or more roots.
///
/// Three traversals share one finding model:
/// - [`report`] lists findings and touches nothing;
/// - [`resolve_dry_run`] adds a "would delete" line per location;
/// - [`resolve_interactive`] lets an [`Operator`] delete copies one at a
///   time, keeping the index in step with the filesystem.
///
/// The per-prompt decision is the pure function [`next_action`]; all input
/// comes through the operator and all removals through a [`Deleter`].
use crate::delete::{delete_installation, Deleter, DeletionOutcome};
use crate::model::{InstallationEntry, RootSet};
use crate::operator::{Choice, Operator};
use crate::scanner::InstallationIndex;
use compact_str::CompactString;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// One copy of a duplicated installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateLocation {
    pub root: CompactString,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

/// A name present under two or more roots, with its current locations in
/// discovery order. Menu numbers are positions in `locations`, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateFinding {
    pub name: CompactString,
    pub locations: Vec<DuplicateLocation>,
}

impl DuplicateFinding {
    fn from_entries(name: &str, entries: &[InstallationEntry], roots: &RootSet) -> Self {
        Self {
            name: CompactString::new(name),
            locations: entries
                .iter()
                .map(|e| DuplicateLocation {
                    root: CompactString::new(roots.name(e.root)),
                    path: e.path.clone(),
                    size_bytes: e.size_bytes,
                })
                .collect(),
        }
    }

    /// Bytes freed by keeping only the largest copy.
    ///
    /// `None` unless every location has a known size.
    pub fn reclaimable_bytes(&self) -> Option<u64> {
        let sizes: Option<Vec<u64>> = self.locations.iter().map(|l| l.size_bytes).collect();
        let sizes = sizes?;
        let largest = sizes.iter().copied().max()?;
        Some(sizes.iter().sum::<u64>() - largest)
    }
}

/// Everything that happened during one traversal, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DuplicateEvent {
    /// A finding was presented (initially, or again after a deletion).
    Finding(DuplicateFinding),
    /// Dry run: this location would have been offered for deletion.
    WouldDelete {
        name: CompactString,
        root: CompactString,
        path: PathBuf,
    },
    /// A location was deleted (or deletion was attempted).
    Deleted {
        name: CompactString,
        root: CompactString,
        path: PathBuf,
        outcome: DeletionOutcome,
    },
    /// The operator chose to skip; `remaining` copies were left alone.
    Skipped { name: CompactString, remaining: usize },
    /// The operator's reply was not a valid menu number; treated as a skip.
    InvalidSelection {
        name: CompactString,
        reply: String,
        remaining: usize,
    },
}

/// Ordered log of a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateResolution {
    pub events: Vec<DuplicateEvent>,
}

impl DuplicateResolution {
    /// Distinct names that were reported as duplicated.
    pub fn finding_count(&self) -> usize {
        let mut names: Vec<&CompactString> = self
            .events
            .iter()
            .filter_map(|e| match e {
                DuplicateEvent::Finding(f) => Some(&f.name),
                _ => None,
            })
            .collect();
        names.dedup();
        names.len()
    }

    /// Initial findings only (re-presentations after a deletion excluded).
    pub fn initial_findings(&self) -> Vec<&DuplicateFinding> {
        let mut seen: Vec<&CompactString> = Vec::new();
        let mut out = Vec::new();
        for event in &self.events {
            if let DuplicateEvent::Finding(f) = event {
                if !seen.contains(&&f.name) {
                    seen.push(&f.name);
                    out.push(f);
                }
            }
        }
        out
    }

    pub fn deletions(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.events.iter().filter_map(|e| match e {
            DuplicateEvent::Deleted { outcome, .. } => Some(outcome),
            _ => None,
        })
    }

    pub fn would_delete_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DuplicateEvent::WouldDelete { .. }))
            .count()
    }

    fn push(&mut self, event: DuplicateEvent, operator: Option<&mut dyn Operator>) {
        if let Some(op) = operator {
            op.duplicate_event(&event);
        }
        self.events.push(event);
    }
}

/// What to do after the operator answered a menu of `remaining` locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateAction {
    /// Delete the location at this 0-based position.
    Delete(usize),
    /// Stop processing this name.
    Skip,
    /// Reply was out of range or not a number; stop processing this name.
    Reject,
}

/// Decide the next step for one prompt.
pub fn next_action(remaining: usize, choice: &Choice) -> DuplicateAction {
    match *choice {
        Choice::Skip => DuplicateAction::Skip,
        Choice::Pick(n) if (1..=remaining).contains(&n) => DuplicateAction::Delete(n - 1),
        Choice::Pick(_) | Choice::Invalid(_) => DuplicateAction::Reject,
    }
}

/// Every name with two or more locations, in name order.
pub fn find_duplicates(index: &InstallationIndex, roots: &RootSet) -> Vec<DuplicateFinding> {
    index
        .iter()
        .filter(|(_, entries)| entries.len() >= 2)
        .map(|(name, entries)| DuplicateFinding::from_entries(name, entries, roots))
        .collect()
}

/// Report-only traversal: one `Finding` event per duplicated name.
pub fn report(index: &InstallationIndex, roots: &RootSet) -> DuplicateResolution {
    DuplicateResolution {
        events: find_duplicates(index, roots)
            .into_iter()
            .map(DuplicateEvent::Finding)
            .collect(),
    }
}

/// Dry-run traversal: every location of every finding gets a
/// `WouldDelete` event. Nothing is deleted and no input is needed.
pub fn resolve_dry_run(index: &InstallationIndex, roots: &RootSet) -> DuplicateResolution {
    let mut resolution = DuplicateResolution::default();
    for finding in find_duplicates(index, roots) {
        let name = finding.name.clone();
        let locations = finding.locations.clone();
        resolution.push(DuplicateEvent::Finding(finding), None);
        for location in locations {
            resolution.push(
                DuplicateEvent::WouldDelete {
                    name: name.clone(),
                    root: location.root,
                    path: location.path,
                },
                None,
            );
        }
    }
    resolution
}

/// Interactive traversal.
///
/// For each duplicated name the operator is shown the remaining locations
/// and picks one to delete or skips. After a successful deletion the index
/// loses that location; if two or more remain the reduced finding is shown
/// again, and once only one remains the name is done. A skip, an invalid
/// reply, or a failed directory removal ends the name, leaving what is left
/// untouched.
pub fn resolve_interactive(
    index: &mut InstallationIndex,
    roots: &RootSet,
    operator: &mut dyn Operator,
    deleter: &dyn Deleter,
) -> DuplicateResolution {
    let mut resolution = DuplicateResolution::default();

    for name in index.duplicated_names() {
        loop {
            let Some(entries) = index.get(&name) else {
                break;
            };
            if entries.len() < 2 {
                debug!("{name}: single copy left");
                break;
            }

            let finding = DuplicateFinding::from_entries(&name, entries, roots);
            let remaining = finding.locations.len();
            resolution.push(DuplicateEvent::Finding(finding.clone()), Some(&mut *operator));

            let choice = operator.choose_location(&finding);
            match next_action(remaining, &choice) {
                DuplicateAction::Skip => {
                    resolution.push(
                        DuplicateEvent::Skipped {
                            name: name.clone(),
                            remaining,
                        },
                        Some(&mut *operator),
                    );
                    break;
                }
                DuplicateAction::Reject => {
                    let reply = match choice {
                        Choice::Pick(n) => n.to_string(),
                        Choice::Invalid(raw) => raw,
                        Choice::Skip => String::from("0"),
                    };
                    resolution.push(
                        DuplicateEvent::InvalidSelection {
                            name: name.clone(),
                            reply,
                            remaining,
                        },
                        Some(&mut *operator),
                    );
                    break;
                }
                DuplicateAction::Delete(pos) => {
                    let target = entries[pos].clone();
                    let root_name = CompactString::new(roots.name(target.root));
                    info!("Deleting {} from {}", name, root_name);

                    let outcome = delete_installation(&target.path, &target.name, deleter);
                    let removed = outcome.directory_removed();
                    resolution.push(
                        DuplicateEvent::Deleted {
                            name: name.clone(),
                            root: root_name,
                            path: target.path.clone(),
                            outcome,
                        },
                        Some(&mut *operator),
                    );

                    if !removed {
                        break;
                    }
                    index.remove_location(&name, &target.path);
                }
            }
        }
    }

    resolution
}
