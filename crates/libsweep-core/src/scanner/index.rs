/// Installation index — every installation directory across all roots,
/// grouped by directory name.
///
/// Built once per run in a single discovery pass. After construction the
/// only mutation is [`InstallationIndex::remove_location`], which the
/// duplicate resolver calls after it has deleted a directory.
use crate::model::{InstallationEntry, RootSet};
use crate::platform::installation_dirs;
use crate::scanner::progress::ScanProgress;
use crate::scanner::usage::SizePolicy;
use compact_str::CompactString;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name → locations, in root-discovery order.
///
/// Keys are exact, case-sensitive directory basenames and iterate in
/// sorted order. A key is present only while at least one location
/// remains under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationIndex {
    entries: BTreeMap<CompactString, Vec<InstallationEntry>>,
}

impl InstallationIndex {
    /// List every root's installations directory and index the results.
    ///
    /// When `sizing` is enabled, directories are measured on a dedicated
    /// rayon pool. Sizes are written back into the entries by position, so
    /// location order is discovery order no matter which worker finishes
    /// first.
    pub fn build(
        roots: &RootSet,
        sizing: SizePolicy,
        progress: Option<&Sender<ScanProgress>>,
    ) -> Self {
        let start = Instant::now();
        let mut listed: Vec<InstallationEntry> = Vec::new();

        for (id, root) in roots.iter() {
            let dirs = installation_dirs(root);
            debug!("{}: {} installation(s)", root.name, dirs.len());
            send(
                progress,
                ScanProgress::RootListed {
                    root: root.name.clone(),
                    installations: dirs.len(),
                },
            );
            listed.extend(
                dirs.into_iter()
                    .map(|(name, path)| InstallationEntry::new(name, id, path)),
            );
        }

        if sizing.is_enabled() {
            measure_all(&mut listed, roots, sizing, progress);
        }

        let index = Self::from_entries(listed);
        let installations = index.location_count();
        let duration = start.elapsed();

        info!(
            "Indexed {} installation(s) under {} name(s) in {:?}",
            installations,
            index.len(),
            duration
        );
        send(
            progress,
            ScanProgress::Complete {
                roots: roots.len(),
                installations,
                duration,
            },
        );
        index
    }

    /// Group already-listed entries by name, preserving their order.
    pub fn from_entries(entries: impl IntoIterator<Item = InstallationEntry>) -> Self {
        let mut map: BTreeMap<CompactString, Vec<InstallationEntry>> = BTreeMap::new();
        for entry in entries {
            map.entry(entry.name.clone()).or_default().push(entry);
        }
        Self { entries: map }
    }

    /// Locations of `name`, in discovery order.
    pub fn get(&self, name: &str) -> Option<&[InstallationEntry]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate `(name, locations)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[InstallationEntry])> {
        self.entries
            .iter()
            .map(|(name, locations)| (name.as_str(), locations.as_slice()))
    }

    /// Names present under two or more roots, in name order.
    pub fn duplicated_names(&self) -> Vec<CompactString> {
        self.entries
            .iter()
            .filter(|(_, locations)| locations.len() >= 2)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Remove the location of `name` at `path`, returning it.
    ///
    /// The key itself disappears once its last location is removed.
    pub fn remove_location(&mut self, name: &str, path: &Path) -> Option<InstallationEntry> {
        let locations = self.entries.get_mut(name)?;
        let pos = locations.iter().position(|e| e.path == path)?;
        let removed = locations.remove(pos);
        if locations.is_empty() {
            self.entries.remove(name);
        }
        Some(removed)
    }

    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of locations across all names.
    pub fn location_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Measure every entry, in parallel where a pool can be built.
fn measure_all(
    entries: &mut [InstallationEntry],
    roots: &RootSet,
    sizing: SizePolicy,
    progress: Option<&Sender<ScanProgress>>,
) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("libsweep-sizer-{i}"))
        .build();

    match pool {
        Ok(pool) => pool.install(|| measure_entries(entries, roots, sizing, progress)),
        Err(err) => {
            warn!("Could not build sizing pool ({err}); using the global pool");
            measure_entries(entries, roots, sizing, progress);
        }
    }
}

fn measure_entries(
    entries: &mut [InstallationEntry],
    roots: &RootSet,
    sizing: SizePolicy,
    progress: Option<&Sender<ScanProgress>>,
) {
    entries.par_iter_mut().for_each(|entry| {
        entry.size_bytes = sizing.measure(&entry.path);
        send(
            progress,
            ScanProgress::Sized {
                root: roots.get(entry.root).name.clone(),
                name: entry.name.clone(),
                size_bytes: entry.size_bytes,
            },
        );
    });
}

#[inline]
fn send(progress: Option<&Sender<ScanProgress>>, message: ScanProgress) {
    if let Some(tx) = progress {
        let _ = tx.send(message);
    }
}
