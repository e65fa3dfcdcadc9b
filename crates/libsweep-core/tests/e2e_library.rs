/// End-to-end engine tests against real library layouts.
///
/// Every test builds actual `steamapps/common` trees and `appmanifest_*.acf`
/// files in a `TempDir`, runs discovery, indexing and the resolvers exactly
/// as the CLI does, and checks the filesystem afterwards. The only doubles
/// are scripted operators standing in for a person at the keyboard.
use libsweep_core::analysis::{
    duplicates, orphans, DuplicateEvent, DuplicateFinding, OrphanEvent, OrphanFinding,
};
use libsweep_core::delete::{DeletionOutcome, FsDeleter};
use libsweep_core::operator::{Choice, Operator};
use libsweep_core::platform::discover_roots;
use libsweep_core::scanner::{progress_channel, InstallationIndex, ScanProgress, SizePolicy};
use libsweep_core::ScanConfig;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A temp directory holding `media/` (one mount parent) and `internal/`.
struct Fixture {
    _tmp: TempDir,
    base: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let base = tmp.path().canonicalize().unwrap();
        Self { _tmp: tmp, base }
    }

    fn external(&self, name: &str) -> PathBuf {
        self.base.join("media").join(name)
    }

    fn internal(&self) -> PathBuf {
        self.base.join("internal")
    }

    fn config(&self) -> ScanConfig {
        ScanConfig::new(vec![self.base.join("media")], Some(self.internal()))
    }
}

/// Create `<root>/steamapps/common/<game>` with `bytes` of payload.
fn add_game(root: &Path, game: &str, bytes: usize) {
    let dir = root.join("steamapps").join("common").join(game);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("payload.bin"), vec![7u8; bytes]).unwrap();
}

/// Write `<root>/steamapps/appmanifest_<id>.acf`.
fn add_manifest(root: &Path, id: &str, name: Option<&str>, install_dir: Option<&str>) {
    let lib = root.join("steamapps");
    fs::create_dir_all(lib.join("common")).unwrap();
    let mut body = format!("\"AppState\"\n{{\n\t\"appid\"\t\t\"{id}\"\n");
    if let Some(name) = name {
        body.push_str(&format!("\t\"name\"\t\t\"{name}\"\n"));
    }
    if let Some(dir) = install_dir {
        body.push_str(&format!("\t\"installdir\"\t\t\"{dir}\"\n"));
    }
    body.push_str("}\n");
    fs::write(lib.join(format!("appmanifest_{id}.acf")), body).unwrap();
}

fn manifest_path(root: &Path, id: &str) -> PathBuf {
    root.join("steamapps").join(format!("appmanifest_{id}.acf"))
}

/// Every path under `dir` with file contents (directories map to `None`).
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                out.insert(path.clone(), None);
                stack.push(path);
            } else {
                out.insert(path.clone(), Some(fs::read(&path).unwrap()));
            }
        }
    }
    out
}

/// Answers from a fixed script; runs out as "skip" / "no".
#[derive(Default)]
struct ScriptedOperator {
    choices: VecDeque<Choice>,
    confirmations: VecDeque<bool>,
    menus_seen: Vec<usize>,
}

impl ScriptedOperator {
    fn choosing(choices: Vec<Choice>) -> Self {
        Self {
            choices: choices.into(),
            ..Self::default()
        }
    }

    fn confirming(answers: Vec<bool>) -> Self {
        Self {
            confirmations: answers.into(),
            ..Self::default()
        }
    }
}

impl Operator for ScriptedOperator {
    fn choose_location(&mut self, finding: &DuplicateFinding) -> Choice {
        self.menus_seen.push(finding.locations.len());
        self.choices.pop_front().unwrap_or(Choice::Skip)
    }

    fn confirm_orphan(&mut self, _finding: &OrphanFinding) -> bool {
        self.confirmations.pop_front().unwrap_or(false)
    }
}

// ── Discovery and indexing ───────────────────────────────────────────────────

/// A name present under N roots maps to exactly N entries, externals in
/// enumeration order and the internal root last.
#[test]
fn index_lists_every_root_in_discovery_order() {
    let fx = Fixture::new();
    for ext in ["B-Drive", "A-Drive", "SD"] {
        add_game(&fx.external(ext), "GameX", 10);
    }
    add_game(&fx.internal(), "GameX", 10);
    add_game(&fx.internal(), "Solo", 10);

    let roots = discover_roots(&fx.config());
    let index = InstallationIndex::build(&roots, SizePolicy::Disabled, None);

    let order: Vec<&str> = index
        .get("GameX")
        .unwrap()
        .iter()
        .map(|e| roots.name(e.root))
        .collect();
    assert_eq!(order, vec!["A-Drive", "B-Drive", "SD", "internal"]);
    assert_eq!(index.get("Solo").unwrap().len(), 1);
    assert!(index.get("GameX").unwrap().iter().all(|e| e.size_bytes.is_none()));
}

/// No mount parent, no internal storage: the scan completes with nothing.
#[test]
fn nothing_discovered_means_zero_findings() {
    let fx = Fixture::new();
    let roots = discover_roots(&fx.config());
    assert!(roots.is_empty());

    let index = InstallationIndex::build(&roots, SizePolicy::Enabled { follow_links: false }, None);
    assert!(index.is_empty());
    assert!(duplicates::find_duplicates(&index, &roots).is_empty());
    assert!(orphans::find_orphans(&roots).is_empty());
}

/// With sizing on, every entry is measured and progress is reported.
#[test]
fn sizing_reports_progress_and_sizes() {
    let fx = Fixture::new();
    add_game(&fx.external("SD"), "GameX", 64 * 1024);
    add_game(&fx.internal(), "GameX", 64 * 1024);

    let roots = discover_roots(&fx.config());
    let (tx, rx) = progress_channel();
    let index = InstallationIndex::build(
        &roots,
        SizePolicy::Enabled { follow_links: false },
        Some(&tx),
    );
    drop(tx);

    let messages: Vec<ScanProgress> = rx.iter().collect();
    let sized = messages
        .iter()
        .filter(|m| matches!(m, ScanProgress::Sized { .. }))
        .count();
    assert_eq!(sized, 2);
    assert!(matches!(
        messages.last(),
        Some(ScanProgress::Complete { installations: 2, .. })
    ));
    assert!(index.get("GameX").unwrap().iter().all(|e| e.size_bytes.is_some()));
}

// ── Duplicates ───────────────────────────────────────────────────────────────

/// Roots [SD, internal] both hold GameX. Choosing location 1 removes the
/// SD copy and its manifest; GameX is no longer a duplicate afterwards.
#[test]
fn deleting_first_location_removes_directory_and_manifest() {
    let fx = Fixture::new();
    let sd = fx.external("SD");
    add_game(&sd, "GameX", 4096);
    add_manifest(&sd, "100", Some("Game X"), Some("GameX"));
    add_game(&fx.internal(), "GameX", 4096);
    add_manifest(&fx.internal(), "100", Some("Game X"), Some("GameX"));

    let roots = discover_roots(&fx.config());
    let mut index = InstallationIndex::build(
        &roots,
        SizePolicy::Enabled { follow_links: false },
        None,
    );

    let findings = duplicates::find_duplicates(&index, &roots);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].name, "GameX");
    assert_eq!(findings[0].locations.len(), 2);
    assert_eq!(findings[0].locations[0].root, "SD");

    let mut operator = ScriptedOperator::choosing(vec![Choice::Pick(1)]);
    let resolution = duplicates::resolve_interactive(&mut index, &roots, &mut operator, &FsDeleter);

    assert_eq!(operator.menus_seen, vec![2]);
    assert!(!sd.join("steamapps/common/GameX").exists());
    assert!(!manifest_path(&sd, "100").exists());
    assert!(fx.internal().join("steamapps/common/GameX").exists());
    assert!(manifest_path(&fx.internal(), "100").exists());

    let outcomes: Vec<&DeletionOutcome> = resolution.deletions().collect();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_complete());

    assert!(duplicates::find_duplicates(&index, &roots).is_empty());
    let rebuilt = InstallationIndex::build(&roots, SizePolicy::Disabled, None);
    assert!(duplicates::find_duplicates(&rebuilt, &roots).is_empty());
}

/// A deleted copy with no matching manifest is reported as such, not as a
/// directory failure.
#[test]
fn missing_manifest_is_distinguished_from_directory_failure() {
    let fx = Fixture::new();
    let sd = fx.external("SD");
    add_game(&sd, "GameX", 16);
    add_manifest(&sd, "7", Some("Other"), Some("OtherGame"));
    add_game(&fx.internal(), "GameX", 16);

    let roots = discover_roots(&fx.config());
    let mut index = InstallationIndex::build(&roots, SizePolicy::Disabled, None);
    let mut operator = ScriptedOperator::choosing(vec![Choice::Pick(1)]);
    let resolution = duplicates::resolve_interactive(&mut index, &roots, &mut operator, &FsDeleter);

    let outcome = resolution.deletions().next().unwrap();
    assert_eq!(*outcome, DeletionOutcome::ManifestNotFound);
    assert!(!sd.join("steamapps/common/GameX").exists());
    assert!(manifest_path(&sd, "7").exists());
}

/// Non-numeric input aborts that name only; later names are still offered.
#[test]
fn invalid_input_skips_only_the_current_name() {
    let fx = Fixture::new();
    for game in ["Alpha", "Beta"] {
        add_game(&fx.external("SD"), game, 16);
        add_game(&fx.internal(), game, 16);
    }

    let roots = discover_roots(&fx.config());
    let mut index = InstallationIndex::build(&roots, SizePolicy::Disabled, None);
    let mut operator = ScriptedOperator::choosing(vec![Choice::Invalid("x".into()), Choice::Pick(2)]);
    let resolution = duplicates::resolve_interactive(&mut index, &roots, &mut operator, &FsDeleter);

    assert_eq!(operator.menus_seen, vec![2, 2]);
    assert!(matches!(
        resolution.events[1],
        DuplicateEvent::InvalidSelection { ref name, .. } if name == "Alpha"
    ));
    assert!(fx.external("SD").join("steamapps/common/Alpha").exists());
    assert!(fx.internal().join("steamapps/common/Alpha").exists());
    assert!(fx.external("SD").join("steamapps/common/Beta").exists());
    assert!(!fx.internal().join("steamapps/common/Beta").exists());
}

// ── Orphans ──────────────────────────────────────────────────────────────────

/// `appmanifest_500.acf` declares GhostGame, which does not exist.
#[test]
fn ghost_manifest_is_reported() {
    let fx = Fixture::new();
    add_manifest(&fx.internal(), "500", None, Some("GhostGame"));
    add_game(&fx.internal(), "RealGame", 16);
    add_manifest(&fx.internal(), "600", Some("Real Game"), Some("RealGame"));

    let roots = discover_roots(&fx.config());
    let findings = orphans::find_orphans(&roots);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].app_id, "500");
    assert_eq!(findings[0].display_name.as_deref(), Some("GhostGame"));
    assert_eq!(findings[0].root, "internal");
    assert_eq!(findings[0].reason, orphans::OrphanReason::MissingDirectory);
}

/// A manifest without `installdir` is orphaned even when directories exist.
#[test]
fn manifest_without_installdir_is_orphaned() {
    let fx = Fixture::new();
    add_game(&fx.internal(), "GameX", 16);
    add_manifest(&fx.internal(), "42", Some("GameX"), None);

    let roots = discover_roots(&fx.config());
    let findings = orphans::find_orphans(&roots);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].reason, orphans::OrphanReason::NoInstallDir);
    assert_eq!(findings[0].label(), "GameX");
}

/// Interactive orphan deletion removes only confirmed manifests.
#[test]
fn orphan_deletion_removes_only_the_manifest() {
    let fx = Fixture::new();
    add_manifest(&fx.internal(), "1", None, Some("GoneA"));
    add_manifest(&fx.internal(), "2", None, Some("GoneB"));

    let roots = discover_roots(&fx.config());
    let findings = orphans::find_orphans(&roots);
    let mut operator = ScriptedOperator::confirming(vec![true, false]);
    let resolution = orphans::resolve_interactive(findings, &mut operator, &FsDeleter);

    assert_eq!(resolution.deleted_count(), 1);
    assert!(!manifest_path(&fx.internal(), "1").exists());
    assert!(manifest_path(&fx.internal(), "2").exists());
    assert!(fx.internal().join("steamapps/common").is_dir());
    assert!(matches!(
        resolution.events.last(),
        Some(OrphanEvent::Skipped { .. })
    ));
}

// ── Dry run ──────────────────────────────────────────────────────────────────

/// Dry runs report every location and orphan but leave every byte in place.
#[test]
fn dry_run_leaves_filesystem_untouched() {
    let fx = Fixture::new();
    let sd = fx.external("SD");
    add_game(&sd, "GameX", 1024);
    add_manifest(&sd, "100", Some("Game X"), Some("GameX"));
    add_game(&fx.internal(), "GameX", 1024);
    add_manifest(&fx.internal(), "100", Some("Game X"), Some("GameX"));
    add_manifest(&fx.internal(), "500", None, Some("GhostGame"));

    let before = snapshot(&fx.base);

    let roots = discover_roots(&fx.config());
    let index = InstallationIndex::build(&roots, SizePolicy::Enabled { follow_links: false }, None);
    let dupes = duplicates::resolve_dry_run(&index, &roots);
    let orphaned = orphans::resolve_dry_run(orphans::find_orphans(&roots));

    assert_eq!(dupes.would_delete_count(), 2);
    assert_eq!(dupes.deletions().count(), 0);
    assert_eq!(orphaned.would_delete_count(), 1);
    assert_eq!(snapshot(&fx.base), before);
}
