/// Report rendering — text for people, JSON and CSV for scripts.
///
/// The resolvers return ordered event logs; this module only formats them.
/// Text lines for individual events are shared with the interactive prompt
/// so live output and after-the-fact reports read the same.
use crate::args::Mode;
use chrono::{DateTime, Local};
use clap::ValueEnum;
use libsweep_core::analysis::{
    DuplicateEvent, DuplicateResolution, OrphanEvent, OrphanResolution,
};
use libsweep_core::delete::DeletionOutcome;
use libsweep_core::model::size::{format_count, format_size, format_size_opt, UNKNOWN_SIZE};
use libsweep_core::model::{RootKind, RootSet};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document.
    Json,
    /// One CSV row per event.
    Csv,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootSummary {
    pub name: String,
    pub path: PathBuf,
    pub kind: RootKind,
}

/// Totals printed at the end of every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub roots: usize,
    pub duplicate_findings: usize,
    /// Sum over duplicates of all but the largest copy. `None` when any
    /// duplicate's size is unknown.
    pub reclaimable_bytes: Option<u64>,
    pub orphan_findings: usize,
    pub deletions_performed: usize,
    pub deletions_failed: usize,
}

impl Summary {
    fn collect(
        roots: usize,
        duplicates: Option<&DuplicateResolution>,
        orphans: Option<&OrphanResolution>,
    ) -> Self {
        let mut summary = Self {
            roots,
            reclaimable_bytes: Some(0),
            ..Self::default()
        };

        if let Some(dupes) = duplicates {
            let findings = dupes.initial_findings();
            summary.duplicate_findings = findings.len();
            summary.reclaimable_bytes = findings
                .iter()
                .map(|f| f.reclaimable_bytes())
                .sum::<Option<u64>>();
            for outcome in dupes.deletions() {
                if outcome.is_failure() {
                    summary.deletions_failed += 1;
                } else {
                    summary.deletions_performed += 1;
                }
            }
        }

        if let Some(orphans) = orphans {
            summary.orphan_findings = orphans.findings().count();
            summary.deletions_performed += orphans.deleted_count();
            summary.deletions_failed += orphans.failed_count();
        }

        summary
    }
}

/// Everything one run found and did.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub mode: Mode,
    pub roots: Vec<RootSummary>,
    pub duplicates: Option<DuplicateResolution>,
    pub orphans: Option<OrphanResolution>,
    pub summary: Summary,
}

impl Report {
    pub fn new(
        mode: Mode,
        roots: &RootSet,
        duplicates: Option<DuplicateResolution>,
        orphans: Option<OrphanResolution>,
    ) -> Self {
        let summary = Summary::collect(roots.len(), duplicates.as_ref(), orphans.as_ref());
        Self {
            generated_at: Local::now(),
            mode,
            roots: roots
                .iter()
                .map(|(_, root)| RootSummary {
                    name: root.name.to_string(),
                    path: root.base_path.clone(),
                    kind: root.kind,
                })
                .collect(),
            duplicates,
            orphans,
            summary,
        }
    }
}

/// Write `report` to `out`.
///
/// With `events_shown`, text output skips the event log (the prompt already
/// printed it) and writes only the summary. CSV carries no summary row; the
/// summary goes to stderr instead.
pub fn render(
    report: &Report,
    format: Format,
    out: &mut dyn Write,
    events_shown: bool,
) -> anyhow::Result<()> {
    match format {
        Format::Text => {
            if !events_shown {
                write_events(report, out)?;
            }
            write_summary(out, &report.summary)?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        Format::Csv => {
            write_csv(report, out)?;
            write_summary(&mut io::stderr().lock(), &report.summary)?;
        }
    }
    out.flush()?;
    Ok(())
}

// ── Text ─────────────────────────────────────────────────────────────────────

pub fn write_roots(out: &mut dyn Write, roots: &RootSet) -> io::Result<()> {
    if roots.is_empty() {
        writeln!(out, "No storage roots with a game library were found.")?;
        return Ok(());
    }
    writeln!(out, "Storage roots:")?;
    for (_, root) in roots.iter() {
        writeln!(
            out,
            "  {:<12} {:<8} {}",
            root.name,
            root.kind.label(),
            root.base_path.display()
        )?;
    }
    writeln!(out)
}

fn write_events(report: &Report, out: &mut dyn Write) -> io::Result<()> {
    if let Some(dupes) = &report.duplicates {
        if dupes.events.is_empty() {
            writeln!(out, "No duplicate installations found.")?;
        }
        for event in &dupes.events {
            write_duplicate_event(out, event)?;
        }
        writeln!(out)?;
    }
    if let Some(orphans) = &report.orphans {
        if orphans.events.is_empty() {
            writeln!(out, "No orphaned manifests found.")?;
        }
        for event in &orphans.events {
            write_orphan_event(out, event)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One duplicate event as text. Findings list their locations numbered
/// from 1, which is what the interactive menu refers to.
pub fn write_duplicate_event(out: &mut dyn Write, event: &DuplicateEvent) -> io::Result<()> {
    match event {
        DuplicateEvent::Finding(finding) => {
            let reclaimable = finding
                .reclaimable_bytes()
                .map(format_size)
                .unwrap_or_else(|| UNKNOWN_SIZE.to_string());
            writeln!(
                out,
                "Duplicate: {} ({} copies, {} reclaimable)",
                finding.name,
                finding.locations.len(),
                reclaimable
            )?;
            for (i, loc) in finding.locations.iter().enumerate() {
                writeln!(
                    out,
                    "  {}) [{}] {}  {}",
                    i + 1,
                    loc.root,
                    loc.path.display(),
                    format_size_opt(loc.size_bytes)
                )?;
            }
        }
        DuplicateEvent::WouldDelete { root, path, .. } => {
            writeln!(out, "  would delete [{}] {}", root, path.display())?;
        }
        DuplicateEvent::Deleted {
            root,
            path,
            outcome,
            ..
        } => match outcome {
            DeletionOutcome::Deleted { manifest } => writeln!(
                out,
                "  deleted [{}] {} and {}",
                root,
                path.display(),
                manifest.display()
            )?,
            DeletionOutcome::ManifestNotFound => writeln!(
                out,
                "  deleted [{}] {}; no manifest found, the library may need manual correction",
                root,
                path.display()
            )?,
            DeletionOutcome::ManifestFailed { manifest, error } => writeln!(
                out,
                "  deleted [{}] {}; could not remove {}: {}",
                root,
                path.display(),
                manifest.display(),
                error
            )?,
            DeletionOutcome::DirectoryFailed { error } => writeln!(
                out,
                "  failed to delete [{}] {}: {}",
                root,
                path.display(),
                error
            )?,
        },
        DuplicateEvent::Skipped { name, remaining } => {
            writeln!(out, "  skipped {name}, {remaining} copies kept")?;
        }
        DuplicateEvent::InvalidSelection {
            name,
            reply,
            remaining,
        } => {
            writeln!(
                out,
                "  invalid selection '{reply}' for {name}, {remaining} copies kept"
            )?;
        }
    }
    Ok(())
}

pub fn write_orphan_event(out: &mut dyn Write, event: &OrphanEvent) -> io::Result<()> {
    match event {
        OrphanEvent::Finding(finding) => {
            writeln!(
                out,
                "Orphan: {} (app {}) on {}: {}",
                finding.label(),
                finding.app_id,
                finding.root,
                finding.reason.label()
            )?;
            writeln!(out, "  {}", finding.file_path.display())?;
        }
        OrphanEvent::WouldDelete { file_path } => {
            writeln!(out, "  would delete {}", file_path.display())?;
        }
        OrphanEvent::Deleted { file_path } => {
            writeln!(out, "  deleted {}", file_path.display())?;
        }
        OrphanEvent::DeleteFailed { file_path, error } => {
            writeln!(out, "  failed to delete {}: {}", file_path.display(), error)?;
        }
        OrphanEvent::Skipped { file_path } => {
            writeln!(out, "  kept {}", file_path.display())?;
        }
    }
    Ok(())
}

pub fn write_summary(out: &mut dyn Write, summary: &Summary) -> io::Result<()> {
    let reclaimable = summary
        .reclaimable_bytes
        .map(format_size)
        .unwrap_or_else(|| UNKNOWN_SIZE.to_string());

    writeln!(out, "Summary")?;
    writeln!(out, "  roots scanned:        {}", format_count(summary.roots as u64))?;
    writeln!(
        out,
        "  duplicate findings:   {}",
        format_count(summary.duplicate_findings as u64)
    )?;
    writeln!(out, "  reclaimable:          {reclaimable}")?;
    writeln!(
        out,
        "  orphaned manifests:   {}",
        format_count(summary.orphan_findings as u64)
    )?;
    writeln!(
        out,
        "  deletions performed:  {}",
        format_count(summary.deletions_performed as u64)
    )?;
    writeln!(
        out,
        "  deletions failed:     {}",
        format_count(summary.deletions_failed as u64)
    )?;
    Ok(())
}

// ── CSV ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    kind: &'static str,
    action: &'static str,
    name: &'a str,
    root: &'a str,
    path: String,
    size_bytes: Option<u64>,
    detail: String,
}

impl<'a> CsvRow<'a> {
    fn duplicate(action: &'static str, name: &'a str, root: &'a str, path: String) -> Self {
        Self {
            kind: "duplicate",
            action,
            name,
            root,
            path,
            size_bytes: None,
            detail: String::new(),
        }
    }
}

fn write_csv(report: &Report, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    for event in report.duplicates.iter().flat_map(|d| &d.events) {
        match event {
            DuplicateEvent::Finding(finding) => {
                for loc in &finding.locations {
                    writer.serialize(CsvRow {
                        size_bytes: loc.size_bytes,
                        ..CsvRow::duplicate(
                            "found",
                            &finding.name,
                            &loc.root,
                            loc.path.display().to_string(),
                        )
                    })?;
                }
            }
            DuplicateEvent::WouldDelete { name, root, path } => {
                writer.serialize(CsvRow::duplicate(
                    "would_delete",
                    name,
                    root,
                    path.display().to_string(),
                ))?;
            }
            DuplicateEvent::Deleted {
                name,
                root,
                path,
                outcome,
            } => {
                let detail = match outcome {
                    DeletionOutcome::Deleted { manifest } => manifest.display().to_string(),
                    DeletionOutcome::ManifestNotFound => outcome.label().to_string(),
                    DeletionOutcome::ManifestFailed { error, .. }
                    | DeletionOutcome::DirectoryFailed { error } => error.clone(),
                };
                let action = if outcome.is_failure() {
                    "delete_failed"
                } else {
                    "deleted"
                };
                writer.serialize(CsvRow {
                    detail,
                    ..CsvRow::duplicate(action, name, root, path.display().to_string())
                })?;
            }
            DuplicateEvent::Skipped { name, remaining } => {
                writer.serialize(CsvRow {
                    detail: format!("{remaining} kept"),
                    ..CsvRow::duplicate("skipped", name, "", String::new())
                })?;
            }
            DuplicateEvent::InvalidSelection {
                name,
                reply,
                remaining,
            } => {
                writer.serialize(CsvRow {
                    detail: format!("reply '{reply}', {remaining} kept"),
                    ..CsvRow::duplicate("invalid_selection", name, "", String::new())
                })?;
            }
        }
    }

    let mut current: Option<(&str, &str)> = None;
    for event in report.orphans.iter().flat_map(|o| &o.events) {
        let (action, path, detail) = match event {
            OrphanEvent::Finding(finding) => {
                current = Some((finding.label(), finding.root.as_str()));
                (
                    "found",
                    &finding.file_path,
                    finding.reason.label().to_string(),
                )
            }
            OrphanEvent::WouldDelete { file_path } => ("would_delete", file_path, String::new()),
            OrphanEvent::Deleted { file_path } => ("deleted", file_path, String::new()),
            OrphanEvent::DeleteFailed { file_path, error } => {
                ("delete_failed", file_path, error.clone())
            }
            OrphanEvent::Skipped { file_path } => ("skipped", file_path, String::new()),
        };
        let (name, root) = current.unwrap_or(("", ""));
        writer.serialize(CsvRow {
            kind: "orphan",
            action,
            name,
            root,
            path: path.display().to_string(),
            size_bytes: None,
            detail,
        })?;
    }

    writer.flush()?;
    Ok(())
}
