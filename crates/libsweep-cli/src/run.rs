/// One complete run: discover, index, resolve, report.
///
/// Duplicates are handled before orphans so that a duplicate deletion
/// which also removed a manifest is never re-offered as an orphan.
use crate::args::{Args, Mode};
use crate::prompt::TerminalOperator;
use crate::report::{self, Format, Report, Summary};
use crossbeam_channel::Receiver;
use libsweep_core::analysis::{duplicates, orphans, DuplicateResolution, OrphanResolution};
use libsweep_core::delete::FsDeleter;
use libsweep_core::model::size::format_size_opt;
use libsweep_core::model::RootSet;
use libsweep_core::operator::Operator;
use libsweep_core::platform::discover_roots;
use libsweep_core::scanner::{progress_channel, InstallationIndex, ScanProgress, SizePolicy};
use std::io::{self, BufRead, Write};
use std::thread;
use tracing::{debug, info, warn};

/// Run with replies read from `input` and the report written to `out`.
///
/// Prompts and live events go to `out` for text output and to stderr
/// otherwise, keeping JSON and CSV on `out` machine-readable. Failures to
/// write are logged; a completed scan always yields its summary.
pub fn run<R: BufRead>(args: &Args, mut input: R, out: &mut dyn Write) -> Summary {
    let config = args.scan_config();
    let mode = args.mode();
    debug!(?mode, ?config, "resolved configuration");

    let roots = discover_roots(&config);
    if args.format == Format::Text {
        if let Err(err) = report::write_roots(out, &roots) {
            warn!("Failed to write report: {err}");
        }
    }

    let (duplicates, orphans) = {
        let mut operator = match mode {
            Mode::Interactive => Some(TerminalOperator::new(
                &mut input,
                prompt_writer(args.format, &mut *out),
            )),
            Mode::Report | Mode::DryRun => None,
        };

        let duplicates = if args.scan_duplicates() {
            let index = build_index(&roots, config.sizing);
            Some(resolve_duplicates(
                index,
                &roots,
                mode,
                operator.as_mut().map(|op| op as &mut dyn Operator),
            ))
        } else {
            None
        };

        let orphans = args.scan_orphans().then(|| {
            resolve_orphans(
                &roots,
                mode,
                operator.as_mut().map(|op| op as &mut dyn Operator),
            )
        });

        (duplicates, orphans)
    };

    let report = Report::new(mode, &roots, duplicates, orphans);
    let events_shown = mode == Mode::Interactive && args.format == Format::Text;
    if let Err(err) = report::render(&report, args.format, out, events_shown) {
        warn!("Failed to write report: {err}");
    }

    info!(
        "Done: {} duplicate(s), {} orphan(s), {} deletion(s), {} failure(s)",
        report.summary.duplicate_findings,
        report.summary.orphan_findings,
        report.summary.deletions_performed,
        report.summary.deletions_failed
    );
    report.summary
}

fn prompt_writer<'a>(format: Format, out: &'a mut dyn Write) -> Box<dyn Write + 'a> {
    match format {
        Format::Text => Box::new(out),
        Format::Json | Format::Csv => Box::new(io::stderr()),
    }
}

/// Build the index, draining progress on a named thread while sizes are
/// measured. Without the thread, sizes are still measured, just silently.
fn build_index(roots: &RootSet, sizing: SizePolicy) -> InstallationIndex {
    if !sizing.is_enabled() {
        return InstallationIndex::build(roots, sizing, None);
    }

    let (tx, rx) = progress_channel();
    let listener = match thread::Builder::new()
        .name("libsweep-progress".into())
        .spawn(move || log_progress(rx))
    {
        Ok(handle) => handle,
        Err(err) => {
            warn!("Failed to spawn progress thread: {err}");
            return InstallationIndex::build(roots, sizing, None);
        }
    };

    let index = InstallationIndex::build(roots, sizing, Some(&tx));
    drop(tx);

    if listener.join().is_err() {
        warn!("Progress listener panicked");
    }
    index
}

fn log_progress(rx: Receiver<ScanProgress>) {
    let mut total = 0usize;
    let mut sized = 0usize;

    for message in rx {
        match message {
            ScanProgress::RootListed {
                root,
                installations,
            } => {
                total += installations;
                info!("{root}: {installations} installation(s)");
            }
            ScanProgress::Sized {
                root,
                name,
                size_bytes,
            } => {
                sized += 1;
                debug!(
                    "[{sized}/{total}] {root}/{name}: {}",
                    format_size_opt(size_bytes)
                );
            }
            ScanProgress::Complete {
                roots,
                installations,
                duration,
            } => {
                info!("Measured {installations} installation(s) on {roots} root(s) in {duration:.1?}");
            }
        }
    }
}

fn resolve_duplicates(
    mut index: InstallationIndex,
    roots: &RootSet,
    mode: Mode,
    operator: Option<&mut dyn Operator>,
) -> DuplicateResolution {
    match (mode, operator) {
        (Mode::Interactive, Some(op)) => {
            duplicates::resolve_interactive(&mut index, roots, op, &FsDeleter)
        }
        (Mode::DryRun, _) => duplicates::resolve_dry_run(&index, roots),
        _ => duplicates::report(&index, roots),
    }
}

fn resolve_orphans(
    roots: &RootSet,
    mode: Mode,
    operator: Option<&mut dyn Operator>,
) -> OrphanResolution {
    let findings = orphans::find_orphans(roots);
    match (mode, operator) {
        (Mode::Interactive, Some(op)) => orphans::resolve_interactive(findings, op, &FsDeleter),
        (Mode::DryRun, _) => orphans::resolve_dry_run(findings),
        _ => orphans::report(findings),
    }
}
