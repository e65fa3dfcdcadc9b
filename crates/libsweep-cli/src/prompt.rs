/// Terminal operator — answers resolver questions from a line-based input.
///
/// Generic over reader and writer so the whole interactive flow can be
/// driven from a byte buffer in tests. End of input counts as "skip" for
/// menus and "no" for confirmations.
use crate::report::{write_duplicate_event, write_orphan_event};
use libsweep_core::analysis::{DuplicateEvent, DuplicateFinding, OrphanEvent, OrphanFinding};
use libsweep_core::operator::{parse_choice, parse_confirmation, Choice, Operator};
use std::io::{self, BufRead, Write};
use tracing::warn;

pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        if let Err(err) = write!(self.output, "{prompt}").and_then(|()| self.output.flush()) {
            warn!("Failed to write prompt: {err}");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.note("\n");
                None
            }
            Ok(_) => Some(line),
            Err(err) => {
                warn!("Failed to read reply: {err}");
                None
            }
        }
    }

    fn note(&mut self, text: &str) {
        if let Err(err) = self.output.write_all(text.as_bytes()) {
            warn!("Failed to write output: {err}");
        }
    }

    fn show(&mut self, write: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        if let Err(err) = write(&mut self.output) {
            warn!("Failed to write output: {err}");
        }
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn choose_location(&mut self, finding: &DuplicateFinding) -> Choice {
        self.note("  0) skip\n");
        let prompt = format!(
            "Delete which copy of {}? [0-{}]: ",
            finding.name,
            finding.locations.len()
        );
        match self.ask(&prompt) {
            Some(reply) => parse_choice(&reply),
            None => Choice::Skip,
        }
    }

    fn confirm_orphan(&mut self, finding: &OrphanFinding) -> bool {
        let prompt = format!("Delete manifest for {}? [y/N]: ", finding.label());
        self.ask(&prompt)
            .map(|reply| parse_confirmation(&reply))
            .unwrap_or(false)
    }

    fn duplicate_event(&mut self, event: &DuplicateEvent) {
        self.show(|out| write_duplicate_event(out, event));
    }

    fn orphan_event(&mut self, event: &OrphanEvent) {
        self.show(|out| write_orphan_event(out, event));
    }
}
