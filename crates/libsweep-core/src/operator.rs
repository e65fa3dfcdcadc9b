/// Operator capability — the only way the resolvers ask a human anything.
///
/// Resolvers never read input themselves. They hand the operator a finding
/// and get back a [`Choice`] (for duplicates) or a yes/no (for orphans).
/// Terminal frontends parse typed replies with [`parse_choice`]; tests use
/// scripted operators.
use crate::analysis::duplicates::{DuplicateEvent, DuplicateFinding};
use crate::analysis::orphans::{OrphanEvent, OrphanFinding};

/// What the operator picked from a numbered menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// `0` — leave every remaining location alone.
    Skip,
    /// A 1-based menu number. Not yet range-checked.
    Pick(usize),
    /// Anything that is not a number. Carries the raw reply.
    Invalid(String),
}

/// Parse a typed menu reply.
///
/// Surrounding whitespace is ignored. End of input is reported by the
/// caller as [`Choice::Skip`].
pub fn parse_choice(reply: &str) -> Choice {
    let trimmed = reply.trim();
    match trimmed.parse::<usize>() {
        Ok(0) => Choice::Skip,
        Ok(n) => Choice::Pick(n),
        Err(_) => Choice::Invalid(trimmed.to_string()),
    }
}

/// Parse a typed yes/no reply. Only `y` / `yes` (any case) mean yes.
pub fn parse_confirmation(reply: &str) -> bool {
    let trimmed = reply.trim();
    trimmed.eq_ignore_ascii_case("y") || trimmed.eq_ignore_ascii_case("yes")
}

/// Someone (or something) answering the resolvers' questions.
pub trait Operator {
    /// Pick one of `finding.locations` to delete (1-based), or skip.
    ///
    /// The finding always reflects the locations that currently remain.
    fn choose_location(&mut self, finding: &DuplicateFinding) -> Choice;

    /// Delete this orphaned manifest?
    fn confirm_orphan(&mut self, finding: &OrphanFinding) -> bool;

    /// Called as duplicate resolution progresses, so an interactive
    /// operator sees outcomes before the next question.
    fn duplicate_event(&mut self, _event: &DuplicateEvent) {}

    /// Called as orphan resolution progresses.
    fn orphan_event(&mut self, _event: &OrphanEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_replies() {
        assert_eq!(parse_choice("0"), Choice::Skip);
        assert_eq!(parse_choice(" 2\n"), Choice::Pick(2));
        assert_eq!(parse_choice("abc"), Choice::Invalid("abc".into()));
        assert_eq!(parse_choice(""), Choice::Invalid(String::new()));
        assert_eq!(parse_choice("-1"), Choice::Invalid("-1".into()));
    }

    #[test]
    fn parses_confirmations() {
        assert!(parse_confirmation("y\n"));
        assert!(parse_confirmation("YES"));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("yep"));
    }
}
