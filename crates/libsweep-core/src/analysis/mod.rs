/// Analysis modules — the duplicate and orphan resolvers.
///
/// Both consume the same discovery output and share no mutable state.

pub mod duplicates;
pub mod orphans;

pub use duplicates::{
    find_duplicates, next_action, DuplicateAction, DuplicateEvent, DuplicateFinding,
    DuplicateLocation, DuplicateResolution,
};
pub use orphans::{
    classify, find_orphans, OrphanEvent, OrphanFinding, OrphanReason, OrphanResolution,
};
