/// Data model shared by the scanner and the resolvers.
///
/// Entries and records refer to their storage root through a [`RootId`]
/// into a [`RootSet`] rather than owning a copy of it.
pub mod installation;
pub mod record;
pub mod root;
pub mod size;

pub use installation::InstallationEntry;
pub use record::ManifestRecord;
pub use root::{RootId, RootKind, RootSet, StorageRoot};
