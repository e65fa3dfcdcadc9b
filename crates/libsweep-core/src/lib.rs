/// libsweep Core — storage-root discovery, installation indexing, and
/// consistent directory/manifest deletion.
///
/// This crate contains all business logic with zero terminal I/O.
/// Anything that needs an answer from a human goes through the
/// [`operator::Operator`] trait, so the resolvers can be driven by a
/// terminal, a script, or a test double.
///
/// # Modules
///
/// - [`model`] — Storage roots, installation entries, manifest records.
/// - [`platform`] — Storage-root discovery and per-root directory listings.
/// - [`manifest`] — Tolerant `appmanifest_<id>.acf` reader.
/// - [`scanner`] — Installation index construction and size computation.
/// - [`analysis`] — Duplicate and orphan resolvers.
/// - [`delete`] — Paired directory + manifest deletion.
/// - [`operator`] — Operator capability interface and choice parsing.
/// - [`config`] — Scan configuration and platform defaults.
pub mod analysis;
pub mod config;
pub mod delete;
pub mod error;
pub mod manifest;
pub mod model;
pub mod operator;
pub mod platform;
pub mod scanner;

pub use config::ScanConfig;
pub use error::{DeleteError, ManifestError};
