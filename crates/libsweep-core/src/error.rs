/// Error types for the fallible filesystem primitives.
///
/// Only genuine I/O failures are errors. Missing manifest fields, missing
/// roots, and a manifest that cannot be paired with a directory are normal
/// outcomes and are modelled as plain values elsewhere.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("failed to remove installation directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to remove {}: {reason}", path.display())]
    Refused { path: PathBuf, reason: String },
}
