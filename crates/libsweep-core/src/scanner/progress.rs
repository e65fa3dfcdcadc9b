/// Index-build progress reporting — lightweight messages sent from the
/// sizing workers to whoever is listening via a crossbeam channel.
use compact_str::CompactString;
use std::time::Duration;

/// Progress updates emitted while the installation index is built.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Listing of one root finished; `installations` directories will be indexed.
    RootListed {
        root: CompactString,
        installations: usize,
    },
    /// One installation directory was measured.
    Sized {
        root: CompactString,
        name: CompactString,
        size_bytes: Option<u64>,
    },
    /// The index is complete.
    Complete {
        roots: usize,
        installations: usize,
        duration: Duration,
    },
}
