/// Disk usage of an installation directory.
///
/// Equivalent to `du -s`: the recursive sum of allocated bytes under a
/// directory, counting hard-linked files once. Any read failure (permission
/// denied, the directory vanishing mid-walk) yields `None` rather than a
/// misleading partial total.
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Whether installation sizes are measured during indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizePolicy {
    /// Fast scan: every entry gets `size_bytes = None`.
    #[default]
    Disabled,
    /// Walk every installation directory.
    Enabled {
        /// Follow symbolic links while walking.
        follow_links: bool,
    },
}

impl SizePolicy {
    #[inline]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// Measure `path` according to this policy.
    pub fn measure(self, path: &Path) -> Option<u64> {
        match self {
            Self::Disabled => None,
            Self::Enabled { follow_links } => dir_size(path, follow_links),
        }
    }
}

/// Bytes used under `path`, or `None` if any part of it could not be read.
pub fn dir_size(path: &Path, follow_links: bool) -> Option<u64> {
    let start = Instant::now();
    let mut counter = UsageCounter::default();

    // Parallelism comes from sizing several installations at once, so each
    // individual walk stays on the calling thread.
    let walker = jwalk::WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(follow_links)
        .parallelism(jwalk::Parallelism::Serial);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "size unavailable");
                return None;
            }
        };
        match entry.metadata() {
            Ok(meta) => counter.add(&meta),
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "size unavailable");
                return None;
            }
        }
    }

    debug!(
        "Sized {} in {:?}: {} bytes",
        path.display(),
        start.elapsed(),
        counter.total
    );
    Some(counter.total)
}

/// Running total for one walk.
#[derive(Default)]
struct UsageCounter {
    total: u64,
    /// `(device, inode)` of multiply-linked files already counted.
    seen: HashSet<(u64, u64)>,
}

impl UsageCounter {
    #[cfg(unix)]
    fn add(&mut self, meta: &Metadata) {
        use std::os::unix::fs::MetadataExt;
        if !meta.is_dir() && meta.nlink() > 1 && !self.seen.insert((meta.dev(), meta.ino())) {
            return;
        }
        self.total += meta.blocks() * 512;
    }

    #[cfg(not(unix))]
    fn add(&mut self, meta: &Metadata) {
        let _ = &self.seen;
        self.total += meta.len();
    }
}
