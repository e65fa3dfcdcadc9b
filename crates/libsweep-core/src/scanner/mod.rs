/// Scanner module — builds the installation index.
///
/// Listing roots is cheap and always sequential. Measuring installation
/// sizes is the expensive part and fans out over a rayon pool; progress for
/// it is reported through a bounded crossbeam channel so a frontend can show
/// activity while the walk runs.
pub mod index;
pub mod progress;
pub mod usage;

pub use index::InstallationIndex;
pub use progress::ScanProgress;
pub use usage::{dir_size, SizePolicy};

use crossbeam_channel::{Receiver, Sender};

/// Maximum number of progress messages that may queue up in the channel.
///
/// One `Sized` message is sent per installation, so even large libraries
/// fit comfortably. If the listener falls behind, sizing workers block
/// briefly rather than growing the queue without bound.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 1_024;

/// Create a progress channel of [`PROGRESS_CHANNEL_CAPACITY`].
///
/// The receiver must be drained on another thread while
/// [`InstallationIndex::build`] runs.
pub fn progress_channel() -> (Sender<ScanProgress>, Receiver<ScanProgress>) {
    crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY)
}
