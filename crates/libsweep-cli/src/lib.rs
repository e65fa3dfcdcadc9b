/// libsweep CLI — argument parsing, terminal prompting and report rendering
/// on top of `libsweep-core`.
///
/// [`run`] drives one complete scan from parsed [`Args`]. It takes its
/// reply source and output sink as parameters so the binary can pass the
/// real terminal and tests can pass byte buffers.
pub mod args;
pub mod prompt;
pub mod report;
pub mod run;

pub use args::{Args, Mode};
pub use report::{Format, Report, Summary};
pub use run::run;
