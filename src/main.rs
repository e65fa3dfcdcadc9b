//! libsweep — duplicate installation and orphaned manifest cleanup across
//! internal storage and removable media.
//!
//! Thin binary entry point. All logic lives in the `libsweep-core`
//! and `libsweep-cli` crates.
use clap::Parser;
use libsweep_cli::Args;
use std::io;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so the report on stdout stays clean.
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    tracing::info!("libsweep starting");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    libsweep_cli::run(&args, stdin.lock(), &mut stdout);

    Ok(())
}
