/// Command-line arguments.
use crate::report::Format;
use clap::Parser;
use libsweep_core::scanner::SizePolicy;
use libsweep_core::ScanConfig;
use serde::Serialize;
use std::path::PathBuf;

/// Find duplicate game installations and orphaned manifests across internal
/// storage and removable media. Read-only unless `--delete` is given.
#[derive(Debug, Clone, Parser)]
#[command(name = "libsweep", author, version, about, long_about = None)]
pub struct Args {
    /// Scan for titles installed on more than one storage root.
    #[arg(long)]
    pub duplicates: bool,

    /// Scan for manifests whose install directory is missing.
    #[arg(long)]
    pub orphans: bool,

    /// Measure installation sizes (slower; walks every installation).
    #[arg(long)]
    pub sizes: bool,

    /// Prompt to delete duplicate copies and orphaned manifests.
    #[arg(long, conflicts_with = "dry_run")]
    pub delete: bool,

    /// Show what would be deleted without deleting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Directory whose subdirectories are removable-media roots. Repeatable.
    #[arg(
        long = "mount-parent",
        value_name = "DIR",
        env = "LIBSWEEP_MOUNT_PARENTS",
        value_delimiter = ':'
    )]
    pub mount_parents: Vec<PathBuf>,

    /// Internal storage root [default: $HOME/.local/share/Steam].
    #[arg(long, value_name = "DIR", env = "LIBSWEEP_INTERNAL_ROOT")]
    pub internal_root: Option<PathBuf>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Follow symbolic links when measuring sizes.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Log debug detail to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// How findings are acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Report,
    DryRun,
    Interactive,
}

impl Args {
    /// Duplicates are scanned when asked for, or when neither scan was named.
    pub fn scan_duplicates(&self) -> bool {
        self.duplicates || !self.orphans
    }

    pub fn scan_orphans(&self) -> bool {
        self.orphans || !self.duplicates
    }

    pub fn mode(&self) -> Mode {
        if self.delete {
            Mode::Interactive
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Report
        }
    }

    /// Platform defaults with command-line overrides applied.
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::from_env();
        if !self.mount_parents.is_empty() {
            config.mount_parents = self.mount_parents.clone();
        }
        if let Some(internal) = &self.internal_root {
            config.internal_root = Some(internal.clone());
        }

        let sizing = if self.sizes {
            SizePolicy::Enabled {
                follow_links: self.follow_symlinks,
            }
        } else {
            SizePolicy::Disabled
        };
        config.with_sizing(sizing)
    }
}
