/// Platform layer — where libraries live on disk.

pub mod roots;

pub use roots::{discover_roots, installation_dirs, manifest_files, manifest_files_in};
