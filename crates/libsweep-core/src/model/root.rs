/// Storage roots — one internal disk or removable volume hosting a library.
use compact_str::CompactString;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Library directory directly under a root. Manifests live here.
pub const LIBRARY_DIR: &str = "steamapps";

/// Installations directory under [`LIBRARY_DIR`].
pub const INSTALLATIONS_DIR: &str = "common";

/// Display name given to the internal storage root.
pub const INTERNAL_ROOT_NAME: &str = "internal";

/// Lightweight index into a [`RootSet`].
///
/// Installation entries and manifest records carry one of these instead of
/// a clone of the root, so a scan holds exactly one copy of every root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RootId(pub u32);

impl RootId {
    /// Create a new `RootId` from a `usize`, panicking in debug builds if it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "RootId overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Where a root lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    /// The machine's own disk.
    Internal,
    /// A removable volume found under one of the mount parents.
    External,
}

impl RootKind {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "Internal",
            Self::External => "External",
        }
    }
}

/// A single storage root. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageRoot {
    pub name: CompactString,
    pub base_path: PathBuf,
    pub kind: RootKind,
}

impl StorageRoot {
    pub fn new(name: impl Into<CompactString>, base_path: impl Into<PathBuf>, kind: RootKind) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            kind,
        }
    }

    /// `<base>/steamapps` — the directory holding manifest files.
    pub fn library_dir(&self) -> PathBuf {
        self.base_path.join(LIBRARY_DIR)
    }

    /// `<base>/steamapps/common` — the directory holding one subdirectory per installation.
    pub fn installations_dir(&self) -> PathBuf {
        self.library_dir().join(INSTALLATIONS_DIR)
    }

    /// Returns `true` if this root has an installations directory.
    pub fn hosts_library(&self) -> bool {
        self.installations_dir().is_dir()
    }
}

/// Ordered set of roots produced by one discovery pass.
///
/// Order is discovery order: external roots in enumeration order, then
/// the internal root last.
#[derive(Debug, Clone, Default)]
pub struct RootSet {
    roots: Vec<StorageRoot>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root and return its id.
    pub fn push(&mut self, root: StorageRoot) -> RootId {
        let id = RootId::new(self.roots.len());
        self.roots.push(root);
        id
    }

    /// Get the root with the given id.
    #[inline]
    pub fn get(&self, id: RootId) -> &StorageRoot {
        &self.roots[id.idx()]
    }

    /// Display name of the root with the given id.
    #[inline]
    pub fn name(&self, id: RootId) -> &str {
        self.get(id).name.as_str()
    }

    /// Iterate roots in discovery order together with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (RootId, &StorageRoot)> {
        self.roots
            .iter()
            .enumerate()
            .map(|(i, root)| (RootId::new(i), root))
    }

    /// Returns `true` if a root with this base path is already present.
    pub fn contains_path(&self, base_path: &Path) -> bool {
        self.roots.iter().any(|r| r.base_path == base_path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
