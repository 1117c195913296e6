//! Candidate discovery: walks a project tree and yields source files.
//!
//! Directories whose name is in the [`SkipSet`] are pruned wherever they
//! appear below the root, so nothing underneath them is ever visited.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names excluded by default: version control, caches, virtual
/// environments, dependency trees, migrations and existing test suites.
pub const DEFAULT_SKIP_DIRS: &[&str] =
    &[".git", "__pycache__", "migrations", "venv", ".venv", "env", "node_modules", "tests"];

/// Set of directory names that are never descended into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSet {
    names: BTreeSet<String>,
}

impl SkipSet {
    /// Builds a skip set from exactly the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    /// Adds a name to the set.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Returns `true` if `name` is a skipped directory name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for SkipSet {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_DIRS.iter().copied())
    }
}

/// Lazy, restartable enumeration of candidate files under a root.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    root: PathBuf,
    extension: String,
    skip: SkipSet,
    excluded: Vec<PathBuf>,
}

impl SourceWalker {
    /// Creates a walker yielding `*.{extension}` files below `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, skip: SkipSet) -> Self {
        Self { root: root.into(), extension: extension.into(), skip, excluded: Vec::new() }
    }

    /// Prunes one extra directory (typically the output directory).
    ///
    /// The directory need not exist yet; it is pruned if it appears during
    /// the walk, as long as its parent exists.
    #[must_use]
    pub fn exclude(mut self, dir: &Path) -> Self {
        if let Some(canonical) = canonical_target(dir) {
            self.excluded.push(canonical);
        }
        self
    }

    /// Starts a fresh traversal. Each call restarts from the root.
    ///
    /// Entries are visited in file-name order within each directory.
    /// Unreadable entries are logged and skipped.
    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !self.prunes(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.matches_extension(entry.path()))
            .map(DirEntry::into_path)
    }

    fn prunes(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        if entry.file_name().to_str().is_some_and(|name| self.skip.contains(name)) {
            debug!(dir = %entry.path().display(), "pruned skipped directory");
            return true;
        }
        if !self.excluded.is_empty() {
            if let Ok(canonical) = std::fs::canonicalize(entry.path()) {
                if self.excluded.contains(&canonical) {
                    debug!(dir = %entry.path().display(), "pruned output directory");
                    return true;
                }
            }
        }
        false
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

fn canonical_target(dir: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = std::fs::canonicalize(dir) {
        return Some(canonical);
    }
    let name = dir.file_name()?;
    let parent = match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).ok().map(|parent| parent.join(name))
}

impl<'a> IntoIterator for &'a SourceWalker {
    type Item = PathBuf;
    type IntoIter = Box<dyn Iterator<Item = PathBuf> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
