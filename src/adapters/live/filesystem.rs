//! Live filesystem adapter using `std::fs`.
//!
//! Writes are atomic: contents go to a temporary sibling that is renamed
//! over the target only once fully written.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        // Staged beside the target; the rename is the only step touching it.
        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/out.py");

        LiveFileSystem.write(&target, "pass\n").unwrap();

        assert!(LiveFileSystem.exists(&target));
        assert_eq!(LiveFileSystem.read_to_string(&target).unwrap(), "pass\n");
    }

    #[test]
    fn write_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test_mod.py");
        std::fs::write(&target, "old contents that are longer\n").unwrap();

        LiveFileSystem.write(&target, "new\n").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new\n");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_write_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        // The target path is an existing directory, so the final rename fails.
        let target = dir.path().join("test_mod.py");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "").unwrap();

        assert!(LiveFileSystem.write(&target, "pass\n").is_err());

        assert!(target.is_dir());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "staged file must be cleaned up");
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LiveFileSystem.read_to_string(&dir.path().join("absent.py")).is_err());
    }
}
