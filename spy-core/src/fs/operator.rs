//! `src/fs/operator.rs`
//! ============================================================================
//! # Filesystem collaborator
//!
//! Synchronous listing and mutation primitives. The tree and the controller
//! only ever touch the disk through [`FileSystemOps`], so tests can point the
//! whole navigator at a `TempDir`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{Span, debug, info, instrument};

use crate::error::AppError;
use crate::fs::entry::{Entry, EntryKind, display_order};

pub trait FileSystemOps: Send + Sync {
    /// Immediate children of `dir` in display order: directories first, then
    /// files, each group by case-insensitive name.
    fn list_children(&self, dir: &Path) -> Result<Vec<Entry>, AppError>;

    fn create_file(&self, path: &Path) -> Result<(), AppError>;

    fn create_directory(&self, path: &Path) -> Result<(), AppError>;

    /// Files are unlinked; directories must be empty.
    fn delete(&self, path: &Path) -> Result<(), AppError>;

    /// Fails with [`AppError::NameCollision`] when `to` already exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError>;
}

/// `std::fs` backed implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystemOps for LocalFileSystem {
    #[instrument(level = "debug", skip(self), fields(dir = %dir.display(), entries))]
    fn list_children(&self, dir: &Path) -> Result<Vec<Entry>, AppError> {
        let read_dir: fs::ReadDir =
            fs::read_dir(dir).map_err(|e| AppError::from_io("list", dir, e))?;

        let mut entries: Vec<Entry> = Vec::new();
        for item in read_dir {
            let item: fs::DirEntry = item.map_err(|e| AppError::from_io("list", dir, e))?;
            let path: PathBuf = item.path();

            // Follow symlinks so a linked directory is still expandable
            let is_dir: bool = match item.file_type() {
                Ok(ft) if ft.is_symlink() => path.is_dir(),
                Ok(ft) => ft.is_dir(),
                Err(_) => path.is_dir(),
            };

            let kind: EntryKind = if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(Entry::new(path, kind));
        }

        entries.sort_by(display_order);
        Span::current().record("entries", entries.len());
        Ok(entries)
    }

    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    fn create_file(&self, path: &Path) -> Result<(), AppError> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| AppError::from_io("create file", path, e))?;

        info!(marker = "FS_CREATE_FILE", path = %path.display(), "File created");
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    fn create_directory(&self, path: &Path) -> Result<(), AppError> {
        fs::create_dir(path).map_err(|e| AppError::from_io("create folder", path, e))?;

        info!(marker = "FS_CREATE_DIR", path = %path.display(), "Directory created");
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(path = %path.display(), file_type))]
    fn delete(&self, path: &Path) -> Result<(), AppError> {
        let meta: fs::Metadata =
            fs::symlink_metadata(path).map_err(|e| AppError::from_io("delete", path, e))?;

        if meta.is_dir() {
            Span::current().record("file_type", "directory");
            fs::remove_dir(path).map_err(|e| AppError::from_io("delete", path, e))?;
        } else {
            Span::current().record("file_type", "file");
            fs::remove_file(path).map_err(|e| AppError::from_io("delete", path, e))?;
        }

        info!(marker = "FS_DELETE", path = %path.display(), "Entry deleted");
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(from = %from.display(), to = %to.display()))]
    fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError> {
        // std::fs::rename silently replaces files on unix
        if to.symlink_metadata().is_ok() {
            debug!(to = %to.display(), "Rename target already exists");
            return Err(AppError::NameCollision(to.to_path_buf()));
        }

        fs::rename(from, to).map_err(|e| AppError::from_io("rename", from, e))?;

        info!(
            marker = "FS_RENAME",
            from = %from.display(),
            to = %to.display(),
            "Entry renamed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_then_list() {
        let tmp = TempDir::new().unwrap();
        let fs_ops = LocalFileSystem;

        fs_ops.create_file(&tmp.path().join("a.mp3")).unwrap();
        fs_ops.create_directory(&tmp.path().join("sub")).unwrap();

        let entries = fs_ops.list_children(tmp.path()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "sub");
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].name, "a.mp3");
    }

    #[test]
    fn listing_puts_directories_first_ignoring_case() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.txt", "Zed.txt", "c.txt", "A.txt", "y.txt"] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        for name in ["a", "m", "Q", "d"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }

        let entries = LocalFileSystem.list_children(tmp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(
            names,
            ["a", "d", "m", "Q", "A.txt", "b.txt", "c.txt", "y.txt", "Zed.txt"]
        );
    }

    #[test]
    fn create_existing_is_a_collision() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, b"x").unwrap();

        let err = LocalFileSystem.create_file(&path).unwrap_err();
        assert!(matches!(err, AppError::NameCollision(_)));
    }

    #[test]
    fn rename_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let err = LocalFileSystem.rename(&a, &b).unwrap_err();
        assert!(matches!(err, AppError::NameCollision(_)));
        assert_eq!(fs::read(&b).unwrap(), b"b");
    }

    #[test]
    fn non_empty_directory_delete_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("full");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("x"), b"x").unwrap();

        assert!(LocalFileSystem.delete(&dir).is_err());
        assert!(dir.exists());

        fs::remove_file(dir.join("x")).unwrap();
        LocalFileSystem.delete(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn missing_directory_lists_as_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFileSystem
            .list_children(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
