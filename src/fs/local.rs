use crate::{
    Operation, StorageConfig, StorageError,
    fs::{
        Entry, Visibility,
        path::{join, normalize_path},
        storage::{Storage, StorageResult},
    },
};
use std::{
    fs::{self, Metadata, Permissions},
    io,
    os::unix::fs::{MetadataExt as _, PermissionsExt as _},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/**
 A [`Storage`] backed by a directory on the local filesystem.

 Every storage path is resolved below the configured base path; paths that try to
 climb above it are rejected. Symbolic links are skipped when listing.

 ```no_run
 use storefind::{StorageConfig, fs::{LocalStorage, Storage}};

 let storage = LocalStorage::new(StorageConfig::new("/srv/uploads")).unwrap();
 storage.write("cache/hello.txt", b"hello").unwrap();
 let entries = storage.list_contents("cache", false).unwrap();
 assert_eq!(entries.len(), 1);
 ```
*/
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    config: StorageConfig,
}

impl LocalStorage {
    /**
     Creates the backend, creating the base directory if it doesn't exist.

     # Errors
     Returns a [`StorageError`] if the base directory can't be created.
    */
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let root = config.base_path().to_path_buf();
        if !root.is_dir() {
            fs::create_dir_all(&root).map_err(|err| {
                StorageError::new(
                    Operation::CreateDirectory,
                    root.display().to_string(),
                    err,
                )
            })?;
            set_mode(&root, config.directory_visibility().directory_mode()).map_err(|err| {
                StorageError::new(Operation::SetVisibility, root.display().to_string(), err)
            })?;
        }
        Ok(Self { root, config })
    }

    /// The directory every storage path is resolved against
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Normalises `path` and resolves it on disk
    fn resolve(&self, operation: Operation, path: &str) -> StorageResult<(String, PathBuf)> {
        let normalized =
            normalize_path(path).map_err(|err| StorageError::new(operation, path, err))?;
        let full = if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&normalized)
        };
        Ok((normalized, full))
    }

    fn entry_from_metadata(path: String, meta: &Metadata) -> Entry {
        let visibility = Visibility::from_mode(meta.mode());
        if meta.is_dir() {
            Entry::directory(path, meta.mtime()).with_visibility(visibility)
        } else {
            let mime = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_owned();
            Entry::file(path, meta.len(), meta.mtime())
                .with_mime_type(mime)
                .with_visibility(visibility)
        }
    }

    /// Appends the children of `dir` to `out`, descending into subdirectories when `recursive`
    fn collect_dir(
        &self,
        relative: &str,
        dir: &Path,
        recursive: bool,
        out: &mut Vec<Entry>,
    ) -> io::Result<()> {
        let mut children = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
        // read_dir order is unspecified, keep listings reproducible
        children.sort_by_key(fs::DirEntry::file_name);

        for child in children {
            let name = child.file_name();
            let Some(name) = name.to_str() else {
                warn!(path = %child.path().display(), "skipping entry with a non UTF-8 name");
                continue;
            };
            let meta = child.metadata()?;
            if meta.file_type().is_symlink() {
                warn!(path = %child.path().display(), "skipping symbolic link");
                continue;
            }
            let child_path = join(relative, name);
            let is_dir = meta.is_dir();
            out.push(Self::entry_from_metadata(child_path.clone(), &meta));
            if recursive && is_dir {
                self.collect_dir(&child_path, &child.path(), recursive, out)?;
            }
        }
        Ok(())
    }

    /// Creates `dir` and any missing parents, applying the directory visibility to new ones
    fn ensure_directory(&self, dir: &Path) -> io::Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        if let Some(parent) = dir.parent() {
            self.ensure_directory(parent)?;
        }
        match fs::create_dir(dir) {
            Ok(()) => set_mode(dir, self.config.directory_visibility().directory_mode()),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn ensure_parent(&self, file: &Path) -> io::Result<()> {
        file.parent()
            .map_or(Ok(()), |parent| self.ensure_directory(parent))
    }
}

fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(mode))
}

impl Storage for LocalStorage {
    fn list_contents(&self, path: &str, recursive: bool) -> StorageResult<Vec<Entry>> {
        let (normalized, full) = self.resolve(Operation::List, path)?;
        let mut entries = Vec::new();
        self.collect_dir(&normalized, &full, recursive, &mut entries)
            .map_err(|err| StorageError::new(Operation::List, path, err))?;
        debug!(path = %normalized, recursive, count = entries.len(), "listed local contents");
        Ok(entries)
    }

    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let (_, full) = self.resolve(Operation::Read, path)?;
        fs::read(&full).map_err(|err| StorageError::new(Operation::Read, path, err))
    }

    fn write(&self, path: &str, contents: &[u8]) -> StorageResult<()> {
        let (normalized, full) = self.resolve(Operation::Write, path)?;
        if normalized.is_empty() {
            return Err(StorageError::new(
                Operation::Write,
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "cannot write to the storage root"),
            ));
        }
        self.ensure_parent(&full)
            .and_then(|()| fs::write(&full, contents))
            .and_then(|()| set_mode(&full, self.config.visibility().file_mode()))
            .map_err(|err| StorageError::new(Operation::Write, path, err))
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let (_, full) = self.resolve(Operation::Delete, path)?;
        fs::remove_file(&full).map_err(|err| StorageError::new(Operation::Delete, path, err))
    }

    fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::Copy, source, err).with_destination(destination);
        let (_, from) = self
            .resolve(Operation::Copy, source)
            .map_err(|err| err.with_destination(destination))?;
        let (_, to) = self
            .resolve(Operation::Copy, destination)
            .map_err(|err| err.with_destination(destination))?;
        self.ensure_parent(&to)
            .and_then(|()| fs::copy(&from, &to))
            .map(|_| ())
            .map_err(wrap)
    }

    fn rename(&self, source: &str, destination: &str) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::Move, source, err).with_destination(destination);
        let (_, from) = self
            .resolve(Operation::Move, source)
            .map_err(|err| err.with_destination(destination))?;
        let (_, to) = self
            .resolve(Operation::Move, destination)
            .map_err(|err| err.with_destination(destination))?;
        self.ensure_parent(&to)
            .and_then(|()| fs::rename(&from, &to))
            .map_err(wrap)
    }

    fn create_directory(&self, path: &str) -> StorageResult<()> {
        let (_, full) = self.resolve(Operation::CreateDirectory, path)?;
        self.ensure_directory(&full)
            .map_err(|err| StorageError::new(Operation::CreateDirectory, path, err))
    }

    fn delete_directory(&self, path: &str) -> StorageResult<()> {
        let (normalized, full) = self.resolve(Operation::DeleteDirectory, path)?;
        if normalized.is_empty() {
            return Err(StorageError::new(
                Operation::DeleteDirectory,
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "refusing to delete the storage root"),
            ));
        }
        fs::remove_dir_all(&full)
            .map_err(|err| StorageError::new(Operation::DeleteDirectory, path, err))
    }

    fn file_exists(&self, path: &str) -> StorageResult<bool> {
        let (_, full) = self.resolve(Operation::CheckExistence, path)?;
        match fs::symlink_metadata(&full) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::new(Operation::CheckExistence, path, err)),
        }
    }

    fn directory_exists(&self, path: &str) -> StorageResult<bool> {
        let (_, full) = self.resolve(Operation::CheckExistence, path)?;
        match fs::symlink_metadata(&full) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::new(Operation::CheckExistence, path, err)),
        }
    }

    fn metadata(&self, path: &str) -> StorageResult<Entry> {
        let (normalized, full) = self.resolve(Operation::Metadata, path)?;
        let meta = fs::metadata(&full)
            .map_err(|err| StorageError::new(Operation::Metadata, path, err))?;
        Ok(Self::entry_from_metadata(normalized, &meta))
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> StorageResult<()> {
        let (_, full) = self.resolve(Operation::SetVisibility, path)?;
        let meta = fs::metadata(&full)
            .map_err(|err| StorageError::new(Operation::SetVisibility, path, err))?;
        let mode = if meta.is_dir() {
            visibility.directory_mode()
        } else {
            visibility.file_mode()
        };
        set_mode(&full, mode).map_err(|err| StorageError::new(Operation::SetVisibility, path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::EntryKind;

    fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(StorageConfig::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let storage = LocalStorage::new(StorageConfig::new(&nested)).unwrap();
        assert!(storage.root().is_dir());
    }

    #[test]
    fn write_read_and_list() {
        let (_dir, storage) = storage();
        storage.write("/cache/b.txt", b"second").unwrap();
        storage.write("cache/a.php", b"<?php").unwrap();
        storage.create_directory("cache/sub").unwrap();
        storage.write("cache/sub/deep.txt", b"deep").unwrap();

        assert_eq!(storage.read("cache/b.txt").unwrap(), b"second");

        let flat = storage.list_contents("cache", false).unwrap();
        let paths: Vec<_> = flat.iter().map(Entry::path).collect();
        assert_eq!(paths, ["cache/a.php", "cache/b.txt", "cache/sub"]);
        assert_eq!(flat[1].size(), Some(6));
        assert_eq!(flat[1].mime_type(), Some("text/plain"));
        assert_eq!(flat[2].kind(), EntryKind::Directory);

        let deep = storage.list_contents("cache", true).unwrap();
        assert_eq!(deep.len(), 4);
        assert_eq!(deep[3].path(), "cache/sub/deep.txt");
    }

    #[test]
    fn listing_a_missing_directory_is_a_storage_error() {
        let (_dir, storage) = storage();
        let err = storage.list_contents("nope", false).unwrap_err();
        assert_eq!(err.operation(), Operation::List);
        assert_eq!(err.path(), "nope");
        assert_eq!(err.io_kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn rejects_paths_outside_the_root() {
        let (_dir, storage) = storage();
        let err = storage.read("../outside.txt").unwrap_err();
        assert_eq!(err.io_kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn copy_move_delete() {
        let (_dir, storage) = storage();
        storage.write("a.txt", b"hello").unwrap();
        storage.copy("a.txt", "copy/b.txt").unwrap();
        storage.rename("a.txt", "moved/c.txt").unwrap();

        assert!(!storage.file_exists("a.txt").unwrap());
        assert!(storage.file_exists("copy/b.txt").unwrap());
        assert!(storage.file_exists("moved/c.txt").unwrap());
        assert!(storage.directory_exists("moved").unwrap());

        storage.delete("copy/b.txt").unwrap();
        assert!(!storage.file_exists("copy/b.txt").unwrap());
        storage.delete_directory("moved").unwrap();
        assert!(!storage.directory_exists("moved").unwrap());

        let err = storage.copy("missing.txt", "x.txt").unwrap_err();
        assert_eq!(err.destination(), Some("x.txt"));
    }

    #[test]
    fn visibility_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(
            StorageConfig::new(dir.path()).with_visibility(Visibility::Private),
        )
        .unwrap();
        storage.write("secret.txt", b"x").unwrap();
        assert_eq!(storage.metadata("secret.txt").unwrap().visibility(), Visibility::Private);

        storage.set_visibility("secret.txt", Visibility::Public).unwrap();
        assert_eq!(storage.metadata("secret.txt").unwrap().visibility(), Visibility::Public);
    }

    #[test]
    fn refuses_to_delete_root() {
        let (_dir, storage) = storage();
        assert!(storage.delete_directory("/").is_err());
    }
}
