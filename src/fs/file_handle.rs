#![allow(clippy::missing_errors_doc)]
use crate::fs::{Entry, Storage, StorageResult, Visibility};
use chrono::{DateTime, Utc};

/**
 A single path inside a [`Storage`], with the pass-through file operations bound to it.

 Every call goes straight to the backend; nothing is cached between calls.

 ```
 use storefind::{Store, fs::MemoryStorage};

 let store = Store::new(MemoryStorage::new());
 let file = store.file("notes/today.txt");
 file.put(b"hello").unwrap();

 assert!(file.exists().unwrap());
 assert_eq!(file.size().unwrap(), Some(5));
 assert_eq!(file.mime_type().unwrap().as_deref(), Some("text/plain"));
 ```
*/
#[derive(Debug)]
pub struct FileHandle<'s, S: Storage + ?Sized> {
    storage: &'s S,
    path: String,
}

impl<S: Storage + ?Sized> Clone for FileHandle<'_, S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            path: self.path.clone(),
        }
    }
}

impl<'s, S: Storage + ?Sized> FileHandle<'s, S> {
    #[must_use]
    pub fn new<P: Into<String>>(storage: &'s S, path: P) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Writes `contents`, replacing anything already at this path
    pub fn put(&self, contents: &[u8]) -> StorageResult<()> {
        self.storage.write(&self.path, contents)
    }

    pub fn get(&self) -> StorageResult<Vec<u8>> {
        self.storage.read(&self.path)
    }

    pub fn delete(&self) -> StorageResult<()> {
        self.storage.delete(&self.path)
    }

    pub fn exists(&self) -> StorageResult<bool> {
        self.storage.file_exists(&self.path)
    }

    /// Copies this file and returns a handle to the copy
    pub fn copy_to(&self, destination: &str) -> StorageResult<FileHandle<'s, S>> {
        self.storage.copy(&self.path, destination)?;
        Ok(FileHandle::new(self.storage, destination))
    }

    /// Moves this file, the handle follows it to `destination`
    pub fn move_to(&mut self, destination: &str) -> StorageResult<()> {
        self.storage.rename(&self.path, destination)?;
        destination.clone_into(&mut self.path);
        Ok(())
    }

    pub fn metadata(&self) -> StorageResult<Entry> {
        self.storage.metadata(&self.path)
    }

    /// Unix timestamp (seconds) of the last modification
    pub fn last_modified(&self) -> StorageResult<i64> {
        self.metadata().map(|entry| entry.last_modified())
    }

    pub fn modified_time(&self) -> StorageResult<Option<DateTime<Utc>>> {
        self.metadata().map(|entry| entry.modified_time())
    }

    /// Size in bytes, `None` for directories
    pub fn size(&self) -> StorageResult<Option<u64>> {
        self.metadata().map(|entry| entry.size())
    }

    pub fn mime_type(&self) -> StorageResult<Option<String>> {
        self.metadata().map(|entry| entry.mime_type().map(str::to_owned))
    }

    pub fn visibility(&self) -> StorageResult<Visibility> {
        self.metadata().map(|entry| entry.visibility())
    }

    pub fn set_visibility(&self, visibility: Visibility) -> StorageResult<()> {
        self.storage.set_visibility(&self.path, visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Operation, fs::MemoryStorage};

    #[test]
    fn move_follows_the_file() {
        let storage = MemoryStorage::new();
        let mut file = FileHandle::new(&storage, "a.txt");
        file.put(b"abc").unwrap();
        file.move_to("b/a.txt").unwrap();

        assert_eq!(file.path(), "b/a.txt");
        assert_eq!(file.get().unwrap(), b"abc");
        assert!(!storage.file_exists("a.txt").unwrap());
    }

    #[test]
    fn directories_have_no_size() {
        let storage = MemoryStorage::new();
        FileHandle::new(&storage, "cache/a.txt").put(b"").unwrap();
        assert_eq!(FileHandle::new(&storage, "cache/a.txt").size().unwrap(), Some(0));
        assert_eq!(FileHandle::new(&storage, "cache").size().unwrap(), None);
    }

    #[test]
    fn copy_returns_handle_to_the_copy() {
        let storage = MemoryStorage::new();
        let file = FileHandle::new(&storage, "a.txt");
        file.put(b"abc").unwrap();
        let copy = file.copy_to("c.txt").unwrap();
        assert_eq!(copy.path(), "c.txt");
        assert!(file.exists().unwrap());
        assert!(copy.exists().unwrap());
    }

    #[test]
    fn errors_carry_operation_and_path() {
        let storage = MemoryStorage::new();
        let file = FileHandle::new(&storage, "missing.txt");
        let err = file.get().unwrap_err();
        assert_eq!(err.operation(), Operation::Read);
        assert_eq!(err.path(), "missing.txt");
        assert!(file.delete().is_err());
    }

    #[test]
    fn metadata_accessors() {
        let storage = MemoryStorage::new();
        let file = FileHandle::new(&storage, "page.html");
        file.put(b"<p>").unwrap();
        storage.set_last_modified("page.html", 86_400).unwrap();
        file.set_visibility(Visibility::Private).unwrap();

        assert_eq!(file.last_modified().unwrap(), 86_400);
        assert_eq!(
            file.modified_time().unwrap().map(|time| time.to_rfc3339()),
            Some("1970-01-02T00:00:00+00:00".to_owned())
        );
        assert_eq!(file.mime_type().unwrap().as_deref(), Some("text/html"));
        assert_eq!(file.visibility().unwrap(), Visibility::Private);
    }
}
