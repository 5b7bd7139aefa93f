use crate::{
    StorageError,
    fs::{Entry, Visibility},
};

/// Result type for storage backends
pub type StorageResult<T> = core::result::Result<T, StorageError>;

/**
 The backend the finder enumerates and the file facade forwards to.

 Paths are `/`-separated and relative to the backend's root. Implementations are
 expected to wrap every failure in a [`StorageError`] carrying the operation and path.

 Listings must not contain duplicate paths.
*/
pub trait Storage {
    /// Lists the entries under `path`. Only immediate children unless `recursive`.
    fn list_contents(&self, path: &str, recursive: bool) -> StorageResult<Vec<Entry>>;

    fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Writes `contents`, creating missing parent directories
    fn write(&self, path: &str, contents: &[u8]) -> StorageResult<()>;

    fn delete(&self, path: &str) -> StorageResult<()>;

    fn copy(&self, source: &str, destination: &str) -> StorageResult<()>;

    /// Moves a file
    fn rename(&self, source: &str, destination: &str) -> StorageResult<()>;

    fn create_directory(&self, path: &str) -> StorageResult<()>;

    /// Deletes a directory and everything below it
    fn delete_directory(&self, path: &str) -> StorageResult<()>;

    fn file_exists(&self, path: &str) -> StorageResult<bool>;

    fn directory_exists(&self, path: &str) -> StorageResult<bool>;

    /// A single entry snapshot for `path`
    fn metadata(&self, path: &str) -> StorageResult<Entry>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> StorageResult<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    #[inline]
    fn list_contents(&self, path: &str, recursive: bool) -> StorageResult<Vec<Entry>> {
        (**self).list_contents(path, recursive)
    }
    #[inline]
    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        (**self).read(path)
    }
    #[inline]
    fn write(&self, path: &str, contents: &[u8]) -> StorageResult<()> {
        (**self).write(path, contents)
    }
    #[inline]
    fn delete(&self, path: &str) -> StorageResult<()> {
        (**self).delete(path)
    }
    #[inline]
    fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        (**self).copy(source, destination)
    }
    #[inline]
    fn rename(&self, source: &str, destination: &str) -> StorageResult<()> {
        (**self).rename(source, destination)
    }
    #[inline]
    fn create_directory(&self, path: &str) -> StorageResult<()> {
        (**self).create_directory(path)
    }
    #[inline]
    fn delete_directory(&self, path: &str) -> StorageResult<()> {
        (**self).delete_directory(path)
    }
    #[inline]
    fn file_exists(&self, path: &str) -> StorageResult<bool> {
        (**self).file_exists(path)
    }
    #[inline]
    fn directory_exists(&self, path: &str) -> StorageResult<bool> {
        (**self).directory_exists(path)
    }
    #[inline]
    fn metadata(&self, path: &str) -> StorageResult<Entry> {
        (**self).metadata(path)
    }
    #[inline]
    fn set_visibility(&self, path: &str, visibility: Visibility) -> StorageResult<()> {
        (**self).set_visibility(path, visibility)
    }
}
