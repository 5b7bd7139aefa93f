use crate::{
    Result, StorageConfig,
    fs::{FileHandle, LocalStorage, Storage},
    walk::Finder,
};

/**
 An explicit storage context: owns one backend and hands out finders and file handles for it.

 There is no process-wide default; every caller builds its own `Store`.

 # Examples
 ```
 use storefind::{Store, fs::MemoryStorage};

 let store = Store::new(MemoryStorage::new());
 store.put("cache/a.txt", b"abc").unwrap();
 store.put("cache/b.php", b"<?php").unwrap();

 let mut finder = store.find().within("cache").except("php");
 assert_eq!(finder.get().unwrap().paths(), ["cache/a.txt"]);
 assert!(store.exists("cache").unwrap());
 ```
*/
#[derive(Debug, Default)]
pub struct Store<S: Storage> {
    storage: S,
}

impl Store<LocalStorage> {
    /**
     A store over a local directory, created if missing.

     # Errors
     Returns [`Error::StorageAccess`](crate::Error::StorageAccess) if the root can't be created.
    */
    pub fn local(config: StorageConfig) -> Result<Self> {
        Ok(Self::new(LocalStorage::new(config)?))
    }
}

#[allow(clippy::missing_errors_doc)]
impl<S: Storage> Store<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// A new finder over this store's root
    #[must_use]
    pub fn find(&self) -> Finder<'_, S> {
        Finder::new(&self.storage)
    }

    #[must_use]
    pub fn file<P: Into<String>>(&self, path: P) -> FileHandle<'_, S> {
        FileHandle::new(&self.storage, path)
    }

    pub fn put(&self, path: &str, contents: &[u8]) -> Result<()> {
        Ok(self.storage.write(path, contents)?)
    }

    pub fn get(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.storage.read(path)?)
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        Ok(self.storage.delete(path)?)
    }

    pub fn copy(&self, source: &str, destination: &str) -> Result<()> {
        Ok(self.storage.copy(source, destination)?)
    }

    pub fn rename(&self, source: &str, destination: &str) -> Result<()> {
        Ok(self.storage.rename(source, destination)?)
    }

    /// True if `path` is a file or a directory
    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.storage.file_exists(path)? || self.storage.directory_exists(path)?)
    }

    pub fn mkdir(&self, path: &str) -> Result<()> {
        Ok(self.storage.create_directory(path)?)
    }

    /// Removes a directory and its contents
    pub fn rmdir(&self, path: &str) -> Result<()> {
        Ok(self.storage.delete_directory(path)?)
    }
}
