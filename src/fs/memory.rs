use crate::{
    Operation, StorageError,
    fs::{
        Entry, EntryKind, Visibility,
        path::{normalize_path, parent},
        storage::{Storage, StorageResult},
    },
};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    io,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

#[derive(Clone, Debug)]
struct Node {
    kind: EntryKind,
    contents: Vec<u8>,
    last_modified: i64,
    visibility: Visibility,
}

impl Node {
    fn directory(last_modified: i64) -> Self {
        Self {
            kind: EntryKind::Directory,
            contents: Vec::new(),
            last_modified,
            visibility: Visibility::Public,
        }
    }

    fn to_entry(&self, path: &str) -> Entry {
        match self.kind {
            EntryKind::Directory => {
                Entry::directory(path, self.last_modified).with_visibility(self.visibility)
            }
            EntryKind::File => {
                let mime = mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_owned();
                Entry::file(path, self.contents.len() as u64, self.last_modified)
                    .with_mime_type(mime)
                    .with_visibility(self.visibility)
            }
        }
    }
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{path}' does not exist"))
}

/**
 An in-memory [`Storage`], keyed by normalised path.

 Writing a file implicitly creates its parent directories. Timestamps default to
 the wall clock at write time but can be pinned with [`MemoryStorage::set_last_modified`],
 which makes it a convenient backend for reproducible fixtures.

 Listings come back ordered by path.

 ```
 use storefind::fs::{MemoryStorage, Storage};

 let storage = MemoryStorage::new();
 storage.write("cache/file1.txt", b"123456789").unwrap();
 storage.set_last_modified("cache/file1.txt", 1_600_000_000).unwrap();

 let entries = storage.list_contents("cache", false).unwrap();
 assert_eq!(entries[0].size(), Some(9));
 assert_eq!(entries[0].last_modified(), 1_600_000_000);
 ```
*/
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_nodes(&self) -> io::Result<RwLockReadGuard<'_, BTreeMap<String, Node>>> {
        self.nodes
            .read()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))
    }

    fn write_nodes(&self) -> io::Result<RwLockWriteGuard<'_, BTreeMap<String, Node>>> {
        self.nodes
            .write()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))
    }

    fn is_directory(nodes: &BTreeMap<String, Node>, path: &str) -> bool {
        path.is_empty() || nodes.get(path).is_some_and(|node| node.kind == EntryKind::Directory)
    }

    /// Inserts directory nodes for every missing ancestor of `path`
    fn create_parents(nodes: &mut BTreeMap<String, Node>, path: &str, now: i64) -> io::Result<()> {
        let mut ancestors = Vec::new();
        let mut current = parent(path);
        while let Some(dir) = current.filter(|dir| !dir.is_empty()) {
            ancestors.push(dir);
            current = parent(dir);
        }
        for dir in ancestors.into_iter().rev() {
            match nodes.get(dir) {
                Some(node) if node.kind == EntryKind::File => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("'{dir}' is a file"),
                    ));
                }
                Some(_) => {}
                None => {
                    nodes.insert(dir.to_owned(), Node::directory(now));
                }
            }
        }
        Ok(())
    }

    /**
     Pins the modification timestamp (unix seconds) of an existing file or directory.

     # Errors
     Returns a [`StorageError`] if `path` does not exist.
    */
    pub fn set_last_modified(&self, path: &str, timestamp: i64) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::Metadata, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let mut nodes = self.write_nodes().map_err(wrap)?;
        let node = nodes.get_mut(&normalized).ok_or_else(|| wrap(not_found(path)))?;
        node.last_modified = timestamp;
        Ok(())
    }

    fn file_node(&self, operation: Operation, path: &str) -> StorageResult<Node> {
        let wrap = |err| StorageError::new(operation, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let nodes = self.read_nodes().map_err(wrap)?;
        nodes
            .get(&normalized)
            .filter(|node| node.kind == EntryKind::File)
            .cloned()
            .ok_or_else(|| wrap(not_found(path)))
    }

    fn insert_file(&self, operation: Operation, path: &str, node: Node) -> io::Result<()> {
        let normalized = normalize_path(path)?;
        let mut nodes = self.write_nodes()?;
        Self::place_file(&mut nodes, operation, normalized, node)
    }

    /// Stores `node` at `normalized` on an already locked map
    fn place_file(
        nodes: &mut BTreeMap<String, Node>,
        operation: Operation,
        normalized: String,
        node: Node,
    ) -> io::Result<()> {
        if normalized.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot write to the storage root",
            ));
        }
        if Self::is_directory(nodes, &normalized) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("'{normalized}' is a directory"),
            ));
        }
        Self::create_parents(nodes, &normalized, node.last_modified)?;
        debug!(path = %normalized, ?operation, "memory storage insert");
        nodes.insert(normalized, node);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn list_contents(&self, path: &str, recursive: bool) -> StorageResult<Vec<Entry>> {
        let wrap = |err| StorageError::new(Operation::List, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let nodes = self.read_nodes().map_err(wrap)?;
        if !Self::is_directory(&nodes, &normalized) {
            return Err(wrap(not_found(path)));
        }

        let prefix = if normalized.is_empty() {
            String::new()
        } else {
            format!("{normalized}/")
        };
        let entries: Vec<Entry> = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| recursive || parent(key) == Some(normalized.as_str()))
            .map(|(key, node)| node.to_entry(key))
            .collect();
        debug!(path = %normalized, recursive, count = entries.len(), "listed memory contents");
        Ok(entries)
    }

    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.file_node(Operation::Read, path).map(|node| node.contents)
    }

    fn write(&self, path: &str, contents: &[u8]) -> StorageResult<()> {
        let node = Node {
            kind: EntryKind::File,
            contents: contents.to_vec(),
            last_modified: Utc::now().timestamp(),
            visibility: Visibility::Public,
        };
        self.insert_file(Operation::Write, path, node)
            .map_err(|err| StorageError::new(Operation::Write, path, err))
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.file_node(Operation::Delete, path)?;
        let wrap = |err| StorageError::new(Operation::Delete, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        self.write_nodes().map_err(wrap)?.remove(&normalized);
        Ok(())
    }

    fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        let node = self
            .file_node(Operation::Copy, source)
            .map_err(|err| err.with_destination(destination))?;
        let node = Node {
            last_modified: Utc::now().timestamp(),
            ..node
        };
        self.insert_file(Operation::Copy, destination, node).map_err(|err| {
            StorageError::new(Operation::Copy, source, err).with_destination(destination)
        })
    }

    fn rename(&self, source: &str, destination: &str) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::Move, source, err).with_destination(destination);
        let from = normalize_path(source).map_err(wrap)?;
        let to = normalize_path(destination).map_err(wrap)?;
        let mut nodes = self.write_nodes().map_err(wrap)?;
        let node = nodes
            .get(&from)
            .filter(|node| node.kind == EntryKind::File)
            .cloned()
            .ok_or_else(|| wrap(not_found(source)))?;
        if from == to {
            return Ok(());
        }
        Self::place_file(&mut nodes, Operation::Move, to, node).map_err(wrap)?;
        nodes.remove(&from);
        Ok(())
    }

    fn create_directory(&self, path: &str) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::CreateDirectory, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let mut nodes = self.write_nodes().map_err(wrap)?;
        if Self::is_directory(&nodes, &normalized) {
            return Ok(());
        }
        if nodes.contains_key(&normalized) {
            return Err(wrap(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{normalized}' is a file"),
            )));
        }
        let now = Utc::now().timestamp();
        Self::create_parents(&mut nodes, &normalized, now).map_err(wrap)?;
        nodes.insert(normalized, Node::directory(now));
        Ok(())
    }

    fn delete_directory(&self, path: &str) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::DeleteDirectory, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        if normalized.is_empty() {
            return Err(wrap(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to delete the storage root",
            )));
        }
        let mut nodes = self.write_nodes().map_err(wrap)?;
        if !Self::is_directory(&nodes, &normalized) {
            return Err(wrap(not_found(path)));
        }
        let prefix = format!("{normalized}/");
        nodes.retain(|key, _| key != &normalized && !key.starts_with(&prefix));
        Ok(())
    }

    fn file_exists(&self, path: &str) -> StorageResult<bool> {
        let wrap = |err| StorageError::new(Operation::CheckExistence, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let nodes = self.read_nodes().map_err(wrap)?;
        Ok(nodes
            .get(&normalized)
            .is_some_and(|node| node.kind == EntryKind::File))
    }

    fn directory_exists(&self, path: &str) -> StorageResult<bool> {
        let wrap = |err| StorageError::new(Operation::CheckExistence, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let nodes = self.read_nodes().map_err(wrap)?;
        Ok(Self::is_directory(&nodes, &normalized))
    }

    fn metadata(&self, path: &str) -> StorageResult<Entry> {
        let wrap = |err| StorageError::new(Operation::Metadata, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let nodes = self.read_nodes().map_err(wrap)?;
        if normalized.is_empty() {
            return Ok(Entry::directory("", 0));
        }
        nodes
            .get(&normalized)
            .map(|node| node.to_entry(&normalized))
            .ok_or_else(|| wrap(not_found(path)))
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> StorageResult<()> {
        let wrap = |err| StorageError::new(Operation::SetVisibility, path, err);
        let normalized = normalize_path(path).map_err(wrap)?;
        let mut nodes = self.write_nodes().map_err(wrap)?;
        let node = nodes.get_mut(&normalized).ok_or_else(|| wrap(not_found(path)))?;
        node.visibility = visibility;
        Ok(())
    }
}
