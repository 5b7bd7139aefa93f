use chrono::{DateTime, Utc};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Whether a node is a regular file or a directory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums, reason = "Storage backends only expose these two")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public or private, as understood by the storage backend.
///
/// Local storage maps this onto unix permission bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(clippy::exhaustive_enums, reason = "This list is exhaustive")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Unix mode for a file with this visibility
    #[must_use]
    pub const fn file_mode(self) -> u32 {
        match self {
            Self::Public => 0o644,
            Self::Private => 0o600,
        }
    }

    /// Unix mode for a directory with this visibility
    #[must_use]
    pub const fn directory_mode(self) -> u32 {
        match self {
            Self::Public => 0o755,
            Self::Private => 0o700,
        }
    }

    /// Anything readable by "others" counts as public
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        if mode & 0o004 == 0 {
            Self::Private
        } else {
            Self::Public
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
 A snapshot of one file or directory, as reported by a [`Storage`](crate::fs::Storage) listing.

 Paths are `/`-separated and relative to the storage root.
 `size` and `mime_type` are only defined for files.

 # Examples
 ```
 use storefind::fs::{Entry, EntryKind};

 let entry = Entry::file("cache/file1.txt", 9, 1_700_000_000);
 assert_eq!(entry.file_name(), "file1.txt");
 assert_eq!(entry.extension(), "txt");
 assert_eq!(entry.dirname(), "cache");
 assert_eq!(entry.kind(), EntryKind::File);
 ```
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub(crate) path: String,
    pub(crate) kind: EntryKind,
    pub(crate) size: Option<u64>,
    pub(crate) last_modified: i64,
    pub(crate) mime_type: Option<String>,
    pub(crate) visibility: Visibility,
    /// Offset of the file name within `path`
    pub(crate) file_name_index: usize,
}

impl Entry {
    fn build(path: String, kind: EntryKind, size: Option<u64>, last_modified: i64) -> Self {
        let file_name_index = path.trim_end_matches('/').rfind('/').map_or(0, |pos| pos + 1);
        Self {
            path,
            kind,
            size,
            last_modified,
            mime_type: None,
            visibility: Visibility::Public,
            file_name_index,
        }
    }

    /// A file entry with the given size in bytes and modification timestamp (unix seconds)
    #[must_use]
    pub fn file<P: Into<String>>(path: P, size: u64, last_modified: i64) -> Self {
        Self::build(path.into(), EntryKind::File, Some(size), last_modified)
    }

    /// A directory entry
    #[must_use]
    pub fn directory<P: Into<String>>(path: P, last_modified: i64) -> Self {
        Self::build(path.into(), EntryKind::Directory, None, last_modified)
    }

    #[must_use]
    pub fn with_mime_type<M: Into<String>>(mut self, mime_type: M) -> Self {
        if self.is_file() {
            self.mime_type = Some(mime_type.into());
        }
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Size in bytes, `None` for directories
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Last modification as a unix timestamp in seconds
    #[inline]
    #[must_use]
    pub const fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Last modification as a UTC datetime, `None` if the timestamp is out of chrono's range
    #[must_use]
    pub fn modified_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_modified, 0)
    }

    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The last path component
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .get(self.file_name_index..)
            .unwrap_or(&self.path)
            .trim_end_matches('/')
    }

    /**
     The path without its last component, `""` for entries at the storage root

     ```
     use storefind::fs::Entry;
     assert_eq!(Entry::file("a/b/c.txt", 1, 0).dirname(), "a/b");
     assert_eq!(Entry::file("c.txt", 1, 0).dirname(), "");
     ```
    */
    #[inline]
    #[must_use]
    pub fn dirname(&self) -> &str {
        self.path
            .get(..self.file_name_index.saturating_sub(1))
            .unwrap_or_default()
    }

    /**
     The text after the last `.` of the file name.

     Returns `""` when the name has no dot or ends with one, so entries without an
     extension compare against the empty string. A leading dot counts, so `.bashrc`
     has the extension `bashrc`.
    */
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        name.rfind('.')
            .filter(|&pos| pos + 1 < name.len())
            .and_then(|pos| name.get(pos + 1..))
            .unwrap_or_default()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for Entry {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.path
    }
}
