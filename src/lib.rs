//! # storefind
//!
//! File discovery and filtering over pluggable storage backends.
//!
//! A [`Finder`] lists a path through a [`Storage`](fs::Storage) backend and narrows the
//! listing with a fixed chain of filters: entry kind, extension allow and deny lists,
//! date predicates and size predicates. The result can then be counted, iterated and
//! sorted.
//!
//! Size and date predicates are small expressions:
//!
//! | expression            | meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `"< 25"`              | smaller than 25 bytes                     |
//! | `">= 1kb"`            | at least 1024 bytes                       |
//! | `"after 2021-01-01"`  | modified after midnight UTC on that day   |
//! | `"> 3 days"`          | modified within the last three days       |
//! | `"before 1 month"`    | not modified for a calendar month         |
//!
//! ```
//! use storefind::{Store, fs::MemoryStorage};
//!
//! let store = Store::new(MemoryStorage::new());
//! store.put("cache/file1.txt", b"123456789").unwrap();
//! store.put("cache/file2.txt", b"123").unwrap();
//! store.put("cache/file1.php", b"<?php echo 'hello'; ?>").unwrap();
//!
//! let mut finder = store.find().within("cache").files().only("txt").size("> 5");
//! let found = finder.get().unwrap();
//! assert_eq!(found.paths(), ["cache/file1.txt"]);
//! ```
//!
//! The library logs through [`tracing`] and never installs a subscriber itself.

mod config;
mod error;
pub mod filters;
pub mod fs;
mod store;
#[cfg(test)]
mod test;
pub mod util;
pub mod walk;

pub use config::StorageConfig;
pub use error::{
    ConfigError, Error, ExpressionError, ExpressionErrorKind, Operation, Result, StorageError,
};
pub use store::Store;
pub use walk::{Finder, ResultCollection};
