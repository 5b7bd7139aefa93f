mod entry;
mod file_handle;
mod local;
mod memory;
mod path;
mod storage;

pub use entry::{Entry, EntryKind, Visibility};
pub use file_handle::FileHandle;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use path::normalize_path;
pub use storage::{Storage, StorageResult};
