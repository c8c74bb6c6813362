pub mod backup;
pub mod config;
pub mod keys;
pub mod kv;
pub mod mirror;

pub use backup::{export_json, import_json, BackupDocument, BackupError};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
pub use mirror::{clear_store, load_from_store, replace_all, save_to_store};
