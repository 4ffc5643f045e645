pub mod json_store;
pub mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore, store_dir};
