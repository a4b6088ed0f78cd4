pub mod app_config;
pub mod events;
pub mod file_store;
pub mod keys;
pub mod kv;
pub mod memory;

pub use events::{EventSink, RecordingEventSink, TracingEventSink};
pub use file_store::FileStore;
pub use kv::{Collections, Entry, KeyValueStore, StoreError, StoreResult};
pub use memory::MemoryStore;
