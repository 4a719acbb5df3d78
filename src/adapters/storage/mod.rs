//! Storage Adapters
//!
//! Implementations of the KeyValueStore port for client-local state
//! (editor layout, conversation answers).
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON file per key in a data directory
//! - **InMemoryKeyValueStore** - Values held in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
//!
//! // Production: file-based storage
//! let store = FileKeyValueStore::new("./data");
//!
//! // Testing: in-memory storage
//! let store = InMemoryKeyValueStore::new();
//! ```

mod file_store;
mod in_memory_store;

pub use file_store::FileKeyValueStore;
pub use in_memory_store::InMemoryKeyValueStore;
