pub mod cache;
pub mod store;

pub use cache::KeyCache;
pub use store::{FileStore, MemoryStore};
