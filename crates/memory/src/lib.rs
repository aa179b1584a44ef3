//! Long-term memory for OpenClaw: embedders, vector backends, and the
//! [`MemoryStore`] facade the reasoning loop talks to.

pub mod embed;
pub mod file_backend;
pub mod in_memory;
pub mod noop;
pub mod store;
pub mod vector;

pub use embed::{HashEmbedder, ProviderEmbedder};
pub use file_backend::FileVectorStore;
pub use in_memory::InMemoryVectorStore;
pub use noop::NoopVectorStore;
pub use store::MemoryStore;
pub use vector::{cosine_similarity, rank_records};
