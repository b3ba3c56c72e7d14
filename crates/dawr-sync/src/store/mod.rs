//! Storage backend traits
//!
//! The sync engine talks to two narrow interfaces: a document store that
//! holds the declaration documents and a lifecycle store that reads and
//! writes live bucket configurations. Implementations exist for AWS S3
//! (in the CLI crate) and in-memory (below, backing the test suites).

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use dawr_core::lifecycle::LifecycleConfiguration;
use dawr_core::Result;

/// Read access to the declaration documents under a prefix.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List object keys under a prefix. No ordering is guaranteed.
    async fn list_documents(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Fetch one document's raw bytes.
    async fn get_document(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Read/write access to live bucket lifecycle configurations.
///
/// The backend's lifecycle API is whole-document: `put_lifecycle`
/// replaces the entire configuration, there is no per-rule patch.
#[async_trait]
pub trait LifecycleStore: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// A bucket with no lifecycle configuration yields `Ok(None)`; that
    /// is an ordinary state, not an error.
    async fn get_lifecycle(&self, bucket: &str) -> Result<Option<LifecycleConfiguration>>;

    async fn put_lifecycle(&self, bucket: &str, config: &LifecycleConfiguration) -> Result<()>;

    async fn delete_lifecycle(&self, bucket: &str) -> Result<()>;
}
