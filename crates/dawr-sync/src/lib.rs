//! Dawr Sync Library
//!
//! Declared-state loading, live-state resources, and the reconciliation
//! workflow that converges one onto the other.

pub mod definition;
pub mod resource;
pub mod store;
pub mod uri;
pub mod workflow;

pub use definition::{AccountDefinition, BucketDefinition};
pub use resource::{Account, Bucket};
pub use store::{DocumentStore, LifecycleStore, MemoryStore};
pub use uri::S3Uri;
pub use workflow::{execute, SyncOptions, SyncReport};
