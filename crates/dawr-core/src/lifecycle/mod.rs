//! Lifecycle policy data model
//!
//! Typed representation of bucket lifecycle rules with bidirectional
//! mapping between the backend wire format and a normalized internal
//! description, content-hash fingerprints for rule identity, and the
//! set-difference primitive the sync workflow is built on.

mod abort;
mod configuration;
mod expiration;
mod filter;
mod noncurrent;
mod rule;
mod storage_class;
mod transition;
pub(crate) mod value;

pub use abort::AbortIncompleteMultipartUpload;
pub use configuration::{
    ChecksumAlgorithm, LifecycleConfiguration, RuleDiff, TransitionMinimumObjectSize,
};
pub use expiration::Expiration;
pub use filter::Filter;
pub use noncurrent::{NoncurrentVersionExpiration, NoncurrentVersionTransition};
pub use rule::{LifecycleRule, LifecycleRuleBuilder, RuleStatus};
pub use storage_class::StorageClass;
pub use transition::Transition;
