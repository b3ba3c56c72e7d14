//! In-memory store backing the test suites

use crate::store::{DocumentStore, LifecycleStore};
use async_trait::async_trait;
use dawr_core::lifecycle::LifecycleConfiguration;
use dawr_core::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    // bucket -> key -> bytes
    documents: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    // bucket -> wire-format lifecycle payload
    lifecycles: BTreeMap<String, Value>,
    buckets: BTreeSet<String>,
    put_calls: usize,
    delete_calls: usize,
}

/// Both store traits over process memory. Lifecycle configurations are
/// held in their wire payload form so every get/put exercises the same
/// serialization path a real backend would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket(&self, name: impl Into<String>) {
        self.lock().buckets.insert(name.into());
    }

    pub fn put_document(&self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.lock()
            .documents
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), content.into());
    }

    /// The stored wire payload for a bucket, if any.
    pub fn lifecycle_payload(&self, bucket: &str) -> Option<Value> {
        self.lock().lifecycles.get(bucket).cloned()
    }

    pub fn put_calls(&self) -> usize {
        self.lock().put_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .documents
            .get(bucket)
            .map(|keys| {
                keys.keys()
                    .filter(|key| key.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_document(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .documents
            .get(bucket)
            .and_then(|keys| keys.get(key))
            .cloned()
            .ok_or_else(|| Error::Storage(format!("no such document: s3://{bucket}/{key}")))
    }
}

#[async_trait]
impl LifecycleStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let inner = self.lock();
        let mut names: BTreeSet<String> = inner.buckets.clone();
        names.extend(inner.lifecycles.keys().cloned());
        Ok(names.into_iter().collect())
    }

    async fn get_lifecycle(&self, bucket: &str) -> Result<Option<LifecycleConfiguration>> {
        match self.lock().lifecycles.get(bucket) {
            None => Ok(None),
            Some(payload) => LifecycleConfiguration::from_value(payload).map(Some),
        }
    }

    async fn put_lifecycle(&self, bucket: &str, config: &LifecycleConfiguration) -> Result<()> {
        let mut inner = self.lock();
        inner.put_calls += 1;
        inner
            .lifecycles
            .insert(bucket.to_string(), config.to_payload());
        Ok(())
    }

    async fn delete_lifecycle(&self, bucket: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.delete_calls += 1;
        inner.lifecycles.remove(bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dawr_core::lifecycle::{Expiration, LifecycleRule, RuleStatus};

    #[tokio::test]
    async fn test_lifecycle_round_trip_through_payload() {
        let store = MemoryStore::new();
        let mut config = LifecycleConfiguration::for_bucket("logs-bucket");
        config
            .add_rule(
                LifecycleRule::builder()
                    .id("expire-30")
                    .status(RuleStatus::Enabled)
                    .expiration(Expiration::days(30))
                    .build(),
                false,
            )
            .unwrap();

        store.put_lifecycle("logs-bucket", &config).await.unwrap();
        let restored = store.get_lifecycle("logs-bucket").await.unwrap().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(
            restored.rules()[0].fingerprint(),
            config.rules()[0].fingerprint()
        );
    }

    #[tokio::test]
    async fn test_missing_lifecycle_is_none() {
        let store = MemoryStore::new();
        store.create_bucket("empty-bucket");
        assert!(store.get_lifecycle("empty-bucket").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_listing_filters_prefix() {
        let store = MemoryStore::new();
        store.put_document("cfg", "lifecycle/a.toml", "a = 1");
        store.put_document("cfg", "lifecycle/b.toml", "b = 1");
        store.put_document("cfg", "other/c.toml", "c = 1");

        let keys = store.list_documents("cfg", "lifecycle/").await.unwrap();
        assert_eq!(keys, vec!["lifecycle/a.toml", "lifecycle/b.toml"]);
        assert!(store.get_document("cfg", "other/missing.toml").await.is_err());
    }
}
