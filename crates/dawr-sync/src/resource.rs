//! Live-state resource layer
//!
//! Wraps the lifecycle store with per-bucket read-modify-write
//! semantics: every rule mutation reloads the cached configuration if
//! needed, applies the change, and pushes the whole document back.

use crate::store::LifecycleStore;
use dawr_core::lifecycle::{LifecycleConfiguration, LifecycleRule};
use dawr_core::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A live bucket and its cached lifecycle configuration.
pub struct Bucket {
    pub name: String,
    store: Arc<dyn LifecycleStore>,
    lifecycle_configuration: Option<LifecycleConfiguration>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, store: Arc<dyn LifecycleStore>) -> Self {
        Self {
            name: name.into(),
            store,
            lifecycle_configuration: None,
        }
    }

    /// Fetch the current live configuration. A bucket without one gets
    /// an empty configuration, not an error.
    pub async fn load(&mut self) -> Result<()> {
        let config = match self.store.get_lifecycle(&self.name).await? {
            Some(config) => config,
            None => {
                debug!(bucket = %self.name, "No lifecycle configuration, starting empty");
                LifecycleConfiguration::for_bucket(&self.name)
            }
        };
        self.lifecycle_configuration = Some(config);
        Ok(())
    }

    pub fn lifecycle_configuration(&self) -> Option<&LifecycleConfiguration> {
        self.lifecycle_configuration.as_ref()
    }

    /// Add a rule and push the resulting configuration to the backend.
    pub async fn add_rule(&mut self, rule: &LifecycleRule) -> Result<()> {
        if self.lifecycle_configuration.is_none() {
            self.load().await?;
        }
        if let Some(config) = self.lifecycle_configuration.as_mut() {
            config.add_rule(rule.clone(), false)?;
        }
        self.push().await
    }

    /// Remove a rule and push the resulting configuration to the
    /// backend.
    pub async fn remove_rule(&mut self, rule: &LifecycleRule) -> Result<()> {
        if self.lifecycle_configuration.is_none() {
            self.load().await?;
        }
        if let Some(config) = self.lifecycle_configuration.as_mut() {
            config.remove_rule(rule.fingerprint(), false)?;
        }
        self.push().await
    }

    /// Whole-document write. The backend rejects empty rule sets, so a
    /// configuration with no rules left becomes an explicit delete.
    async fn push(&self) -> Result<()> {
        let Some(config) = &self.lifecycle_configuration else {
            return Ok(());
        };
        if config.is_empty() {
            self.store.delete_lifecycle(&self.name).await
        } else {
            self.store.put_lifecycle(&self.name, config).await
        }
    }

    pub fn describe(&self) -> Value {
        let mut result = serde_json::Map::new();
        result.insert("name".into(), json!(self.name));
        if let Some(config) = &self.lifecycle_configuration {
            result.insert("lifecycle_configuration".into(), config.describe());
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "name": self.name,
            "lifecycle_configuration": self
                .lifecycle_configuration
                .as_ref()
                .map(LifecycleConfiguration::to_dict),
        })
    }
}

/// All buckets visible through the lifecycle store.
pub struct Account {
    store: Arc<dyn LifecycleStore>,
    pub buckets: BTreeMap<String, Bucket>,
}

impl Account {
    pub fn new(store: Arc<dyn LifecycleStore>) -> Self {
        Self {
            store,
            buckets: BTreeMap::new(),
        }
    }

    /// List buckets and load each one's live configuration. A bucket
    /// whose configuration cannot be read is excluded from this run
    /// with a warning; a failed listing is fatal.
    pub async fn load(&mut self) -> Result<()> {
        let names = self.store.list_buckets().await?;
        for name in names {
            let mut bucket = Bucket::new(&name, Arc::clone(&self.store));
            if let Err(error) = bucket.load().await {
                warn!(bucket = %name, error = %error, "Failed to load lifecycle configuration, excluding bucket");
                continue;
            }
            self.buckets.insert(name, bucket);
        }
        info!(buckets = self.buckets.len(), "Loaded live buckets");
        Ok(())
    }

    pub fn bucket_names(&self) -> Vec<&str> {
        self.buckets.keys().map(String::as_str).collect()
    }

    pub fn describe(&self) -> Value {
        json!({
            "buckets_count": self.buckets.len(),
            "bucket_names": self.bucket_names(),
        })
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "buckets": self
                .buckets
                .values()
                .map(Bucket::describe)
                .collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use dawr_core::lifecycle::{Expiration, RuleStatus};

    fn expire_rule(days: u32) -> LifecycleRule {
        LifecycleRule::builder()
            .id(format!("expire-{days}"))
            .status(RuleStatus::Enabled)
            .expiration(Expiration::days(days))
            .build()
    }

    #[tokio::test]
    async fn test_load_normalizes_missing_configuration() {
        let store = Arc::new(MemoryStore::new());
        store.create_bucket("fresh");

        let mut bucket = Bucket::new("fresh", store);
        bucket.load().await.unwrap();
        let config = bucket.lifecycle_configuration().unwrap();
        assert!(config.is_empty());
        assert_eq!(config.bucket.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_add_rule_pushes_whole_document() {
        let store = Arc::new(MemoryStore::new());
        store.create_bucket("logs-bucket");

        let mut bucket = Bucket::new("logs-bucket", Arc::clone(&store) as Arc<dyn LifecycleStore>);
        bucket.add_rule(&expire_rule(30)).await.unwrap();

        assert_eq!(store.put_calls(), 1);
        let payload = store.lifecycle_payload("logs-bucket").unwrap();
        assert_eq!(payload["LifecycleConfiguration"]["Rules"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_removing_last_rule_deletes_configuration() {
        let store = Arc::new(MemoryStore::new());
        store.create_bucket("logs-bucket");

        let rule = expire_rule(30);
        let mut bucket = Bucket::new("logs-bucket", Arc::clone(&store) as Arc<dyn LifecycleStore>);
        bucket.add_rule(&rule).await.unwrap();
        bucket.remove_rule(&rule).await.unwrap();

        // The empty configuration is deleted, never written.
        assert_eq!(store.put_calls(), 1);
        assert_eq!(store.delete_calls(), 1);
        assert!(store.lifecycle_payload("logs-bucket").is_none());
    }

    #[tokio::test]
    async fn test_account_load_lists_all_buckets() {
        let store = Arc::new(MemoryStore::new());
        store.create_bucket("alpha");
        store.create_bucket("beta");

        let mut account = Account::new(store);
        account.load().await.unwrap();
        assert_eq!(account.bucket_names(), vec!["alpha", "beta"]);
    }
}
