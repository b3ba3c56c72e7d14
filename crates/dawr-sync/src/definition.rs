//! Declared-state loader
//!
//! Reads every TOML declaration document under a prefix and aggregates
//! them into one lifecycle configuration per target bucket. A document
//! looks like:
//!
//! ```toml
//! [bucket]
//! name = "logs-bucket"
//!
//! [lifecycle_configuration.rules.expire-logs]
//! id = "expire-30"
//! status = "Enabled"
//! prefix = "logs/"
//!
//! [lifecycle_configuration.rules.expire-logs.expiration]
//! days = 30
//! ```
//!
//! Multiple documents may declare the same bucket; their rules merge
//! with first-writer-wins on fingerprint collisions. Document keys are
//! sorted before merging so the winner does not depend on backend
//! enumeration order.

use crate::store::DocumentStore;
use crate::uri::S3Uri;
use dawr_core::lifecycle::LifecycleConfiguration;
use dawr_core::{Error, Result, DECLARATION_EXTENSION};
use serde_json::{json, Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The declared state for one bucket, aggregated from one or more
/// declaration documents.
#[derive(Debug, Clone)]
pub struct BucketDefinition {
    pub name: String,
    pub lifecycle_configuration: Option<LifecycleConfiguration>,
}

impl BucketDefinition {
    pub fn describe(&self) -> Value {
        let mut result = Map::new();
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

/// All bucket definitions found under one declaration prefix.
pub struct AccountDefinition {
    pub uri: S3Uri,
    store: Arc<dyn DocumentStore>,
    pub buckets: BTreeMap<String, BucketDefinition>,
}

impl AccountDefinition {
    pub fn new(uri: S3Uri, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            uri,
            store,
            buckets: BTreeMap::new(),
        }
    }

    /// Scan and parse every eligible document under the prefix. A single
    /// unreadable or malformed document drops only its own contribution,
    /// with a warning naming the offending key.
    pub async fn load(&mut self) -> Result<()> {
        let mut keys = self
            .store
            .list_documents(&self.uri.bucket, self.uri.key_or_empty())
            .await?;
        keys.retain(|key| key.ends_with(DECLARATION_EXTENSION));
        // Canonical merge order: lexicographic by key.
        keys.sort();

        let mut aggregated: BTreeMap<String, LifecycleConfiguration> = BTreeMap::new();
        for key in keys {
            let document = match self.read_document(&key).await {
                Ok(document) => document,
                Err(error) => {
                    warn!(key = %key, error = %error, "Skipping declaration document");
                    continue;
                }
            };

            let name = match bucket_name(&document) {
                Ok(name) => name,
                Err(error) => {
                    warn!(key = %key, error = %error, "Skipping declaration document due to missing keys");
                    continue;
                }
            };

            let incoming = match LifecycleConfiguration::from_value(&document) {
                Ok(mut config) => {
                    config.bucket = Some(name.clone());
                    config
                }
                Err(error) => {
                    warn!(key = %key, bucket = %name, error = %error, "Skipping unparseable declaration document");
                    continue;
                }
            };

            match aggregated.entry(name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(incoming);
                }
                Entry::Occupied(mut slot) => {
                    warn!(bucket = %name, key = %key, "Bucket already defined, merging rules");
                    let existing = slot.get_mut();
                    for rule in incoming.rules() {
                        if existing.contains(rule.fingerprint()) {
                            warn!(
                                bucket = %name,
                                rule = %rule.id(),
                                "Rule already declared for bucket, skipped"
                            );
                            continue;
                        }
                        existing.add_rule(rule.clone(), false)?;
                    }
                }
            }
        }

        self.buckets = aggregated
            .into_iter()
            .map(|(name, config)| {
                let definition = BucketDefinition {
                    name: name.clone(),
                    lifecycle_configuration: Some(config),
                };
                (name, definition)
            })
            .collect();

        info!(
            uri = %self.uri,
            buckets = self.buckets.len(),
            "Loaded bucket definitions"
        );
        Ok(())
    }

    async fn read_document(&self, key: &str) -> Result<Value> {
        let bytes = self.store.get_document(&self.uri.bucket, key).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::malformed_document(key, format!("not valid UTF-8: {e}")))?;
        let parsed: toml::Value = toml::from_str(&text)
            .map_err(|e| Error::malformed_document(key, e.to_string()))?;
        Ok(toml_to_json(&parsed))
    }

    pub fn bucket_names(&self) -> Vec<&str> {
        self.buckets.keys().map(String::as_str).collect()
    }

    pub fn describe(&self) -> Value {
        json!({
            "uri": self.uri.to_string(),
            "buckets": self
                .buckets
                .values()
                .map(BucketDefinition::describe)
                .collect::<Vec<_>>(),
        })
    }
}

fn bucket_name(document: &Value) -> Result<String> {
    let bucket = require(document, "bucket")?;
    require(bucket, "name")?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidArgument("bucket name must be a string".into()))
}

fn require<'a>(data: &'a Value, key: &str) -> Result<&'a Value> {
    data.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::MissingKey(key.to_string()))
}

/// TOML values mapped onto JSON. Datetimes become their string form so
/// date fields parse the same way regardless of whether the author
/// quoted them.
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => json!(s),
        toml::Value::Integer(i) => json!(i),
        toml::Value::Float(f) => json!(f),
        toml::Value::Boolean(b) => json!(b),
        toml::Value::Datetime(dt) => json!(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(key, item)| (key.clone(), toml_to_json(item)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const FIRST_DOC: &str = r#"
[bucket]
name = "logs-bucket"

[lifecycle_configuration.rules.expire-logs]
id = "expire-30"
status = "Enabled"
prefix = "logs/"

[lifecycle_configuration.rules.expire-logs.expiration]
days = 30
"#;

    // Same rule content under a different id, plus one genuinely new rule.
    const SECOND_DOC: &str = r#"
[bucket]
name = "logs-bucket"

[lifecycle_configuration.rules.expire-logs]
id = "expire-30-duplicate"
status = "Enabled"
prefix = "logs/"

[lifecycle_configuration.rules.expire-logs.expiration]
days = 30

[lifecycle_configuration.rules.abort-uploads]
id = "abort-7"
status = "Enabled"

[lifecycle_configuration.rules.abort-uploads.abort_incomplete_multipart_upload]
days_after_initiation = 7
"#;

    async fn load(store: Arc<MemoryStore>) -> AccountDefinition {
        let uri = S3Uri::parse("s3://cfg/lifecycle/").unwrap();
        let mut definition = AccountDefinition::new(uri, store);
        definition.load().await.unwrap();
        definition
    }

    #[tokio::test]
    async fn test_load_single_document() {
        let store = Arc::new(MemoryStore::new());
        store.put_document("cfg", "lifecycle/logs.toml", FIRST_DOC);

        let definition = load(store).await;
        assert_eq!(definition.bucket_names(), vec!["logs-bucket"]);
        let config = definition.buckets["logs-bucket"]
            .lifecycle_configuration
            .as_ref()
            .unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config.rules()[0].id(), "expire-30");
        assert_eq!(config.bucket.as_deref(), Some("logs-bucket"));
    }

    #[tokio::test]
    async fn test_merge_first_writer_wins() {
        let store = Arc::new(MemoryStore::new());
        // Keys sort "a-..." before "b-...", so FIRST_DOC merges first.
        store.put_document("cfg", "lifecycle/a-base.toml", FIRST_DOC);
        store.put_document("cfg", "lifecycle/b-extra.toml", SECOND_DOC);

        let definition = load(store).await;
        let config = definition.buckets["logs-bucket"]
            .lifecycle_configuration
            .as_ref()
            .unwrap();

        // The colliding rule exists once, under the first document's id;
        // the second document still contributes its new rule.
        assert_eq!(config.len(), 2);
        let ids: Vec<&str> = config.rules().iter().map(|r| r.id()).collect();
        assert!(ids.contains(&"expire-30"));
        assert!(!ids.contains(&"expire-30-duplicate"));
        assert!(ids.contains(&"abort-7"));
    }

    #[tokio::test]
    async fn test_malformed_document_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.put_document("cfg", "lifecycle/bad.toml", "this is [not toml");
        store.put_document("cfg", "lifecycle/logs.toml", FIRST_DOC);
        store.put_document("cfg", "lifecycle/readme.md", "# not a declaration");

        let definition = load(store).await;
        assert_eq!(definition.bucket_names(), vec!["logs-bucket"]);
    }

    #[tokio::test]
    async fn test_document_without_bucket_name_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.put_document("cfg", "lifecycle/anonymous.toml", "[bucket]\nregion = \"x\"\n");
        store.put_document("cfg", "lifecycle/logs.toml", FIRST_DOC);

        let definition = load(store).await;
        assert_eq!(definition.bucket_names(), vec!["logs-bucket"]);
    }

    #[tokio::test]
    async fn test_unknown_storage_class_drops_document_only() {
        let store = Arc::new(MemoryStore::new());
        store.put_document(
            "cfg",
            "lifecycle/typo.toml",
            r#"
[bucket]
name = "typo-bucket"

[lifecycle_configuration.rules.archive]
status = "Enabled"

[[lifecycle_configuration.rules.archive.transitions]]
days = 90
storage_class = "GLACIAR"
"#,
        );
        store.put_document("cfg", "lifecycle/logs.toml", FIRST_DOC);

        let definition = load(store).await;
        assert_eq!(definition.bucket_names(), vec!["logs-bucket"]);
    }
}
