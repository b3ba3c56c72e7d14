//! End-to-end reconciliation over the in-memory store

use dawr_sync::store::{LifecycleStore, MemoryStore};
use dawr_sync::{execute, Account, AccountDefinition, S3Uri, SyncOptions};
use std::sync::Arc;

const LOGS_DOC: &str = r#"
[bucket]
name = "logs-bucket"

[lifecycle_configuration.rules.expire-logs]
id = "expire-30"
status = "Enabled"
prefix = "logs/"

[lifecycle_configuration.rules.expire-logs.expiration]
days = 30
"#;

async fn loaded_definition(store: Arc<MemoryStore>) -> AccountDefinition {
    let uri = S3Uri::parse("s3://cfg/lifecycle/").unwrap();
    let mut definition = AccountDefinition::new(uri, store);
    definition.load().await.unwrap();
    definition
}

async fn loaded_account(store: Arc<MemoryStore>) -> Account {
    let mut account = Account::new(store);
    account.load().await.unwrap();
    account
}

#[tokio::test]
async fn sync_adds_declared_rule_to_empty_bucket() {
    let store = Arc::new(MemoryStore::new());
    store.put_document("cfg", "lifecycle/logs.toml", LOGS_DOC);
    store.create_bucket("logs-bucket");

    let definition = loaded_definition(Arc::clone(&store)).await;
    let mut account = loaded_account(Arc::clone(&store)).await;

    let report = execute(&definition, &mut account, &SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.buckets, 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(store.put_calls(), 1);
    assert_eq!(store.delete_calls(), 0);

    // The live bucket ends with exactly the declared rule.
    let live = store.get_lifecycle("logs-bucket").await.unwrap().unwrap();
    assert_eq!(live.len(), 1);
    let declared = definition.buckets["logs-bucket"]
        .lifecycle_configuration
        .as_ref()
        .unwrap();
    assert_eq!(
        live.rules()[0].fingerprint(),
        declared.rules()[0].fingerprint()
    );
    assert_eq!(live.rules()[0].id(), "expire-30");
}

#[tokio::test]
async fn sync_removes_undeclared_live_rule() {
    let store = Arc::new(MemoryStore::new());
    store.put_document("cfg", "lifecycle/logs.toml", LOGS_DOC);
    store.create_bucket("logs-bucket");

    // Seed the live side with the declared rule plus a stray one.
    let seeded = dawr_core::lifecycle::LifecycleConfiguration::from_value(&serde_json::json!({
        "Rules": [
            {"ID": "expire-30", "Status": "Enabled", "Prefix": "logs/", "Expiration": {"Days": 30}},
            {"ID": "stray", "Status": "Enabled", "Prefix": "tmp/", "Expiration": {"Days": 1}},
        ],
    }))
    .unwrap();
    store.put_lifecycle("logs-bucket", &seeded).await.unwrap();

    let definition = loaded_definition(Arc::clone(&store)).await;
    let mut account = loaded_account(Arc::clone(&store)).await;
    let report = execute(&definition, &mut account, &SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.removed, 1);

    let live = store.get_lifecycle("logs-bucket").await.unwrap().unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live.rules()[0].id(), "expire-30");
}

#[tokio::test]
async fn sync_skips_buckets_not_in_both_sets() {
    let store = Arc::new(MemoryStore::new());
    store.put_document("cfg", "lifecycle/logs.toml", LOGS_DOC);
    // Declared bucket does not exist live; a different bucket does.
    store.create_bucket("unrelated-bucket");

    let definition = loaded_definition(Arc::clone(&store)).await;
    let mut account = loaded_account(Arc::clone(&store)).await;
    let report = execute(&definition, &mut account, &SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.buckets, 0);
    assert_eq!(store.put_calls(), 0);
}

#[tokio::test]
async fn dry_run_reports_without_applying() {
    let store = Arc::new(MemoryStore::new());
    store.put_document("cfg", "lifecycle/logs.toml", LOGS_DOC);
    store.create_bucket("logs-bucket");

    let definition = loaded_definition(Arc::clone(&store)).await;
    let mut account = loaded_account(Arc::clone(&store)).await;
    let report = execute(&definition, &mut account, &SyncOptions { dry_run: true })
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(store.put_calls(), 0);
    assert!(store.get_lifecycle("logs-bucket").await.unwrap().is_none());
}

#[tokio::test]
async fn sync_converges_to_identity() {
    let store = Arc::new(MemoryStore::new());
    store.put_document("cfg", "lifecycle/logs.toml", LOGS_DOC);
    store.create_bucket("logs-bucket");

    let definition = loaded_definition(Arc::clone(&store)).await;
    let mut account = loaded_account(Arc::clone(&store)).await;
    execute(&definition, &mut account, &SyncOptions::default())
        .await
        .unwrap();

    // A second run over the converged state is a no-op.
    let mut account = loaded_account(Arc::clone(&store)).await;
    let report = execute(&definition, &mut account, &SyncOptions::default())
        .await
        .unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.removed, 0);
    assert_eq!(store.put_calls(), 1);
}
