//! Reconciliation driver
//!
//! Walks the buckets present in both the declared and the live sets,
//! computes the fingerprint difference per bucket, and applies the
//! additions and removals. One rule's failure never stops the run.

use crate::definition::AccountDefinition;
use crate::resource::Account;
use dawr_core::lifecycle::LifecycleConfiguration;
use dawr_core::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute and report the diff without applying it.
    pub dry_run: bool,
}

/// Totals across one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub buckets: usize,
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Reconcile every bucket present in both the declared and live sets.
///
/// Buckets only declared or only live are out of scope and skipped;
/// creating buckets is not this tool's job.
pub async fn execute(
    definition: &AccountDefinition,
    account: &mut Account,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let names: Vec<String> = definition
        .buckets
        .keys()
        .filter(|name| account.buckets.contains_key(*name))
        .cloned()
        .collect();
    info!(buckets = names.len(), "Found overlapping buckets");
    debug!(declared = ?definition.bucket_names(), live = ?account.bucket_names(), "Bucket sets");

    let empty = LifecycleConfiguration::new();
    let mut report = SyncReport {
        buckets: names.len(),
        ..SyncReport::default()
    };

    for name in names {
        let declared = definition.buckets[&name]
            .lifecycle_configuration
            .as_ref()
            .unwrap_or(&empty);
        let Some(bucket) = account.buckets.get_mut(&name) else {
            continue;
        };
        if bucket.lifecycle_configuration().is_none() {
            if let Err(error) = bucket.load().await {
                warn!(bucket = %name, error = %error, "Failed to load live configuration, skipping bucket");
                continue;
            }
        }
        let live = bucket.lifecycle_configuration().unwrap_or(&empty);

        let diff = declared.difference(live);
        info!(
            bucket = %name,
            added = ?diff.added.iter().map(|r| r.id()).collect::<Vec<_>>(),
            removed = ?diff.removed.iter().map(|r| r.id()).collect::<Vec<_>>(),
            "Syncing lifecycle configuration"
        );

        if options.dry_run {
            for rule in &diff.added {
                info!(bucket = %name, rule = %rule.id(), "(dryrun) would add rule");
            }
            for rule in &diff.removed {
                info!(bucket = %name, rule = %rule.id(), "(dryrun) would remove rule");
            }
            report.added += diff.added.len();
            report.removed += diff.removed.len();
            continue;
        }

        for rule in &diff.added {
            match bucket.add_rule(rule).await {
                Ok(()) => {
                    info!(bucket = %name, rule = %rule.id(), "Added rule");
                    report.added += 1;
                }
                Err(error) => {
                    warn!(bucket = %name, rule = %rule.id(), error = %error, "Failed to add rule");
                    report.failed += 1;
                }
            }
        }
        for rule in &diff.removed {
            match bucket.remove_rule(rule).await {
                Ok(()) => {
                    info!(bucket = %name, rule = %rule.id(), "Removed rule");
                    report.removed += 1;
                }
                Err(error) => {
                    warn!(bucket = %name, rule = %rule.id(), error = %error, "Failed to remove rule");
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
