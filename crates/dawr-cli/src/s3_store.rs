//! AWS S3 implementation of the store traits
//!
//! Documents are plain objects read through `GetObject`; lifecycle
//! configurations go through the bucket lifecycle API, converting
//! between the SDK's typed rule model and ours at this boundary.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use aws_sdk_s3::types::{
    AbortIncompleteMultipartUpload as SdkAbort, BucketLifecycleConfiguration,
    ChecksumAlgorithm as SdkChecksumAlgorithm, ExpirationStatus, LifecycleExpiration,
    LifecycleRule as SdkRule, LifecycleRuleAndOperator, LifecycleRuleFilter,
    NoncurrentVersionExpiration as SdkNoncurrentExpiration,
    NoncurrentVersionTransition as SdkNoncurrentTransition, Tag,
    Transition as SdkTransition, TransitionDefaultMinimumObjectSize, TransitionStorageClass,
};
use aws_sdk_s3::Client;
use chrono::NaiveDate;
use dawr_core::lifecycle::{
    AbortIncompleteMultipartUpload, Expiration, Filter, LifecycleConfiguration, LifecycleRule,
    NoncurrentVersionExpiration, NoncurrentVersionTransition, RuleStatus, StorageClass, Transition,
};
use dawr_core::{Error, Result};
use dawr_sync::store::{DocumentStore, LifecycleStore};

/// Create an S3 client from the default credential chain, optionally
/// pointed at a custom endpoint (path-style, for S3-compatible stores).
pub async fn create_client(region: &str, endpoint: Option<&str>) -> Client {
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    Client::from_conf(builder.build())
}

/// Both store traits over one S3 client.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for S3Store {
    async fn list_documents(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = &continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|e| {
                Error::Storage(format!(
                    "list documents under 's3://{bucket}/{prefix}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    keys.push(key.to_string());
                }
            }

            if resp.is_truncated().unwrap_or(false) {
                continuation_token = resp.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }
        Ok(keys)
    }

    async fn get_document(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "read 's3://{bucket}/{key}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        let body = resp.body.collect().await.map_err(|e| {
            Error::Storage(format!("read body of 's3://{bucket}/{key}': {e}"))
        })?;
        Ok(body.into_bytes().to_vec())
    }
}

#[async_trait]
impl LifecycleStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| Error::Storage(format!("list buckets: {}", DisplayErrorContext(&e))))?;
        Ok(resp
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .map(str::to_string)
            .collect())
    }

    async fn get_lifecycle(&self, bucket: &str) -> Result<Option<LifecycleConfiguration>> {
        match self
            .client
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
        {
            Ok(resp) => {
                let mut config = LifecycleConfiguration::for_bucket(bucket);
                config.transition_minimum_object_size = resp
                    .transition_default_minimum_object_size()
                    .map(|size| {
                        dawr_core::lifecycle::TransitionMinimumObjectSize::parse(size.as_str())
                    })
                    .transpose()?;
                for sdk_rule in resp.rules() {
                    config.add_rule(rule_from_sdk(sdk_rule)?, false)?;
                }
                Ok(Some(config))
            }
            Err(e) => {
                let service = e.into_service_error();
                if service.code() == Some("NoSuchLifecycleConfiguration") {
                    return Ok(None);
                }
                Err(Error::Storage(format!(
                    "get lifecycle configuration for '{bucket}': {service}"
                )))
            }
        }
    }

    async fn put_lifecycle(&self, bucket: &str, config: &LifecycleConfiguration) -> Result<()> {
        let rules = config
            .rules()
            .iter()
            .map(rule_to_sdk)
            .collect::<Result<Vec<_>>>()?;
        let lifecycle = BucketLifecycleConfiguration::builder()
            .set_rules(Some(rules))
            .build()
            .map_err(|e| Error::Storage(format!("build lifecycle configuration: {e}")))?;

        let mut req = self
            .client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(lifecycle);
        if let Some(algorithm) = &config.checksum_algorithm {
            req = req.checksum_algorithm(SdkChecksumAlgorithm::from(algorithm.as_str()));
        }
        if let Some(owner) = &config.expected_bucket_owner {
            req = req.expected_bucket_owner(owner);
        }
        if let Some(size) = &config.transition_minimum_object_size {
            req = req.transition_default_minimum_object_size(
                TransitionDefaultMinimumObjectSize::from(size.as_str()),
            );
        }

        req.send().await.map_err(|e| {
            Error::Storage(format!(
                "put lifecycle configuration for '{bucket}': {}",
                DisplayErrorContext(&e)
            ))
        })?;
        Ok(())
    }

    async fn delete_lifecycle(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket_lifecycle()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "delete lifecycle configuration for '{bucket}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

// ---- SDK -> model ----

fn rule_from_sdk(rule: &SdkRule) -> Result<LifecycleRule> {
    let mut builder = LifecycleRule::builder();
    if let Some(id) = rule.id() {
        builder = builder.id(id);
    }
    #[allow(deprecated)]
    if let Some(prefix) = rule.prefix() {
        builder = builder.prefix(prefix);
    }
    builder = builder.status(RuleStatus::parse(rule.status().as_str())?);
    if let Some(filter) = rule.filter() {
        builder = builder.filter(filter_from_sdk(filter));
    }
    if let Some(expiration) = rule.expiration() {
        builder = builder.expiration(Expiration {
            date: expiration.date().and_then(date_from_sdk),
            days: expiration.days().and_then(to_u32),
            expired_object_delete_marker: expiration.expired_object_delete_marker(),
        });
    }
    for transition in rule.transitions() {
        builder = builder.transition(Transition {
            date: transition.date().and_then(date_from_sdk),
            days: transition.days().and_then(to_u32),
            storage_class: storage_class_from_sdk(transition.storage_class())?,
        });
    }
    for transition in rule.noncurrent_version_transitions() {
        builder = builder.noncurrent_transition(NoncurrentVersionTransition {
            noncurrent_days: transition.noncurrent_days().and_then(to_u32),
            newer_noncurrent_versions: transition.newer_noncurrent_versions().and_then(to_u32),
            storage_class: storage_class_from_sdk(transition.storage_class())?,
        });
    }
    if let Some(expiration) = rule.noncurrent_version_expiration() {
        builder = builder.noncurrent_expiration(NoncurrentVersionExpiration {
            noncurrent_days: expiration.noncurrent_days().and_then(to_u32),
            newer_noncurrent_versions: expiration.newer_noncurrent_versions().and_then(to_u32),
        });
    }
    if let Some(abort) = rule.abort_incomplete_multipart_upload() {
        builder = builder.abort_incomplete_multipart_upload(AbortIncompleteMultipartUpload {
            days_after_initiation: abort.days_after_initiation().and_then(to_u32),
        });
    }
    Ok(builder.build())
}

fn filter_from_sdk(filter: &LifecycleRuleFilter) -> Filter {
    let mut result = Filter::new();
    result.prefix = filter.prefix().map(str::to_string);
    if let Some(tag) = filter.tag() {
        result.tag_key = Some(tag.key().to_string());
        result.tag_value = Some(tag.value().to_string());
    }
    result.object_size_greater_than = filter.object_size_greater_than().and_then(to_u64);
    result.object_size_less_than = filter.object_size_less_than().and_then(to_u64);

    // Combined criteria arrive wrapped in an And operator; flatten them.
    if let Some(and) = filter.and() {
        if result.prefix.is_none() {
            result.prefix = and.prefix().map(str::to_string);
        }
        if result.tag_key.is_none() {
            if let Some(tag) = and.tags().first() {
                result.tag_key = Some(tag.key().to_string());
                result.tag_value = Some(tag.value().to_string());
            }
        }
        if result.object_size_greater_than.is_none() {
            result.object_size_greater_than = and.object_size_greater_than().and_then(to_u64);
        }
        if result.object_size_less_than.is_none() {
            result.object_size_less_than = and.object_size_less_than().and_then(to_u64);
        }
    }
    result
}

fn storage_class_from_sdk(class: Option<&TransitionStorageClass>) -> Result<Option<StorageClass>> {
    class
        .map(|c| StorageClass::parse(c.as_str()))
        .transpose()
}

fn date_from_sdk(dt: &SdkDateTime) -> Option<NaiveDate> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(dt.secs(), 0).map(|d| d.date_naive())
}

fn to_u32(n: i32) -> Option<u32> {
    u32::try_from(n).ok()
}

fn to_u64(n: i64) -> Option<u64> {
    u64::try_from(n).ok()
}

// ---- model -> SDK ----

#[allow(deprecated)]
fn rule_to_sdk(rule: &LifecycleRule) -> Result<SdkRule> {
    let mut builder = SdkRule::builder().id(rule.id());
    // The SDK requires a status on every rule; an undeclared status
    // means Enabled at the wire boundary.
    let status = rule.status().unwrap_or_default();
    builder = builder.status(ExpirationStatus::from(status.as_str()));

    match (rule.filter(), rule.prefix()) {
        (Some(filter), _) => builder = builder.filter(filter_to_sdk(filter)?),
        (None, Some(prefix)) => builder = builder.prefix(prefix),
        // The API wants either Prefix or Filter on every rule; an empty
        // prefix filter matches everything.
        (None, None) => {
            builder = builder.filter(LifecycleRuleFilter::builder().prefix("").build())
        }
    }

    if let Some(expiration) = rule.expiration() {
        let mut exp = LifecycleExpiration::builder();
        if let Some(date) = &expiration.date {
            exp = exp.date(date_to_sdk(date));
        }
        if let Some(days) = expiration.days {
            exp = exp.days(days as i32);
        }
        if let Some(marker) = expiration.expired_object_delete_marker {
            exp = exp.expired_object_delete_marker(marker);
        }
        builder = builder.expiration(exp.build());
    }
    for transition in rule.transitions() {
        let mut t = SdkTransition::builder();
        if let Some(date) = &transition.date {
            t = t.date(date_to_sdk(date));
        }
        if let Some(days) = transition.days {
            t = t.days(days as i32);
        }
        if let Some(class) = &transition.storage_class {
            t = t.storage_class(TransitionStorageClass::from(class.as_str()));
        }
        builder = builder.transitions(t.build());
    }
    for transition in rule.noncurrent_transitions() {
        let mut t = SdkNoncurrentTransition::builder();
        if let Some(days) = transition.noncurrent_days {
            t = t.noncurrent_days(days as i32);
        }
        if let Some(keep) = transition.newer_noncurrent_versions {
            t = t.newer_noncurrent_versions(keep as i32);
        }
        if let Some(class) = &transition.storage_class {
            t = t.storage_class(TransitionStorageClass::from(class.as_str()));
        }
        builder = builder.noncurrent_version_transitions(t.build());
    }
    if let Some(expiration) = rule.noncurrent_expiration() {
        let mut exp = SdkNoncurrentExpiration::builder();
        if let Some(days) = expiration.noncurrent_days {
            exp = exp.noncurrent_days(days as i32);
        }
        if let Some(keep) = expiration.newer_noncurrent_versions {
            exp = exp.newer_noncurrent_versions(keep as i32);
        }
        builder = builder.noncurrent_version_expiration(exp.build());
    }
    if let Some(abort) = rule.abort_incomplete_multipart_upload() {
        let mut a = SdkAbort::builder();
        if let Some(days) = abort.days_after_initiation {
            a = a.days_after_initiation(days as i32);
        }
        builder = builder.abort_incomplete_multipart_upload(a.build());
    }

    builder
        .build()
        .map_err(|e| Error::Storage(format!("build lifecycle rule '{}': {e}", rule.id())))
}

/// A filter with more than one criterion must travel inside an And
/// operator; a single criterion rides at the top level.
fn filter_to_sdk(filter: &Filter) -> Result<LifecycleRuleFilter> {
    let tag = match (&filter.tag_key, &filter.tag_value) {
        (Some(key), Some(value)) => Some(
            Tag::builder()
                .key(key)
                .value(value)
                .build()
                .map_err(|e| Error::Storage(format!("build filter tag: {e}")))?,
        ),
        _ => None,
    };

    let criteria = usize::from(filter.prefix.is_some())
        + usize::from(tag.is_some())
        + usize::from(filter.object_size_greater_than.is_some())
        + usize::from(filter.object_size_less_than.is_some());

    if criteria > 1 {
        let mut and = LifecycleRuleAndOperator::builder();
        if let Some(prefix) = &filter.prefix {
            and = and.prefix(prefix);
        }
        if let Some(tag) = tag {
            and = and.tags(tag);
        }
        if let Some(size) = filter.object_size_greater_than {
            and = and.object_size_greater_than(size as i64);
        }
        if let Some(size) = filter.object_size_less_than {
            and = and.object_size_less_than(size as i64);
        }
        return Ok(LifecycleRuleFilter::builder().and(and.build()).build());
    }

    let mut builder = LifecycleRuleFilter::builder();
    if let Some(prefix) = &filter.prefix {
        builder = builder.prefix(prefix);
    }
    if let Some(tag) = tag {
        builder = builder.tag(tag);
    }
    if let Some(size) = filter.object_size_greater_than {
        builder = builder.object_size_greater_than(size as i64);
    }
    if let Some(size) = filter.object_size_less_than {
        builder = builder.object_size_less_than(size as i64);
    }
    Ok(builder.build())
}

fn date_to_sdk(date: &NaiveDate) -> SdkDateTime {
    let secs = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default();
    SdkDateTime::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dawr_core::lifecycle::RuleStatus;

    fn sample_rule() -> LifecycleRule {
        LifecycleRule::builder()
            .id("expire-30")
            .status(RuleStatus::Enabled)
            .filter(Filter::new().with_prefix("logs/"))
            .expiration(Expiration::days(30))
            .build()
    }

    #[test]
    fn test_rule_round_trip_through_sdk_types() {
        let rule = sample_rule();
        let restored = rule_from_sdk(&rule_to_sdk(&rule).unwrap()).unwrap();
        assert_eq!(restored.fingerprint(), rule.fingerprint());
        assert_eq!(restored.id(), "expire-30");
    }

    #[test]
    fn test_transition_round_trip_through_sdk_types() {
        let rule = LifecycleRule::builder()
            .id("archive")
            .status(RuleStatus::Enabled)
            .transition(Transition::after_days(90, StorageClass::Glacier))
            .noncurrent_transition(
                NoncurrentVersionTransition::after_days(30, StorageClass::DeepArchive).retaining(2),
            )
            .abort_incomplete_multipart_upload(AbortIncompleteMultipartUpload::after_days(7))
            .build();
        let restored = rule_from_sdk(&rule_to_sdk(&rule).unwrap()).unwrap();
        assert_eq!(restored.fingerprint(), rule.fingerprint());
    }

    #[test]
    fn test_multi_criteria_filter_uses_and_operator() {
        let filter = Filter::new()
            .with_prefix("data/")
            .with_tag("env", "prod")
            .with_object_size_greater_than(1024);
        let sdk = filter_to_sdk(&filter).unwrap();
        assert!(sdk.and().is_some());
        assert!(sdk.prefix().is_none());

        // And-wrapped filters flatten back to the same model value.
        assert_eq!(filter_from_sdk(&sdk), filter);
    }

    #[test]
    fn test_single_criterion_filter_stays_flat() {
        let filter = Filter::new().with_prefix("logs/");
        let sdk = filter_to_sdk(&filter).unwrap();
        assert!(sdk.and().is_none());
        assert_eq!(sdk.prefix(), Some("logs/"));
    }

    #[test]
    fn test_missing_status_defaults_to_enabled() {
        let rule = LifecycleRule::builder()
            .id("bare")
            .expiration(Expiration::days(1))
            .build();
        let sdk = rule_to_sdk(&rule).unwrap();
        assert_eq!(sdk.status(), &ExpirationStatus::Enabled);
    }

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(date_from_sdk(&date_to_sdk(&date)), Some(date));
    }
}
