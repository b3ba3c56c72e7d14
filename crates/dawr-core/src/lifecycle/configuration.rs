//! Bucket lifecycle configurations and their difference

use crate::lifecycle::value::{field, opt_string};
use crate::lifecycle::LifecycleRule;
use crate::{Error, Result};
use serde_json::{json, Map, Value};

/// Checksum algorithm attached to a configuration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Crc32,
    Crc32C,
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "CRC32",
            Self::Crc32C => "CRC32C",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CRC32" => Ok(Self::Crc32),
            "CRC32C" => Ok(Self::Crc32C),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            other => Err(Error::InvalidArgument(format!(
                "Unknown checksum algorithm: {other}"
            ))),
        }
    }
}

/// Minimum object size policy for transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMinimumObjectSize {
    VariesByStorageClass,
    AllStorageClasses128K,
}

impl TransitionMinimumObjectSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VariesByStorageClass => "varies_by_storage_class",
            Self::AllStorageClasses128K => "all_storage_classes_128K",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "varies_by_storage_class" => Ok(Self::VariesByStorageClass),
            "all_storage_classes_128k" => Ok(Self::AllStorageClasses128K),
            other => Err(Error::InvalidArgument(format!(
                "Unknown transition minimum object size: {other}"
            ))),
        }
    }
}

/// The result of comparing a declared configuration against a live one.
///
/// `added` holds rules present only in the declared side (to be pushed);
/// `removed` holds rules present only in the live side (to be deleted).
/// A modified rule has a new fingerprint and therefore shows up as one
/// addition plus one removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDiff {
    pub added: Vec<LifecycleRule>,
    pub removed: Vec<LifecycleRule>,
}

impl RuleDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered collection of lifecycle rules for one bucket, unique by
/// fingerprint, plus bucket-level metadata.
///
/// Rules keep their insertion order for deterministic output; every
/// mutation goes through [`add_rule`](Self::add_rule) /
/// [`remove_rule`](Self::remove_rule), which uphold the
/// one-rule-per-fingerprint invariant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleConfiguration {
    pub bucket: Option<String>,
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
    pub expected_bucket_owner: Option<String>,
    pub transition_minimum_object_size: Option<TransitionMinimumObjectSize>,
    rules: Vec<LifecycleRule>,
}

impl LifecycleConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            ..Self::default()
        }
    }

    /// Parse a configuration from a generic mapping. Rules may live under
    /// a nested `LifecycleConfiguration`/`lifecycle_configuration` block
    /// or at the top level, as a list or as a name-keyed table (the shape
    /// declaration documents use). Duplicate fingerprints in the input
    /// collapse to the first occurrence.
    pub fn from_value(data: &Value) -> Result<Self> {
        let mut config = Self {
            bucket: opt_string(data, "Bucket", "bucket"),
            checksum_algorithm: opt_string(data, "ChecksumAlgorithm", "checksum_algorithm")
                .map(|s| ChecksumAlgorithm::parse(&s))
                .transpose()?,
            expected_bucket_owner: opt_string(data, "ExpectedBucketOwner", "expected_bucket_owner"),
            transition_minimum_object_size: opt_string(
                data,
                "TransitionDefaultMinimumObjectSize",
                "transition_minimum_object_size",
            )
            .map(|s| TransitionMinimumObjectSize::parse(&s))
            .transpose()?,
            rules: Vec::new(),
        };

        let nested = field(data, "LifecycleConfiguration", "lifecycle_configuration");
        let rules = nested
            .and_then(|block| field(block, "Rules", "rules"))
            .or_else(|| field(data, "Rules", "rules"));

        match rules {
            None => {}
            Some(Value::Array(items)) => {
                for item in items {
                    config.add_rule(LifecycleRule::from_value(item)?, false)?;
                }
            }
            // Name-keyed rule tables iterate in key order, which keeps
            // parsing deterministic regardless of document layout.
            Some(Value::Object(table)) => {
                for item in table.values() {
                    config.add_rule(LifecycleRule::from_value(item)?, false)?;
                }
            }
            Some(other) => {
                return Err(Error::invalid_value(
                    "rules",
                    format!("expected a list or table of rules, got {other}"),
                ))
            }
        }
        Ok(config)
    }

    pub fn rules(&self) -> &[LifecycleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.rules.iter().any(|r| r.fingerprint() == fingerprint)
    }

    pub fn get(&self, fingerprint: &str) -> Option<&LifecycleRule> {
        self.rules.iter().find(|r| r.fingerprint() == fingerprint)
    }

    /// Insert a rule keyed by its fingerprint. A duplicate fingerprint is
    /// an error in strict mode and a silent no-op otherwise; the existing
    /// rule always wins.
    pub fn add_rule(&mut self, rule: LifecycleRule, strict: bool) -> Result<()> {
        if self.contains(rule.fingerprint()) {
            if strict {
                return Err(Error::DuplicateRule(rule.fingerprint().to_string()));
            }
            return Ok(());
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Remove the rule with the given fingerprint. A missing fingerprint
    /// is an error in strict mode and a silent no-op otherwise.
    pub fn remove_rule(&mut self, fingerprint: &str, strict: bool) -> Result<()> {
        let before = self.rules.len();
        self.rules.retain(|r| r.fingerprint() != fingerprint);
        if self.rules.len() == before && strict {
            return Err(Error::RuleNotFound(fingerprint.to_string()));
        }
        Ok(())
    }

    /// Compare this configuration (the declared state) against another
    /// (the live state). Purely fingerprint-keyed; neither side is
    /// mutated.
    pub fn difference(&self, other: &LifecycleConfiguration) -> RuleDiff {
        let added = self
            .rules
            .iter()
            .filter(|rule| !other.contains(rule.fingerprint()))
            .cloned()
            .collect();
        let removed = other
            .rules
            .iter()
            .filter(|rule| !self.contains(rule.fingerprint()))
            .cloned()
            .collect();
        RuleDiff { added, removed }
    }

    /// [`difference`](Self::difference) against a raw mapping, parsed
    /// with the normal construction rules first.
    pub fn difference_from_value(&self, other: &Value) -> Result<RuleDiff> {
        Ok(self.difference(&Self::from_value(other)?))
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(bucket) = &self.bucket {
            result.insert("bucket".into(), json!(bucket));
        }
        if let Some(algorithm) = &self.checksum_algorithm {
            result.insert("checksum_algorithm".into(), json!(algorithm.as_str()));
        }
        if !self.rules.is_empty() {
            result.insert(
                "lifecycle_configuration".into(),
                json!({
                    "rules": self.rules.iter().map(LifecycleRule::describe).collect::<Vec<_>>(),
                }),
            );
        }
        if let Some(owner) = &self.expected_bucket_owner {
            result.insert("expected_bucket_owner".into(), json!(owner));
        }
        if let Some(size) = &self.transition_minimum_object_size {
            result.insert("transition_minimum_object_size".into(), json!(size.as_str()));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(bucket) = &self.bucket {
            result.insert("Bucket".into(), json!(bucket));
        }
        if let Some(algorithm) = &self.checksum_algorithm {
            result.insert("ChecksumAlgorithm".into(), json!(algorithm.as_str()));
        }
        if !self.rules.is_empty() {
            result.insert(
                "LifecycleConfiguration".into(),
                json!({
                    "Rules": self.rules.iter().map(LifecycleRule::to_payload).collect::<Vec<_>>(),
                }),
            );
        }
        if let Some(owner) = &self.expected_bucket_owner {
            result.insert("ExpectedBucketOwner".into(), json!(owner));
        }
        if let Some(size) = &self.transition_minimum_object_size {
            result.insert(
                "TransitionDefaultMinimumObjectSize".into(),
                json!(size.as_str()),
            );
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "bucket": self.bucket,
            "checksum_algorithm": self.checksum_algorithm.as_ref().map(ChecksumAlgorithm::as_str),
            "lifecycle_configuration": {
                "rules": self.rules.iter().map(LifecycleRule::to_dict).collect::<Vec<_>>(),
            },
            "expected_bucket_owner": self.expected_bucket_owner,
            "transition_minimum_object_size": self
                .transition_minimum_object_size
                .as_ref()
                .map(TransitionMinimumObjectSize::as_str),
        })
    }
}
