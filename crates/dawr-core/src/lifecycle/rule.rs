//! Lifecycle rules and their content fingerprints

use crate::lifecycle::value::{field, opt_string};
use crate::lifecycle::{
    AbortIncompleteMultipartUpload, Expiration, Filter, NoncurrentVersionExpiration,
    NoncurrentVersionTransition, Transition,
};
use crate::{Error, Result};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Rule status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    Enabled,
    Disabled,
}

impl Default for RuleStatus {
    fn default() -> Self {
        Self::Enabled
    }
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(Error::InvalidArgument(format!(
                "Unknown rule status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single lifecycle rule: actions scoped by an optional filter.
///
/// The rule's identity is its `fingerprint`, a SHA-256 digest of the
/// canonical encoding of every content field except `id`. Two rules with
/// the same content always share a fingerprint regardless of how they
/// were constructed. Fields are private so the fingerprint computed at
/// build time can never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    id: String,
    prefix: Option<String>,
    status: Option<RuleStatus>,
    filter: Option<Filter>,
    expiration: Option<Expiration>,
    transitions: Vec<Transition>,
    noncurrent_transitions: Vec<NoncurrentVersionTransition>,
    noncurrent_expiration: Option<NoncurrentVersionExpiration>,
    abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
    fingerprint: String,
}

impl LifecycleRule {
    pub fn builder() -> LifecycleRuleBuilder {
        LifecycleRuleBuilder::default()
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(id) = opt_string(data, "ID", "id") {
            builder = builder.id(id);
        }
        if let Some(prefix) = opt_string(data, "Prefix", "prefix") {
            builder = builder.prefix(prefix);
        }
        if let Some(status) = opt_string(data, "Status", "status") {
            builder = builder.status(RuleStatus::parse(&status)?);
        }
        if let Some(value) = field(data, "Filter", "filter") {
            builder = builder.filter(Filter::from_value(value)?);
        }
        if let Some(value) = field(data, "Expiration", "expiration") {
            builder = builder.expiration(Expiration::from_value(value)?);
        }
        for value in list_field(data, "Transitions", "transitions")? {
            builder = builder.transition(Transition::from_value(value)?);
        }
        for value in list_field(data, "NoncurrentVersionTransitions", "noncurrent_transitions")? {
            builder = builder.noncurrent_transition(NoncurrentVersionTransition::from_value(value)?);
        }
        if let Some(value) = field(data, "NoncurrentVersionExpiration", "noncurrent_expiration") {
            builder =
                builder.noncurrent_expiration(NoncurrentVersionExpiration::from_value(value)?);
        }
        if let Some(value) = field(
            data,
            "AbortIncompleteMultipartUpload",
            "abort_incomplete_multipart_upload",
        ) {
            builder = builder.abort_incomplete_multipart_upload(
                AbortIncompleteMultipartUpload::from_value(value)?,
            );
        }
        Ok(builder.build())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn status(&self) -> Option<RuleStatus> {
        self.status
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn expiration(&self) -> Option<&Expiration> {
        self.expiration.as_ref()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn noncurrent_transitions(&self) -> &[NoncurrentVersionTransition] {
        &self.noncurrent_transitions
    }

    pub fn noncurrent_expiration(&self) -> Option<&NoncurrentVersionExpiration> {
        self.noncurrent_expiration.as_ref()
    }

    pub fn abort_incomplete_multipart_upload(&self) -> Option<&AbortIncompleteMultipartUpload> {
        self.abort_incomplete_multipart_upload.as_ref()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Normalized description of the rule's content. The `id` is
    /// deliberately excluded: it is a label, not content, and must not
    /// affect the fingerprint.
    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(prefix) = &self.prefix {
            result.insert("prefix".into(), json!(prefix));
        }
        if let Some(filter) = &self.filter {
            result.insert("filter".into(), filter.describe());
        }
        if let Some(status) = &self.status {
            result.insert("status".into(), json!(status.as_str()));
        }
        if let Some(expiration) = &self.expiration {
            result.insert("expiration".into(), expiration.describe());
        }
        if !self.transitions.is_empty() {
            result.insert(
                "transitions".into(),
                Value::Array(self.transitions.iter().map(Transition::describe).collect()),
            );
        }
        if !self.noncurrent_transitions.is_empty() {
            result.insert(
                "noncurrent_transitions".into(),
                Value::Array(
                    self.noncurrent_transitions
                        .iter()
                        .map(NoncurrentVersionTransition::describe)
                        .collect(),
                ),
            );
        }
        if let Some(expiration) = &self.noncurrent_expiration {
            result.insert("noncurrent_expiration".into(), expiration.describe());
        }
        if let Some(abort) = &self.abort_incomplete_multipart_upload {
            result.insert("abort_incomplete_multipart_upload".into(), abort.describe());
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        result.insert("ID".into(), json!(self.id));
        if let Some(filter) = &self.filter {
            result.insert("Filter".into(), filter.to_payload());
        }
        if let Some(prefix) = &self.prefix {
            result.insert("Prefix".into(), json!(prefix));
        }
        if let Some(status) = &self.status {
            result.insert("Status".into(), json!(status.as_str()));
        }
        if let Some(expiration) = &self.expiration {
            result.insert("Expiration".into(), expiration.to_payload());
        }
        if !self.transitions.is_empty() {
            result.insert(
                "Transitions".into(),
                Value::Array(self.transitions.iter().map(Transition::to_payload).collect()),
            );
        }
        if !self.noncurrent_transitions.is_empty() {
            result.insert(
                "NoncurrentVersionTransitions".into(),
                Value::Array(
                    self.noncurrent_transitions
                        .iter()
                        .map(NoncurrentVersionTransition::to_payload)
                        .collect(),
                ),
            );
        }
        if let Some(expiration) = &self.noncurrent_expiration {
            result.insert("NoncurrentVersionExpiration".into(), expiration.to_payload());
        }
        if let Some(abort) = &self.abort_incomplete_multipart_upload {
            result.insert(
                "AbortIncompleteMultipartUpload".into(),
                abort.to_payload(),
            );
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        let mut result = Map::new();
        result.insert("id".into(), json!(self.id));
        if let Some(prefix) = &self.prefix {
            result.insert("prefix".into(), json!(prefix));
        }
        if let Some(filter) = &self.filter {
            result.insert("filter".into(), filter.to_dict());
        }
        if let Some(status) = &self.status {
            result.insert("status".into(), json!(status.as_str()));
        }
        if let Some(expiration) = &self.expiration {
            result.insert("expiration".into(), expiration.to_dict());
        }
        if !self.transitions.is_empty() {
            result.insert(
                "transitions".into(),
                Value::Array(self.transitions.iter().map(Transition::to_dict).collect()),
            );
        }
        if !self.noncurrent_transitions.is_empty() {
            result.insert(
                "noncurrent_transitions".into(),
                Value::Array(
                    self.noncurrent_transitions
                        .iter()
                        .map(NoncurrentVersionTransition::to_dict)
                        .collect(),
                ),
            );
        }
        if let Some(expiration) = &self.noncurrent_expiration {
            result.insert("noncurrent_expiration".into(), expiration.to_dict());
        }
        if let Some(abort) = &self.abort_incomplete_multipart_upload {
            result.insert("abort_incomplete_multipart_upload".into(), abort.to_dict());
        }
        Value::Object(result)
    }
}

impl std::fmt::Display for LifecycleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

fn list_field<'a>(data: &'a Value, wire: &str, internal: &str) -> Result<Vec<&'a Value>> {
    match field(data, wire, internal) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(other) => Err(Error::invalid_value(
            internal,
            format!("expected a list, got {other}"),
        )),
    }
}

/// Builder for [`LifecycleRule`]. `build()` computes the fingerprint
/// exactly once; an unset `id` defaults to the fingerprint itself.
#[derive(Debug, Default)]
pub struct LifecycleRuleBuilder {
    id: Option<String>,
    prefix: Option<String>,
    status: Option<RuleStatus>,
    filter: Option<Filter>,
    expiration: Option<Expiration>,
    transitions: Vec<Transition>,
    noncurrent_transitions: Vec<NoncurrentVersionTransition>,
    noncurrent_expiration: Option<NoncurrentVersionExpiration>,
    abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
}

impl LifecycleRuleBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn status(mut self, status: RuleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn noncurrent_transition(mut self, transition: NoncurrentVersionTransition) -> Self {
        self.noncurrent_transitions.push(transition);
        self
    }

    pub fn noncurrent_expiration(mut self, expiration: NoncurrentVersionExpiration) -> Self {
        self.noncurrent_expiration = Some(expiration);
        self
    }

    pub fn abort_incomplete_multipart_upload(
        mut self,
        abort: AbortIncompleteMultipartUpload,
    ) -> Self {
        self.abort_incomplete_multipart_upload = Some(abort);
        self
    }

    pub fn build(self) -> LifecycleRule {
        let mut rule = LifecycleRule {
            id: String::new(),
            prefix: self.prefix,
            status: self.status,
            filter: self.filter,
            expiration: self.expiration,
            transitions: self.transitions,
            noncurrent_transitions: self.noncurrent_transitions,
            noncurrent_expiration: self.noncurrent_expiration,
            abort_incomplete_multipart_upload: self.abort_incomplete_multipart_upload,
            fingerprint: String::new(),
        };
        rule.fingerprint = compute_fingerprint(&rule.describe());
        rule.id = self.id.unwrap_or_else(|| rule.fingerprint.clone());
        rule
    }
}

/// SHA-256 hex digest of the canonical JSON encoding of a description.
/// `serde_json` object maps are ordered by key, so the encoding is
/// independent of field construction order.
fn compute_fingerprint(description: &Value) -> String {
    let canonical = description.to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
