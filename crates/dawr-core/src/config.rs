//! Configuration for Dawr
//!
//! All runtime settings come from `DAWR_*` environment variables,
//! declared through the typed settings layer so malformed values fail at
//! startup instead of mid-run.

use crate::settings::{Constant, Environ, Settings, VarKind, VarValue, Variable};
use crate::{Error, Result};

/// Workflow actions the process can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Apply computed changes to the live buckets.
    Sync,
    /// Compute and report changes without applying them.
    DryRun,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "SYNC",
            Self::DryRun => "DRYRUN",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SYNC" => Ok(Self::Sync),
            "DRYRUN" => Ok(Self::DryRun),
            other => Err(Error::InvalidArgument(format!("Unknown action: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DawrConfig {
    /// S3 URI holding the declaration documents, e.g. `s3://cfg/lifecycle/`.
    pub endpoint: Option<String>,
    /// AWS account ID the buckets live in.
    pub account: Option<String>,
    pub region: String,
    pub actions: Vec<Action>,
    pub log_level: String,
    pub app_name: String,
}

impl Default for DawrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            account: None,
            region: crate::DEFAULT_REGION.to_string(),
            actions: vec![Action::Sync],
            log_level: "info".to_string(),
            app_name: "dawr".to_string(),
        }
    }
}

impl DawrConfig {
    fn settings() -> Settings {
        Settings::new()
            .variable(Environ::new(
                Variable::new("DAWR_ENDPOINT", VarKind::String)
                    .with_description("Declaration documents URI, e.g. s3://bucket/prefix/"),
            ))
            .variable(Environ::new(
                Variable::new("DAWR_AWS_ACCOUNT", VarKind::String)
                    .with_description("AWS account number, e.g. 123456789012"),
            ))
            .variable(Environ::new(
                Variable::new("DAWR_AWS_REGION", VarKind::String)
                    .with_default(VarValue::String(crate::DEFAULT_REGION.into()))
                    .with_description("AWS region name, e.g. us-west-2"),
            ))
            .variable(Environ::new(
                Variable::new("DAWR_ACTIONS", VarKind::List)
                    .with_default(VarValue::List(vec!["SYNC".into()]))
                    .with_choice(vec![
                        VarValue::String("SYNC".into()),
                        VarValue::String("DRYRUN".into()),
                    ])
                    .with_description("Actions to run, from: [SYNC, DRYRUN]"),
            ))
            .variable(Environ::new(
                Variable::new("DAWR_LOG_LEVEL", VarKind::String)
                    .with_default(VarValue::String("info".into()))
                    .with_description("Log level (trace, debug, info, warn, error)"),
            ))
            .constant(Constant::new(
                "DAWR_APP_NAME",
                VarKind::String,
                VarValue::String("dawr".into()),
            ))
    }

    pub fn from_env() -> Result<Self> {
        let context = Self::settings().build()?;
        let mut config = Self::default();

        if let Some(endpoint) = context.get("DAWR_ENDPOINT").and_then(VarValue::as_str) {
            config.endpoint = Some(endpoint.to_string());
        }
        if let Some(account) = context.get("DAWR_AWS_ACCOUNT").and_then(VarValue::as_str) {
            config.account = Some(account.to_string());
        }
        if let Some(region) = context.get("DAWR_AWS_REGION").and_then(VarValue::as_str) {
            config.region = region.to_string();
        }
        if let Some(actions) = context.get("DAWR_ACTIONS").and_then(VarValue::as_list) {
            config.actions = actions
                .iter()
                .map(|a| Action::parse(a))
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(level) = context.get("DAWR_LOG_LEVEL").and_then(VarValue::as_str) {
            config.log_level = level.to_string();
        }
        if let Some(name) = context.get("DAWR_APP_NAME").and_then(VarValue::as_str) {
            config.app_name = name.to_string();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DawrConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.actions, vec![Action::Sync]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("sync").unwrap(), Action::Sync);
        assert_eq!(Action::parse("DryRun").unwrap(), Action::DryRun);
        assert!(Action::parse("PURGE").is_err());
    }

    // One test owns the DAWR_* variables so parallel runs cannot race.
    #[test]
    fn test_from_env() {
        std::env::set_var("DAWR_AWS_REGION", "eu-central-1");
        std::env::set_var("DAWR_ACTIONS", "DRYRUN");
        let config = DawrConfig::from_env().unwrap();
        assert_eq!(config.region, "eu-central-1");
        assert_eq!(config.actions, vec![Action::DryRun]);

        std::env::set_var("DAWR_ACTIONS", "SYNC,PURGE");
        assert!(DawrConfig::from_env().is_err());

        std::env::remove_var("DAWR_AWS_REGION");
        std::env::remove_var("DAWR_ACTIONS");
    }
}
