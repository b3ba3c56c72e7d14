//! Configuration variable declarations
//!
//! A [`Variable`] describes a named, typed setting: its kind, an optional
//! default, and an optional closed set of allowed values. [`Environ`]
//! resolves a variable against the process environment; [`Constant`] fixes
//! one at declaration time.

use crate::settings::{VarKind, VarValue};
use crate::{Error, Result};

/// Declaration of a named, typed configuration value.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub default: Option<VarValue>,
    pub description: Option<String>,
    pub choice: Option<Vec<VarValue>>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            description: None,
            choice: None,
        }
    }

    pub fn with_default(mut self, default: VarValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_choice(mut self, choice: Vec<VarValue>) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Reject values outside the declared choice set. List values are
    /// checked item by item against the string members of the set.
    pub fn validate_choice(&self, value: &VarValue) -> Result<()> {
        let Some(choice) = &self.choice else {
            return Ok(());
        };
        let allowed = |candidate: &VarValue| choice.iter().any(|c| c == candidate);
        let ok = match value {
            VarValue::List(items) => items
                .iter()
                .all(|item| allowed(&VarValue::String(item.clone()))),
            other => allowed(other),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "Value {value:?} for '{}' not in allowed choices",
                self.name
            )))
        }
    }
}

/// A variable sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Environ {
    pub spec: Variable,
}

impl Environ {
    pub fn new(spec: Variable) -> Self {
        Self { spec }
    }

    /// Read and parse the environment value, falling back to the declared
    /// default when the variable is unset. An unparseable or
    /// out-of-choice value is an error, never a silent fallback.
    pub fn resolve(&self) -> Result<Option<VarValue>> {
        match std::env::var(&self.spec.name) {
            Ok(raw) => {
                let value = self.spec.kind.parse_value(&raw)?;
                self.spec.validate_choice(&value)?;
                Ok(Some(value))
            }
            Err(_) => Ok(self.spec.default.clone()),
        }
    }
}

/// A fixed value declared in code, parsed and validated eagerly.
#[derive(Debug, Clone)]
pub struct Constant {
    pub name: String,
    pub kind: VarKind,
    pub value: VarValue,
    pub description: Option<String>,
}

impl Constant {
    pub fn new(name: impl Into<String>, kind: VarKind, value: VarValue) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            description: None,
        }
    }

    /// Parse a constant from its raw string form, failing eagerly on a
    /// value the declared kind cannot carry.
    pub fn parse(name: impl Into<String>, kind: VarKind, raw: &str) -> Result<Self> {
        let value = kind.parse_value(raw)?;
        Ok(Self::new(name, kind, value))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
