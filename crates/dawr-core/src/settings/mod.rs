//! Settings layer: typed environment variables and constants

mod varkind;
mod variable;

pub use varkind::{VarKind, VarValue};
pub use variable::{Constant, Environ, Variable};

use crate::Result;
use std::collections::BTreeMap;

/// Registry of environment-backed variables and fixed constants that
/// resolves into one flat context map.
#[derive(Debug, Default)]
pub struct Settings {
    variables: Vec<Environ>,
    constants: Vec<Constant>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, env: Environ) -> Self {
        self.variables.push(env);
        self
    }

    pub fn constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    /// Resolve every variable against the environment and merge in the
    /// constants. Variables that resolve to nothing (unset, no default)
    /// are absent from the result.
    pub fn build(&self) -> Result<BTreeMap<String, VarValue>> {
        let mut context = BTreeMap::new();
        for env in &self.variables {
            if let Some(value) = env.resolve()? {
                context.insert(env.spec.name.clone(), value);
            }
        }
        for constant in &self.constants {
            context.insert(constant.name.clone(), constant.value.clone());
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_merges_variables_and_constants() {
        std::env::set_var("DAWR_TEST_REGION", "eu-west-1");
        let settings = Settings::new()
            .variable(Environ::new(Variable::new(
                "DAWR_TEST_REGION",
                VarKind::String,
            )))
            .variable(Environ::new(Variable::new(
                "DAWR_TEST_UNSET",
                VarKind::String,
            )))
            .constant(Constant::new(
                "APP_NAME",
                VarKind::String,
                VarValue::String("dawr".into()),
            ));

        let context = settings.build().unwrap();
        assert_eq!(
            context.get("DAWR_TEST_REGION"),
            Some(&VarValue::String("eu-west-1".into()))
        );
        assert!(!context.contains_key("DAWR_TEST_UNSET"));
        assert_eq!(
            context.get("APP_NAME"),
            Some(&VarValue::String("dawr".into()))
        );
        std::env::remove_var("DAWR_TEST_REGION");
    }
}
