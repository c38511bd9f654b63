//! Validation of option names and of parse results.
//!
//! Name checks run when an option enters a model and reject shapes the
//! tokenizer could never match. Result validation runs after binding and
//! reports every required option or argument that received no value.
//!
//! # Examples
//!
//! ```
//! use command_bind_core::*;
//!
//! let mut model = CommandModel::new();
//! model.add_argument(ArgumentDescriptor::new("file", 0).required()).unwrap();
//!
//! let ParseOutcome::Parsed(result) = model.parse(Vec::<String>::new()) else {
//!     panic!("expected a parse result");
//! };
//! assert!(!model.validate(&result).is_valid());
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::error::BuildError;
use crate::model::CommandModel;
use crate::parse::ParseResult;
use crate::types::OptionDescriptor;

/// A single violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum Violation {
    /// A required option was not given.
    #[error("the option '{0}' is required")]
    MissingOption(String),
    /// A required argument was not given.
    #[error("the argument '{0}' is required")]
    MissingArgument(String),
    /// A schema-level rule failed.
    #[error("{0}")]
    Rule(String),
}

/// Result of validating a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationOutcome {
    /// Every rule holds.
    Valid,
    /// At least one rule was violated.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    /// Builds an outcome from a list of violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(violations)
        }
    }

    /// Returns `true` when nothing was violated.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// The violated rules; empty when valid.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid(v) => v.as_slice(),
        }
    }
}

impl CommandModel {
    /// Checks required options and arguments against a parse result.
    pub fn validate(&self, result: &ParseResult) -> ValidationOutcome {
        let mut violations = Vec::new();

        for (handle, option) in self.options() {
            if option.required && !result.has_value(handle) {
                violations.push(Violation::MissingOption(option.display_name()));
            }
        }

        for (handle, argument) in self.arguments() {
            if argument.required && result.argument_values(handle).is_empty() {
                violations.push(Violation::MissingArgument(argument.name.clone()));
            }
        }

        ValidationOutcome::from_violations(violations)
    }
}

/// Checks that an option's names can be matched by the tokenizer.
///
/// A short name must be a single character other than `-`, `=` or `:`;
/// a long name must be non-empty, must not start with `-` and must not
/// contain whitespace or `=`.
pub(crate) fn validate_option_names(option: &OptionDescriptor) -> Result<(), BuildError> {
    for short in option.short_forms() {
        if matches!(short, '-' | '=' | ':') || short.is_whitespace() {
            return Err(BuildError::InvalidOptionName {
                name: format!("-{short}"),
            });
        }
    }

    if let Some(long) = &option.long_name {
        if long.is_empty()
            || long.starts_with('-')
            || long.contains('=')
            || long.chars().any(char::is_whitespace)
        {
            return Err(BuildError::InvalidOptionName {
                name: format!("--{long}"),
            });
        }
    }

    Ok(())
}
