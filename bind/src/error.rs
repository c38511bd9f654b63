//! Runtime error types.
//!
//! Structural problems are reported as
//! [`BuildError`](command_bind_core::BuildError) before anything runs.
//! Everything here concerns a single execution: bad user input, failed
//! validation, or a callback that gave up.

use command_bind_core::{BuildError, ParseError, Violation};
use thiserror::Error;

/// Error type returned by lifecycle callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Why an execution ended in the failed state.
#[derive(Debug, Error)]
pub enum Failure {
    /// The tokens did not fit the model.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A value could not be converted to its member's type.
    #[error("invalid value '{value}' for {name}; expected {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },

    /// Validation rules were violated.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    /// A target-initialized or parsing-complete callback failed.
    #[error("initialization failed: {0}")]
    Initialization(#[source] CallbackError),
}

impl Failure {
    /// The option or argument the failure is about, when there is one.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Failure::Parse(ParseError::UnexpectedArgument { token }) => Some(token.as_str()),
            Failure::Parse(ParseError::MissingValue { option })
            | Failure::Parse(ParseError::UnexpectedValue { option })
            | Failure::Parse(ParseError::TooManyValues { option, .. }) => Some(option.as_str()),
            Failure::InvalidValue { name, .. } => Some(name.as_str()),
            Failure::Validation(_) | Failure::Initialization(_) => None,
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from [`parse_args`](crate::parse_args).
#[derive(Debug, Error)]
pub enum Error {
    /// The schema is misconfigured.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The execution failed.
    #[error(transparent)]
    Failed(#[from] Failure),

    /// The help option was given.
    #[error("help was requested")]
    HelpRequested,
}

/// Errors loading [`AppSettings`](crate::AppSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_rules() {
        let failure = Failure::Validation(vec![
            Violation::MissingOption("--token".into()),
            Violation::Rule("count must be positive".into()),
        ]);

        assert_eq!(
            failure.to_string(),
            "validation failed: the option '--token' is required; count must be positive"
        );
    }

    #[test]
    fn test_subject_of_invalid_value() {
        let failure = Failure::InvalidValue {
            name: "--count".into(),
            value: "abc".into(),
            expected: "a valid number".into(),
        };

        assert_eq!(failure.subject(), Some("--count"));
        assert_eq!(
            failure.to_string(),
            "invalid value 'abc' for --count; expected a valid number"
        );
    }

    #[test]
    fn test_initialization_keeps_source() {
        let failure = Failure::Initialization("boom".into());
        assert_eq!(failure.to_string(), "initialization failed: boom");
        assert!(std::error::Error::source(&failure).is_some());
    }
}
