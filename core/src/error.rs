//! Error types for building and parsing a command model.
//!
//! Two tiers: [`BuildError`] describes a misconfigured schema and is raised
//! before any token is looked at; [`ParseError`] describes bad user input
//! found while consuming tokens.

use thiserror::Error;

use crate::types::{OptionCategory, ValueType};

/// Structural errors detected while assembling a model.
///
/// These indicate programmer error in the schema declaration and are never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A member carries both an option and an argument role.
    #[error("cannot declare both an option and an argument on member '{member}'")]
    DuplicateRole { member: String },

    /// Two arguments share the same positional order.
    #[error("arguments '{first}' and '{second}' both declare order {order}")]
    DuplicateOrder {
        order: i32,
        first: String,
        second: String,
    },

    /// No option category could be determined for a member's type.
    #[error("could not determine the option type of member '{member}' with type {value_type}")]
    UnresolvedOptionType {
        member: String,
        value_type: ValueType,
    },

    /// Two options share a short or long name.
    #[error("option name '{name}' is already in use")]
    DuplicateOptionName { name: String },

    /// A multi-value argument is followed by another argument.
    #[error("the argument '{name}' accepts multiple values; no more arguments can follow it")]
    TrailingMultiValueArgument { name: String },

    /// An option template could not be parsed.
    #[error("invalid option template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// An option has neither a short nor a long name.
    #[error("option for member '{member}' has neither a short nor a long name")]
    MissingOptionName { member: String },

    /// A short or long name has an invalid shape.
    #[error("invalid option name '{name}'")]
    InvalidOptionName { name: String },

    /// The member's type cannot receive values of the resolved category.
    #[error("member '{member}' of type {value_type} cannot be bound as {category}")]
    UnsupportedCoercion {
        member: String,
        value_type: ValueType,
        category: OptionCategory,
    },

    /// A handle does not belong to the model it was used with.
    #[error("no {kind} at index {index} in this model")]
    UnknownHandle { kind: &'static str, index: usize },

    /// A member was declared with an empty identifier.
    #[error("member identifier cannot be empty")]
    EmptyMemberName,

    /// A convention rejected the schema.
    #[error("convention failed: {0}")]
    Convention(String),
}

/// Token-level errors found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An option or positional value nobody accepts.
    #[error("unrecognized command or argument '{token}'")]
    UnexpectedArgument { token: String },

    /// An option that takes a value was last on the line.
    #[error("missing value for option '{option}'")]
    MissingValue { option: String },

    /// A flag was given an inline value (`--verbose=yes`).
    #[error("option '{option}' does not take a value")]
    UnexpectedValue { option: String },

    /// A single-value option was given more than once.
    #[error("unexpected value '{value}' for option '{option}'; it accepts a single value")]
    TooManyValues { option: String, value: String },
}
