//! Core parsing-model primitives for declarative command binding.
//!
//! This crate holds the pieces that know nothing about the application type
//! being bound:
//!
//! - [`derive_names`]: default short/long option names from a member
//!   identifier.
//! - [`TypeMapper`]: maps a declared [`ValueType`] to an
//!   [`OptionCategory`].
//! - [`OptionDescriptor`] / [`ArgumentDescriptor`]: what a command accepts.
//! - [`CommandModel`]: the append-only parsing model, with
//!   [`parse`](CommandModel::parse) and [`validate`](CommandModel::validate).
//!
//! Structural problems surface as [`BuildError`]; bad user input as
//! [`ParseError`].
//!
//! # Example
//!
//! ```
//! use command_bind_core::*;
//!
//! let names = derive_names("MaxCount").unwrap();
//! let category = TypeMapper::default().resolve(&ValueType::Integer).unwrap();
//!
//! let mut model = CommandModel::new();
//! let count = model
//!     .add_option(
//!         OptionDescriptor::new(category)
//!             .with_short(names.short)
//!             .with_long(names.long),
//!     )
//!     .unwrap();
//!
//! let ParseOutcome::Parsed(result) = model.parse(["--max-count", "3"]) else {
//!     panic!("expected a parse result");
//! };
//! assert_eq!(result.value(count), Some("3"));
//! assert!(model.validate(&result).is_valid());
//! ```

mod error;
mod mapper;
mod model;
mod names;
mod parse;
mod types;
mod validate;

pub use error::{BuildError, ParseError};
pub use mapper::TypeMapper;
pub use model::CommandModel;
pub use names::{DerivedNames, derive_names};
pub use parse::{ParseOutcome, ParseResult};
pub use types::*;
pub use validate::{ValidationOutcome, Violation};
