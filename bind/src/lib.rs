//! Declarative binding of command-line tokens onto typed schemas.
//!
//! A schema type lists its members once. Each member is tagged as an option
//! or a positional argument, or left untagged for conventions to pick up.
//! From that declaration this crate builds a
//! [`CommandModel`](command_bind_core::CommandModel), parses tokens against
//! it, and writes the parsed values onto a fresh instance of the schema.
//!
//! # Pipeline
//!
//! 1. [`Schema::declare`] lists members through a [`SchemaBuilder`].
//! 2. The [`Introspector`] turns tagged members into options and arguments,
//!    deriving names and categories where none are given.
//! 3. [`Convention`]s extend the result.
//! 4. A [`BoundApp`] runs the lifecycle: initialize, parse, bind, validate,
//!    execute.
//!
//! # Example
//!
//! ```
//! use command_bind::{ArgumentRole, LifecycleState, OptionRole, Schema, SchemaBuilder};
//!
//! #[derive(Default)]
//! struct Greet {
//!     count: i32,
//!     subject: String,
//! }
//!
//! impl Schema for Greet {
//!     fn declare(schema: &mut SchemaBuilder<Self>) {
//!         schema
//!             .member("Count", |g: &mut Self, v: i32| g.count = v)
//!             .option(OptionRole::new().short_name("n"));
//!         schema
//!             .member("Subject", |g: &mut Self, v: String| g.subject = v)
//!             .argument(ArgumentRole::new(0));
//!     }
//! }
//!
//! let result = command_bind::execute::<Greet, _, _>(["-n", "3", "world"]).unwrap();
//! assert_eq!(result.exit_code, 0);
//! let greet = result.instance.unwrap();
//! assert_eq!((greet.count, greet.subject.as_str()), (3, "world"));
//!
//! let result = command_bind::execute::<Greet, _, _>(["--count", "abc"]).unwrap();
//! assert_eq!(result.exit_code, 1);
//! assert!(matches!(result.state, LifecycleState::Failed(_)));
//! ```

mod binder;
mod context;
mod convention;
mod error;
mod execute;
mod introspect;
mod schema;
mod settings;
mod value;

pub use command_bind_core::{
    ArgumentDescriptor, BuildError, CommandModel, OptionCategory, OptionDescriptor, ParseError,
    ParseResult, TypeMapper, ValueType, Violation,
};

pub use binder::{Binder, ValueSource, WriteBack};
pub use context::{
    BuildContext, ExecutionContext, ParsingCompleteAction, TargetInitializedAction,
};
pub use convention::{Convention, FieldPatternConvention, RemainingArgumentsConvention};
pub use error::{CallbackError, Error, Failure, SettingsError};
pub use execute::{AppBuilder, BoundApp, ExecutionResult, LifecycleState, execute, parse_args};
pub use introspect::Introspector;
pub use schema::{ArgumentRole, Member, MemberSetter, OptionRole, Schema, SchemaBuilder};
pub use settings::{AppSettings, DEFAULT_HELP_OPTION};
pub use value::{Bindable, CoercionError, RawValue};
