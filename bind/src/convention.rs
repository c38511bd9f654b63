//! Conventions: build-time hooks that extend the model after introspection.
//!
//! A convention receives the [`BuildContext`] once, after every annotated
//! member has been introspected. It may add options and arguments, bind
//! them to members, and register lifecycle callbacks. It cannot remove
//! anything.
//!
//! Two conventions ship with the crate:
//!
//! - [`FieldPatternConvention`] binds untagged string members by naming
//!   pattern.
//! - [`RemainingArgumentsConvention`] collects unexpected tokens into an
//!   untagged list member.

use std::sync::LazyLock;

use command_bind_core::{BuildError, OptionCategory, OptionDescriptor, ValueType};
use regex::Regex;
use tracing::debug;

use crate::context::{BuildContext, unsupported};
use crate::value::RawValue;

static UNDERSCORE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^_+").expect("underscore prefix regex"));

/// A pluggable build-time hook.
///
/// Closures taking a `&mut BuildContext` implement this trait.
pub trait Convention<T> {
    /// Applies the convention.
    fn apply(&self, context: &mut BuildContext<'_, T>) -> Result<(), BuildError>;
}

impl<T, F> Convention<T> for F
where
    F: Fn(&mut BuildContext<'_, T>) -> Result<(), BuildError>,
{
    fn apply(&self, context: &mut BuildContext<'_, T>) -> Result<(), BuildError> {
        self(context)
    }
}

/// Binds untagged `String` members whose identifier matches a pattern.
///
/// The matched part is stripped from the identifier and the rest becomes
/// the option's long name as written (`_outputDir` → `--outputDir` with
/// the default pattern).
/// Values are written in a parsing-complete callback, and only when the
/// option was given.
///
/// # Examples
///
/// ```
/// use command_bind::{Convention, FieldPatternConvention, Schema, SchemaBuilder};
///
/// #[derive(Default)]
/// struct Program {
///     name: String,
/// }
///
/// impl Schema for Program {
///     fn declare(schema: &mut SchemaBuilder<Self>) {
///         schema.member("_name", |p: &mut Self, v: String| p.name = v);
///     }
///
///     fn conventions() -> Vec<Box<dyn Convention<Self>>> {
///         vec![Box::new(FieldPatternConvention::underscore_prefixed())]
///     }
/// }
///
/// let program: Program = command_bind::parse_args(["--name", "my value"]).unwrap();
/// assert_eq!(program.name, "my value");
/// ```
#[derive(Debug, Clone)]
pub struct FieldPatternConvention {
    pattern: Regex,
}

impl FieldPatternConvention {
    /// Creates a convention matching identifiers against `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Matches identifiers starting with underscores.
    pub fn underscore_prefixed() -> Self {
        Self {
            pattern: UNDERSCORE_PREFIX.clone(),
        }
    }
}

impl<T: 'static> Convention<T> for FieldPatternConvention {
    fn apply(&self, context: &mut BuildContext<'_, T>) -> Result<(), BuildError> {
        let members = context.members();
        let candidates = members.iter().filter(|m| {
            m.is_untagged()
                && *m.value_type() == ValueType::String
                && self.pattern.is_match(m.name())
        });

        for member in candidates {
            let stripped = self.pattern.replace(member.name(), "");
            if stripped.is_empty() {
                return Err(BuildError::Convention(format!(
                    "member '{}' has no name left after removing the pattern",
                    member.name()
                )));
            }

            let handle = context.add_option(
                OptionDescriptor::new(OptionCategory::SingleValue)
                    .with_long(&*stripped)
                    .with_value_name(&*stripped),
            )?;
            debug!(
                member = member.name(),
                option = %format!("--{stripped}"),
                "Bound member by naming pattern"
            );

            let setter = member.setter();
            context.on_parsing_complete(move |target, execution| {
                if let Some(value) = execution.result().value(handle) {
                    setter(target, RawValue::Single(value.to_string()))?;
                }
                Ok(())
            });
        }

        Ok(())
    }
}

/// Writes the tokens nothing accepted onto an untagged `Vec<String>` member.
///
/// Only useful together with
/// [`AppSettings::allow_unexpected_arguments`](crate::AppSettings::allow_unexpected_arguments);
/// otherwise unexpected tokens fail the parse. Does nothing if the schema
/// has no member with the given identifier.
#[derive(Debug, Clone)]
pub struct RemainingArgumentsConvention {
    member: String,
}

impl RemainingArgumentsConvention {
    /// Targets the member with the given identifier.
    pub fn new(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
        }
    }
}

impl Default for RemainingArgumentsConvention {
    fn default() -> Self {
        Self::new("RemainingArguments")
    }
}

impl<T: 'static> Convention<T> for RemainingArgumentsConvention {
    fn apply(&self, context: &mut BuildContext<'_, T>) -> Result<(), BuildError> {
        let Some(member) = context.member(&self.member) else {
            debug!(member = %self.member, "No member for remaining arguments");
            return Ok(());
        };

        if !member.is_untagged() {
            return Err(BuildError::Convention(format!(
                "member '{}' already has a role and cannot receive remaining arguments",
                member.name()
            )));
        }
        if !member.accepts(OptionCategory::MultiValue) {
            return Err(unsupported(member, OptionCategory::MultiValue));
        }

        let setter = member.setter();
        context.on_parsing_complete(move |target, execution| {
            setter(target, RawValue::Many(execution.remaining_arguments().to_vec()))?;
            Ok(())
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use command_bind_core::CommandModel;

    use super::*;
    use crate::schema::{OptionRole, SchemaBuilder};

    #[derive(Default)]
    struct Target {
        name: String,
        color: String,
        count: i32,
        rest: Vec<String>,
    }

    fn builder() -> SchemaBuilder<Target> {
        let mut builder = SchemaBuilder::new();
        builder.member("_name", |t: &mut Target, v: String| t.name = v);
        builder.member("color", |t: &mut Target, v: String| t.color = v);
        builder.member("_count", |t: &mut Target, v: i32| t.count = v);
        builder.member("Rest", |t: &mut Target, v: Vec<String>| t.rest = v);
        builder
    }

    #[test]
    fn test_field_pattern_binds_matching_strings_only() {
        let builder = builder();
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        FieldPatternConvention::underscore_prefixed()
            .apply(&mut context)
            .unwrap();

        assert!(context.model().find_long("name").is_some());
        assert!(context.model().find_long("color").is_none());
        assert!(context.model().find_long("count").is_none());
        assert_eq!(context.parsing_complete_count(), 1);
    }

    #[test]
    fn test_field_pattern_keeps_identifier_casing() {
        let mut builder = SchemaBuilder::new();
        builder.member("_outputDir", |t: &mut Target, v: String| t.name = v);
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        FieldPatternConvention::underscore_prefixed()
            .apply(&mut context)
            .unwrap();

        let handle = context.model().find_long("outputDir").unwrap();
        let option = context.model().option(handle).unwrap();
        assert_eq!(option.value_name.as_deref(), Some("outputDir"));
        assert_eq!(option.short_name, None);
        assert!(context.model().find_long("output-dir").is_none());
    }

    #[test]
    fn test_field_pattern_custom_regex() {
        let builder = builder();
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        FieldPatternConvention::new("^col")
            .unwrap()
            .apply(&mut context)
            .unwrap();

        assert!(context.model().find_long("or").is_some());
    }

    #[test]
    fn test_field_pattern_rejects_empty_remainder() {
        let mut builder = SchemaBuilder::new();
        builder.member("___", |t: &mut Target, v: String| t.name = v);
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        let err = FieldPatternConvention::underscore_prefixed()
            .apply(&mut context)
            .unwrap_err();
        assert!(matches!(err, BuildError::Convention(_)));
    }

    #[test]
    fn test_remaining_arguments_missing_member_is_noop() {
        let builder = builder();
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        RemainingArgumentsConvention::new("Nothing")
            .apply(&mut context)
            .unwrap();
        assert_eq!(context.parsing_complete_count(), 0);
    }

    #[test]
    fn test_remaining_arguments_requires_list() {
        let builder = builder();
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        let err = RemainingArgumentsConvention::new("color")
            .apply(&mut context)
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedCoercion { .. }));
    }

    #[test]
    fn test_remaining_arguments_rejects_tagged_member() {
        let mut builder = builder();
        builder
            .member("Extra", |t: &mut Target, v: Vec<String>| t.rest = v)
            .option(OptionRole::new());
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        let err = RemainingArgumentsConvention::new("Extra")
            .apply(&mut context)
            .unwrap_err();
        assert!(matches!(err, BuildError::Convention(_)));
    }

    #[test]
    fn test_closure_convention() {
        let builder = builder();
        let mut context = BuildContext::new(builder.members(), CommandModel::new());

        let convention = |context: &mut BuildContext<'_, Target>| -> Result<(), BuildError> {
            context.on_target_initialized(|target: &mut Target| {
                target.count = 1;
                Ok(())
            });
            Ok(())
        };
        convention.apply(&mut context).unwrap();

        assert_eq!(context.target_initialized_count(), 1);
    }
}
