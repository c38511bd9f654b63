//! The parsing model: the options and arguments a command accepts.
//!
//! A [`CommandModel`] is append-only. Options and arguments can be added and
//! read back through their handles, but never removed, so handles stay valid
//! for the lifetime of the model.

use serde::Serialize;

use crate::error::BuildError;
use crate::types::{ArgumentDescriptor, ArgumentHandle, OptionDescriptor, OptionHandle};
use crate::validate::validate_option_names;

/// Options and positional arguments accepted by one command.
///
/// # Examples
///
/// ```
/// use command_bind_core::*;
///
/// let mut model = CommandModel::new();
/// let verbose = model
///     .add_option(OptionDescriptor::new(OptionCategory::Flag).with_short('v').with_long("verbose"))
///     .unwrap();
/// model.add_argument(ArgumentDescriptor::new("file", 0)).unwrap();
///
/// let duplicate = OptionDescriptor::new(OptionCategory::Flag).with_long("verbose");
/// assert!(model.add_option(duplicate).is_err());
///
/// match model.parse(["-v", "input.txt"]) {
///     ParseOutcome::Parsed(result) => assert!(result.has_value(verbose)),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandModel {
    /// Command name, if known.
    pub name: Option<String>,
    /// Command description.
    pub description: Option<String>,
    /// Whether unknown tokens fail the parse or are kept as remaining arguments.
    pub throw_on_unexpected_argument: bool,
    options: Vec<OptionDescriptor>,
    arguments: Vec<ArgumentDescriptor>,
    help_option: Option<OptionHandle>,
}

impl Default for CommandModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandModel {
    /// Creates an empty model that rejects unexpected arguments.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            throw_on_unexpected_argument: true,
            options: Vec::new(),
            arguments: Vec::new(),
            help_option: None,
        }
    }

    /// Adds an option.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateOptionName`] if the short, symbol or
    /// long name is already used by another option, or
    /// [`BuildError::InvalidOptionName`] for malformed names.
    pub fn add_option(&mut self, option: OptionDescriptor) -> Result<OptionHandle, BuildError> {
        validate_option_names(&option)?;

        if let Some(long) = option.long_name.as_deref() {
            if self.find_long(long).is_some() {
                return Err(BuildError::DuplicateOptionName {
                    name: format!("--{long}"),
                });
            }
        }
        for short in option.short_forms() {
            if self.find_short(short).is_some() {
                return Err(BuildError::DuplicateOptionName {
                    name: format!("-{short}"),
                });
            }
        }

        self.options.push(option);
        Ok(OptionHandle(self.options.len() - 1))
    }

    /// Adds the option that requests help. Its presence makes
    /// [`parse`](Self::parse) return [`ParseOutcome::HelpRequested`].
    pub fn add_help_option(
        &mut self,
        option: OptionDescriptor,
    ) -> Result<OptionHandle, BuildError> {
        let handle = self.add_option(option)?;
        self.help_option = Some(handle);
        Ok(handle)
    }

    /// Appends a positional argument after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TrailingMultiValueArgument`] if the current last
    /// argument accepts multiple values.
    pub fn add_argument(
        &mut self,
        argument: ArgumentDescriptor,
    ) -> Result<ArgumentHandle, BuildError> {
        if let Some(last) = self.arguments.last() {
            if last.multiple_values {
                return Err(BuildError::TrailingMultiValueArgument {
                    name: last.name.clone(),
                });
            }
        }

        self.arguments.push(argument);
        Ok(ArgumentHandle(self.arguments.len() - 1))
    }

    /// Returns the option behind a handle, or `None` if the handle came
    /// from a different model.
    pub fn option(&self, handle: OptionHandle) -> Option<&OptionDescriptor> {
        self.options.get(handle.0)
    }

    /// Returns the argument behind a handle, or `None` if the handle came
    /// from a different model.
    pub fn argument(&self, handle: ArgumentHandle) -> Option<&ArgumentDescriptor> {
        self.arguments.get(handle.0)
    }

    /// All options, in insertion order.
    pub fn options(&self) -> impl Iterator<Item = (OptionHandle, &OptionDescriptor)> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, o)| (OptionHandle(i), o))
    }

    /// All positional arguments, in positional order.
    pub fn arguments(&self) -> impl Iterator<Item = (ArgumentHandle, &ArgumentDescriptor)> {
        self.arguments
            .iter()
            .enumerate()
            .map(|(i, a)| (ArgumentHandle(i), a))
    }

    /// Number of options, including the help option.
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Number of positional arguments.
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// The help option, if one was added.
    pub fn help_option(&self) -> Option<OptionHandle> {
        self.help_option
    }

    /// Finds an option by long name (without dashes).
    pub fn find_long(&self, name: &str) -> Option<OptionHandle> {
        self.options
            .iter()
            .position(|o| o.matches_long(name))
            .map(OptionHandle)
    }

    /// Finds an option by short or symbol name (without dash).
    pub fn find_short(&self, name: char) -> Option<OptionHandle> {
        self.options
            .iter()
            .position(|o| o.matches_short(name))
            .map(OptionHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionCategory;

    fn flag(short: char, long: &str) -> OptionDescriptor {
        OptionDescriptor::new(OptionCategory::Flag)
            .with_short(short)
            .with_long(long)
    }

    #[test]
    fn test_add_option_rejects_duplicate_long() {
        let mut model = CommandModel::new();
        model.add_option(flag('v', "verbose")).unwrap();

        let err = model.add_option(flag('x', "verbose")).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateOptionName {
                name: "--verbose".to_string()
            }
        );
    }

    #[test]
    fn test_add_option_rejects_duplicate_short() {
        let mut model = CommandModel::new();
        model.add_option(flag('v', "verbose")).unwrap();

        let err = model.add_option(flag('v', "version")).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateOptionName {
                name: "-v".to_string()
            }
        );
    }

    #[test]
    fn test_add_argument_after_multi_value_fails() {
        let mut model = CommandModel::new();
        model
            .add_argument(ArgumentDescriptor::new("files", 0).with_multiple_values())
            .unwrap();

        let err = model
            .add_argument(ArgumentDescriptor::new("dest", 1))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::TrailingMultiValueArgument {
                name: "files".to_string()
            }
        );
    }

    #[test]
    fn test_handles_are_stable() {
        let mut model = CommandModel::new();
        let a = model.add_option(flag('a', "alpha")).unwrap();
        let b = model.add_option(flag('b', "beta")).unwrap();

        assert_eq!(model.option(a).unwrap().long_name.as_deref(), Some("alpha"));
        assert_eq!(model.option(b).unwrap().long_name.as_deref(), Some("beta"));
        assert_eq!(model.find_short('b'), Some(b));
        assert_eq!(model.option_count(), 2);
    }

    #[test]
    fn test_foreign_handles_resolve_to_none() {
        let mut larger = CommandModel::new();
        larger.add_option(flag('a', "alpha")).unwrap();
        let foreign = larger.add_option(flag('b', "beta")).unwrap();
        let foreign_arg = larger
            .add_argument(ArgumentDescriptor::new("file", 0))
            .unwrap();

        let empty = CommandModel::new();
        assert!(empty.option(foreign).is_none());
        assert!(empty.argument(foreign_arg).is_none());
    }

    #[test]
    fn test_symbol_name_is_found_and_reserved() {
        let mut model = CommandModel::new();
        let help = model
            .add_help_option(
                OptionDescriptor::from_template("-?|-h|--help", OptionCategory::Flag).unwrap(),
            )
            .unwrap();

        assert_eq!(model.find_short('?'), Some(help));
        assert_eq!(model.find_short('h'), Some(help));
        assert_eq!(model.find_long("help"), Some(help));

        let err = model
            .add_option(OptionDescriptor::new(OptionCategory::Flag).with_symbol('?'))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateOptionName {
                name: "-?".to_string()
            }
        );
    }
}
