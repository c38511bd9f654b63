//! The build context shared by the introspector and conventions, and the
//! execution context handed to callbacks once tokens are parsed.
//!
//! A [`BuildContext`] lives for a single build. It only grows: options,
//! arguments, write-backs and callbacks can be added, nothing can be
//! removed.

use command_bind_core::{
    ArgumentDescriptor, ArgumentHandle, BuildError, CommandModel, OptionCategory,
    OptionDescriptor, OptionHandle, ParseResult,
};
use tracing::debug;

use crate::binder::{Binder, ValueSource, WriteBack};
use crate::error::CallbackError;
use crate::schema::Member;

/// Callback run on the fresh instance, before tokens are parsed.
pub type TargetInitializedAction<T> = Box<dyn FnMut(&mut T) -> Result<(), CallbackError>>;

/// Callback run after write-backs, before validation.
pub type ParsingCompleteAction<T> =
    Box<dyn FnMut(&mut T, &ExecutionContext<'_>) -> Result<(), CallbackError>>;

/// Mutable state of one build pass.
pub struct BuildContext<'s, T> {
    members: &'s [Member<T>],
    model: CommandModel,
    binder: Binder<T>,
    initialized: Vec<TargetInitializedAction<T>>,
    parsing_complete: Vec<ParsingCompleteAction<T>>,
}

pub(crate) struct BuildParts<T> {
    pub(crate) model: CommandModel,
    pub(crate) binder: Binder<T>,
    pub(crate) initialized: Vec<TargetInitializedAction<T>>,
    pub(crate) parsing_complete: Vec<ParsingCompleteAction<T>>,
}

impl<'s, T> BuildContext<'s, T> {
    /// Starts a build over `members` with a prepared model.
    pub fn new(members: &'s [Member<T>], model: CommandModel) -> Self {
        Self {
            members,
            model,
            binder: Binder::new(),
            initialized: Vec::new(),
            parsing_complete: Vec::new(),
        }
    }

    /// Name of the schema type being built.
    pub fn target_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Every declared member of the schema.
    pub fn members(&self) -> &'s [Member<T>] {
        self.members
    }

    /// Finds a member by identifier.
    pub fn member(&self, name: &str) -> Option<&'s Member<T>> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// The model assembled so far.
    pub fn model(&self) -> &CommandModel {
        &self.model
    }

    /// Write-backs registered so far.
    pub fn binder(&self) -> &Binder<T> {
        &self.binder
    }

    /// Adds an option to the model.
    pub fn add_option(&mut self, option: OptionDescriptor) -> Result<OptionHandle, BuildError> {
        self.model.add_option(option)
    }

    /// Appends a positional argument to the model.
    pub fn add_argument(
        &mut self,
        argument: ArgumentDescriptor,
    ) -> Result<ArgumentHandle, BuildError> {
        self.model.add_argument(argument)
    }

    /// Registers a write-back from an option onto a member.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedCoercion`] if the member's type
    /// cannot receive the option's category, or
    /// [`BuildError::UnknownHandle`] if the handle came from another model.
    pub fn bind_option(
        &mut self,
        member: &Member<T>,
        handle: OptionHandle,
    ) -> Result<(), BuildError> {
        let option = self
            .model
            .option(handle)
            .ok_or(BuildError::UnknownHandle {
                kind: "option",
                index: handle.index(),
            })?;
        let source = ValueSource::Option {
            handle,
            category: option.category,
        };
        let display_name = option.display_name();
        self.register(member, source, display_name)
    }

    /// Registers a write-back from a positional argument onto a member.
    ///
    /// # Errors
    ///
    /// Same as [`bind_option`](Self::bind_option).
    pub fn bind_argument(
        &mut self,
        member: &Member<T>,
        handle: ArgumentHandle,
    ) -> Result<(), BuildError> {
        let argument = self
            .model
            .argument(handle)
            .ok_or(BuildError::UnknownHandle {
                kind: "argument",
                index: handle.index(),
            })?;
        let source = ValueSource::Argument {
            handle,
            multiple: argument.multiple_values,
        };
        let display_name = argument.name.clone();
        self.register(member, source, display_name)
    }

    fn register(
        &mut self,
        member: &Member<T>,
        source: ValueSource,
        display_name: String,
    ) -> Result<(), BuildError> {
        let category = source.category();
        if !member.accepts(category) {
            return Err(unsupported(member, category));
        }

        debug!(member = member.name(), source = %display_name, "Registered write-back");
        self.binder.register(WriteBack::new(
            member.name(),
            display_name,
            source,
            member.setter(),
        ));
        Ok(())
    }

    /// Adds a callback run on the fresh instance before parsing.
    pub fn on_target_initialized<F>(&mut self, action: F)
    where
        F: FnMut(&mut T) -> Result<(), CallbackError> + 'static,
    {
        self.initialized.push(Box::new(action));
    }

    /// Adds a callback run after parsing and write-backs.
    pub fn on_parsing_complete<F>(&mut self, action: F)
    where
        F: FnMut(&mut T, &ExecutionContext<'_>) -> Result<(), CallbackError> + 'static,
    {
        self.parsing_complete.push(Box::new(action));
    }

    /// Number of registered target-initialized callbacks.
    pub fn target_initialized_count(&self) -> usize {
        self.initialized.len()
    }

    /// Number of registered parsing-complete callbacks.
    pub fn parsing_complete_count(&self) -> usize {
        self.parsing_complete.len()
    }

    pub(crate) fn into_parts(self) -> BuildParts<T> {
        BuildParts {
            model: self.model,
            binder: self.binder,
            initialized: self.initialized,
            parsing_complete: self.parsing_complete,
        }
    }
}

pub(crate) fn unsupported<T>(member: &Member<T>, category: OptionCategory) -> BuildError {
    BuildError::UnsupportedCoercion {
        member: member.name().to_string(),
        value_type: member.value_type().clone(),
        category,
    }
}

/// What parsing produced, as seen by callbacks and the execute hook.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    tokens: &'a [String],
    model: &'a CommandModel,
    result: &'a ParseResult,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(tokens: &'a [String], model: &'a CommandModel, result: &'a ParseResult) -> Self {
        Self {
            tokens,
            model,
            result,
        }
    }

    /// The original tokens.
    pub fn tokens(&self) -> &'a [String] {
        self.tokens
    }

    /// The parsing model.
    pub fn model(&self) -> &'a CommandModel {
        self.model
    }

    /// Values collected for every option and argument.
    pub fn result(&self) -> &'a ParseResult {
        self.result
    }

    /// Tokens nothing accepted, when unexpected arguments are tolerated.
    pub fn remaining_arguments(&self) -> &'a [String] {
        self.result.remaining_arguments()
    }
}
