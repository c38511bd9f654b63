//! Deferred write-backs from parsed values onto a schema instance.
//!
//! Write-backs are applied in registration order. Later write-backs may rely
//! on what earlier ones wrote, so the order is part of the contract.

use command_bind_core::{ArgumentHandle, OptionCategory, OptionHandle, ParseResult};

use crate::error::Failure;
use crate::schema::MemberSetter;
use crate::value::RawValue;

/// Where a write-back reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// An option of the given category.
    Option {
        handle: OptionHandle,
        category: OptionCategory,
    },
    /// A positional argument.
    Argument {
        handle: ArgumentHandle,
        multiple: bool,
    },
}

impl ValueSource {
    /// The category of value this source yields.
    pub fn category(&self) -> OptionCategory {
        match *self {
            ValueSource::Option { category, .. } => category,
            ValueSource::Argument { multiple: true, .. } => OptionCategory::MultiValue,
            ValueSource::Argument { multiple: false, .. } => OptionCategory::SingleValue,
        }
    }

    /// Reads the raw value from a parse result.
    ///
    /// Flags always yield a value (their presence). Multi-value sources
    /// always yield their (possibly empty) list. Single-value sources yield
    /// nothing when absent, leaving the member at its default.
    pub fn read(&self, result: &ParseResult) -> Option<RawValue> {
        match *self {
            ValueSource::Option { handle, category } => match category {
                OptionCategory::Flag => Some(RawValue::Flag(result.has_value(handle))),
                OptionCategory::SingleValue => result
                    .value(handle)
                    .map(|v| RawValue::Single(v.to_string())),
                OptionCategory::MultiValue => Some(RawValue::Many(result.values(handle).to_vec())),
            },
            ValueSource::Argument {
                handle,
                multiple: true,
            } => Some(RawValue::Many(result.argument_values(handle).to_vec())),
            ValueSource::Argument {
                handle,
                multiple: false,
            } => result
                .argument_value(handle)
                .map(|v| RawValue::Single(v.to_string())),
        }
    }
}

/// Transfers one parsed value onto one member.
pub struct WriteBack<T> {
    member: String,
    display_name: String,
    source: ValueSource,
    setter: MemberSetter<T>,
}

impl<T> std::fmt::Debug for WriteBack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBack")
            .field("member", &self.member)
            .field("display_name", &self.display_name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<T> WriteBack<T> {
    /// Creates a write-back. `display_name` names the option or argument in
    /// error messages.
    pub fn new(
        member: impl Into<String>,
        display_name: impl Into<String>,
        source: ValueSource,
        setter: MemberSetter<T>,
    ) -> Self {
        Self {
            member: member.into(),
            display_name: display_name.into(),
            source,
            setter,
        }
    }

    /// The target member identifier.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Where the value comes from.
    pub fn source(&self) -> ValueSource {
        self.source
    }

    /// Reads the value from `result` and writes it onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::InvalidValue`] if the value cannot be coerced to
    /// the member's type.
    pub fn apply(&self, target: &mut T, result: &ParseResult) -> Result<(), Failure> {
        let Some(raw) = self.source.read(result) else {
            return Ok(());
        };

        (self.setter)(target, raw).map_err(|e| Failure::InvalidValue {
            name: self.display_name.clone(),
            value: e.value,
            expected: e.expected,
        })
    }
}

/// Ordered list of write-backs.
pub struct Binder<T> {
    actions: Vec<WriteBack<T>>,
}

impl<T> Default for Binder<T> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<T> Binder<T> {
    /// Creates an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a write-back.
    pub fn register(&mut self, action: WriteBack<T>) {
        self.actions.push(action);
    }

    /// Number of registered write-backs.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered write-backs, in order.
    pub fn iter(&self) -> impl Iterator<Item = &WriteBack<T>> {
        self.actions.iter()
    }

    /// Applies every write-back in registration order, stopping at the
    /// first failure.
    pub fn bind(&self, target: &mut T, result: &ParseResult) -> Result<(), Failure> {
        self.actions
            .iter()
            .try_for_each(|action| action.apply(target, result))
    }
}
