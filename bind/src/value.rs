//! Raw parsed values and their coercion into member types.
//!
//! A [`Bindable`] type declares which [`ValueType`] it is, which option
//! categories it can receive, and how a [`RawValue`] becomes an instance of
//! it. Setter closures on schema members are typed on a `Bindable` value, so
//! the declared type of every member is known without runtime inspection.

use std::str::FromStr;

use command_bind_core::{OptionCategory, ValueType};
use thiserror::Error;

/// A value as collected by the parser, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Whether a flag was present.
    Flag(bool),
    /// The value of a single-value option or argument.
    Single(String),
    /// Every value of a multi-value option or argument.
    Many(Vec<String>),
}

impl RawValue {
    /// Text of the value, for messages.
    pub fn describe(&self) -> String {
        match self {
            RawValue::Flag(present) => present.to_string(),
            RawValue::Single(value) => value.clone(),
            RawValue::Many(values) => values.join(" "),
        }
    }

    /// Returns the single value, or a coercion error for other shapes.
    pub fn into_single(self, expected: &str) -> Result<String, CoercionError> {
        match self {
            RawValue::Single(value) => Ok(value),
            other => Err(CoercionError::new(other.describe(), expected)),
        }
    }

    /// Parses the single value with [`FromStr`].
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind::RawValue;
    ///
    /// let port: u16 = RawValue::Single("8080".into()).parse("a port number").unwrap();
    /// assert_eq!(port, 8080);
    ///
    /// let err = RawValue::Single("http".into()).parse::<u16>("a port number").unwrap_err();
    /// assert_eq!(err.value, "http");
    /// ```
    pub fn parse<V: FromStr>(self, expected: &str) -> Result<V, CoercionError> {
        let value = self.into_single(expected)?;
        value
            .parse()
            .map_err(|_| CoercionError::new(value, expected))
    }
}

/// A raw value that could not be converted to the member's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}'; expected {expected}")]
pub struct CoercionError {
    /// The offending text.
    pub value: String,
    /// What the member accepts.
    pub expected: String,
}

impl CoercionError {
    /// Creates a coercion error.
    pub fn new(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// A type a schema member can be bound to.
///
/// Implement this for application types to bind them directly; pair it with
/// a [`TypeMapper`](command_bind_core::TypeMapper) registration (or an
/// explicit option type) when the type is [`ValueType::Named`].
///
/// # Examples
///
/// ```
/// use command_bind::{Bindable, CoercionError, RawValue};
/// use command_bind_core::{OptionCategory, ValueType};
///
/// #[derive(Debug, PartialEq)]
/// enum Level { Low, High }
///
/// impl Bindable for Level {
///     fn value_type() -> ValueType {
///         ValueType::named("Level")
///     }
///
///     fn accepts(category: OptionCategory) -> bool {
///         category == OptionCategory::SingleValue
///     }
///
///     fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
///         match raw.into_single("low or high")?.as_str() {
///             "low" => Ok(Level::Low),
///             "high" => Ok(Level::High),
///             other => Err(CoercionError::new(other, "low or high")),
///         }
///     }
/// }
///
/// assert_eq!(Level::coerce(RawValue::Single("high".into())), Ok(Level::High));
/// ```
pub trait Bindable: Sized + 'static {
    /// Declared type used for category resolution.
    fn value_type() -> ValueType;

    /// Whether values of `category` can be coerced into this type.
    fn accepts(category: OptionCategory) -> bool;

    /// Converts a raw value.
    fn coerce(raw: RawValue) -> Result<Self, CoercionError>;
}

impl Bindable for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn accepts(category: OptionCategory) -> bool {
        category == OptionCategory::Flag
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Flag(present) => Ok(present),
            other => Err(CoercionError::new(other.describe(), "a flag")),
        }
    }
}

impl Bindable for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn accepts(category: OptionCategory) -> bool {
        category == OptionCategory::SingleValue
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        raw.into_single("a single value")
    }
}

impl Bindable for Vec<String> {
    fn value_type() -> ValueType {
        ValueType::StringList
    }

    fn accepts(category: OptionCategory) -> bool {
        category == OptionCategory::MultiValue
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Many(values) => Ok(values),
            other => Err(CoercionError::new(other.describe(), "a list of values")),
        }
    }
}

macro_rules! numeric_bindable {
    ($value_type:ident => $($ty:ty),+) => {
        $(
            impl Bindable for $ty {
                fn value_type() -> ValueType {
                    ValueType::$value_type
                }

                fn accepts(category: OptionCategory) -> bool {
                    category == OptionCategory::SingleValue
                }

                fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
                    raw.parse("a valid number")
                }
            }
        )+
    };
}

numeric_bindable!(Integer => i8, i16, i32, i64, i128, isize);
numeric_bindable!(Unsigned => u8, u16, u32, u64, u128, usize);
numeric_bindable!(Float => f32, f64);

impl<V: Bindable> Bindable for Option<V> {
    fn value_type() -> ValueType {
        V::value_type()
    }

    fn accepts(category: OptionCategory) -> bool {
        V::accepts(category)
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        V::coerce(raw).map(Some)
    }
}
