//! Descriptor types for the parsing model.
//!
//! These types describe what the parsing model accepts: options with their
//! short/long forms and value category, and positional arguments with their
//! rank. They are plain data and serialize with [`serde`], so a model can be
//! snapshotted and compared between builds.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// How many values an option takes.
///
/// # Examples
///
/// ```
/// use command_bind_core::OptionCategory;
///
/// assert!(!OptionCategory::Flag.takes_value());
/// assert!(OptionCategory::SingleValue.takes_value());
/// assert!(OptionCategory::MultiValue.takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionCategory {
    /// Presence-only option (`--verbose`).
    Flag,
    /// Option with exactly one value (`--count 3`).
    SingleValue,
    /// Option that may repeat, collecting every value (`-I a -I b`).
    MultiValue,
}

impl OptionCategory {
    /// Returns `true` if the option consumes a value token.
    pub fn takes_value(self) -> bool {
        !matches!(self, OptionCategory::Flag)
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionCategory::Flag => "flag",
            OptionCategory::SingleValue => "single value",
            OptionCategory::MultiValue => "multiple values",
        };
        f.write_str(name)
    }
}

/// Declared value type of a schema member.
///
/// The [`TypeMapper`](crate::TypeMapper) resolves these to an
/// [`OptionCategory`]. Application types that are not covered by the
/// built-in variants use [`ValueType::Named`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// `bool`.
    Bool,
    /// `String`.
    String,
    /// `Vec<String>`.
    StringList,
    /// Signed integers.
    Integer,
    /// Unsigned integers.
    Unsigned,
    /// Floating point numbers.
    Float,
    /// Any other type, identified by name.
    Named(Cow<'static, str>),
}

impl ValueType {
    /// Creates a named value type.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        ValueType::Named(name.into())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::String => f.write_str("string"),
            ValueType::StringList => f.write_str("list of strings"),
            ValueType::Integer => f.write_str("integer"),
            ValueType::Unsigned => f.write_str("unsigned integer"),
            ValueType::Float => f.write_str("float"),
            ValueType::Named(name) => f.write_str(name),
        }
    }
}

/// Index of an option inside a [`CommandModel`](crate::CommandModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionHandle(pub(crate) usize);

impl OptionHandle {
    /// Position of the option in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a positional argument inside a
/// [`CommandModel`](crate::CommandModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentHandle(pub(crate) usize);

impl ArgumentHandle {
    /// Position of the argument in positional order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An option accepted by the parsing model.
///
/// Identity is the short/long name pair; both must be unique within a model.
/// Names are stored without their leading dashes.
///
/// # Examples
///
/// ```
/// use command_bind_core::{OptionCategory, OptionDescriptor};
///
/// let opt = OptionDescriptor::new(OptionCategory::SingleValue)
///     .with_short('n')
///     .with_long("count")
///     .with_description("How many times");
/// assert_eq!(opt.display_name(), "--count");
/// assert!(opt.matches_long("count"));
/// assert!(opt.matches_short('n'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    /// Value category.
    pub category: OptionCategory,
    /// Short form without the dash (e.g. `n` for `-n`).
    pub short_name: Option<char>,
    /// Punctuation alias without the dash (e.g. `?` for `-?`).
    pub symbol_name: Option<char>,
    /// Long form without the dashes (e.g. `count` for `--count`).
    pub long_name: Option<String>,
    /// Placeholder shown for the value.
    pub value_name: Option<String>,
    /// Description for help output.
    pub description: Option<String>,
    /// Whether help output lists this option.
    pub show_in_help: bool,
    /// Whether nested commands inherit this option.
    pub inherited: bool,
    /// Whether validation requires the option to be present.
    pub required: bool,
}

impl OptionDescriptor {
    /// Creates an unnamed option of the given category.
    pub fn new(category: OptionCategory) -> Self {
        Self {
            category,
            short_name: None,
            symbol_name: None,
            long_name: None,
            value_name: None,
            description: None,
            show_in_help: true,
            inherited: false,
            required: false,
        }
    }

    /// Parses an option template such as `-n|--name <VALUE>`.
    ///
    /// Segments are separated by `|` or whitespace. `--x` sets the long
    /// name and `<x>` the value name. `-x` sets the short name when `x` is
    /// alphanumeric and the symbol name otherwise, so `-?|-h|--help` is
    /// one option with three forms.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidTemplate`] for segments that fit none of
    /// these shapes, or when a form is given twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind_core::{OptionCategory, OptionDescriptor};
    ///
    /// let opt = OptionDescriptor::from_template("-n|--name <NAME>", OptionCategory::SingleValue)
    ///     .unwrap();
    /// assert_eq!(opt.short_name, Some('n'));
    /// assert_eq!(opt.long_name.as_deref(), Some("name"));
    /// assert_eq!(opt.value_name.as_deref(), Some("NAME"));
    /// ```
    pub fn from_template(template: &str, category: OptionCategory) -> Result<Self, BuildError> {
        let invalid = |reason: &str| BuildError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut option = Self::new(category);
        for part in template
            .split(|c: char| c == '|' || c.is_whitespace())
            .filter(|p| !p.is_empty())
        {
            if let Some(long) = part.strip_prefix("--") {
                if option.long_name.is_some() {
                    return Err(invalid("more than one long name"));
                }
                if long.is_empty() {
                    return Err(invalid("empty long name"));
                }
                option.long_name = Some(long.to_string());
            } else if let Some(short) = part.strip_prefix('-') {
                let mut chars = short.chars();
                let c = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(invalid("short name must be a single character")),
                };
                let slot = if c.is_alphanumeric() {
                    &mut option.short_name
                } else {
                    &mut option.symbol_name
                };
                if slot.is_some() {
                    return Err(invalid("more than one short name of the same kind"));
                }
                *slot = Some(c);
            } else if part.starts_with('<') && part.ends_with('>') && part.len() > 2 {
                if option.value_name.is_some() {
                    return Err(invalid("more than one value name"));
                }
                option.value_name = Some(part[1..part.len() - 1].to_string());
            } else {
                return Err(invalid(&format!("unrecognized segment '{part}'")));
            }
        }

        Ok(option)
    }

    /// Sets the short name.
    pub fn with_short(mut self, short: char) -> Self {
        self.short_name = Some(short);
        self
    }

    /// Sets the symbol name.
    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol_name = Some(symbol);
        self
    }

    /// Sets the long name.
    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long_name = Some(long.into());
        self
    }

    /// Sets the value placeholder.
    pub fn with_value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Hides the option from help output.
    pub fn hidden(mut self) -> Self {
        self.show_in_help = false;
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Name used in messages: `--long` if available, else `-s`, else the
    /// symbol.
    pub fn display_name(&self) -> String {
        match (&self.long_name, self.short_name.or(self.symbol_name)) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => "<unnamed>".to_string(),
        }
    }

    /// Every single-character form: the short name, then the symbol name.
    pub fn short_forms(&self) -> impl Iterator<Item = char> {
        self.short_name.into_iter().chain(self.symbol_name)
    }

    /// Checks the long form (without dashes).
    pub fn matches_long(&self, name: &str) -> bool {
        self.long_name.as_deref() == Some(name)
    }

    /// Checks the short and symbol forms (without dash).
    pub fn matches_short(&self, name: char) -> bool {
        self.short_forms().any(|c| c == name)
    }
}

/// A positional argument accepted by the parsing model.
///
/// # Examples
///
/// ```
/// use command_bind_core::ArgumentDescriptor;
///
/// let files = ArgumentDescriptor::new("files", 1).with_multiple_values();
/// assert_eq!(files.order, 1);
/// assert!(files.multiple_values);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    /// Name used in help and messages.
    pub name: String,
    /// Description for help output.
    pub description: Option<String>,
    /// Positional rank; lower comes first.
    pub order: i32,
    /// Whether the argument absorbs every remaining positional value.
    pub multiple_values: bool,
    /// Whether help output lists this argument.
    pub show_in_help: bool,
    /// Whether validation requires a value.
    pub required: bool,
}

impl ArgumentDescriptor {
    /// Creates a single-value argument.
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            description: None,
            order,
            multiple_values: false,
            show_in_help: true,
            required: false,
        }
    }

    /// Marks the argument as accepting multiple values.
    pub fn with_multiple_values(mut self) -> Self {
        self.multiple_values = true;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_with_all_parts() {
        let opt =
            OptionDescriptor::from_template("-o|--output <FILE>", OptionCategory::SingleValue)
                .unwrap();

        assert_eq!(opt.short_name, Some('o'));
        assert_eq!(opt.long_name.as_deref(), Some("output"));
        assert_eq!(opt.value_name.as_deref(), Some("FILE"));
        assert_eq!(opt.category, OptionCategory::SingleValue);
    }

    #[test]
    fn test_template_long_only() {
        let opt = OptionDescriptor::from_template("--dry-run", OptionCategory::Flag).unwrap();

        assert_eq!(opt.short_name, None);
        assert_eq!(opt.display_name(), "--dry-run");
    }

    #[test]
    fn test_template_rejects_long_short_name() {
        let err = OptionDescriptor::from_template("-ab", OptionCategory::Flag).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_template_with_symbol_alias() {
        let opt = OptionDescriptor::from_template("-?|-h|--help", OptionCategory::Flag).unwrap();

        assert_eq!(opt.short_name, Some('h'));
        assert_eq!(opt.symbol_name, Some('?'));
        assert_eq!(opt.long_name.as_deref(), Some("help"));
        assert!(opt.matches_short('?'));
        assert!(opt.matches_short('h'));
        assert!(!opt.matches_short('x'));
    }

    #[test]
    fn test_template_rejects_two_short_names() {
        let err = OptionDescriptor::from_template("-a|-b", OptionCategory::Flag).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTemplate { .. }));

        let err = OptionDescriptor::from_template("-?|-!", OptionCategory::Flag).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_template_rejects_stray_word() {
        let err = OptionDescriptor::from_template("--name VALUE", OptionCategory::SingleValue)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_display_name_falls_back_to_short() {
        let opt = OptionDescriptor::new(OptionCategory::Flag).with_short('q');
        assert_eq!(opt.display_name(), "-q");

        let opt = OptionDescriptor::new(OptionCategory::Flag).with_symbol('?');
        assert_eq!(opt.display_name(), "-?");
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::StringList.to_string(), "list of strings");
        assert_eq!(ValueType::named("Duration").to_string(), "Duration");
    }
}
