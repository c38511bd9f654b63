//! Schema declaration: members, their roles, and the [`Schema`] trait.
//!
//! A schema lists its members once, in declaration order, through
//! [`Schema::declare`]. Each member carries a typed setter and optionally an
//! [`OptionRole`] or an [`ArgumentRole`]. Members without a role are left to
//! conventions.

use std::rc::Rc;

use command_bind_core::{OptionCategory, ValueType, Violation};

use crate::context::ExecutionContext;
use crate::convention::Convention;
use crate::settings::AppSettings;
use crate::value::{Bindable, CoercionError, RawValue};

/// Writes a raw value onto a member of `T`, coercing it first.
pub type MemberSetter<T> = Rc<dyn Fn(&mut T, RawValue) -> Result<(), CoercionError>>;

/// A type whose members bind to command-line options and arguments.
///
/// # Examples
///
/// ```
/// use command_bind::{ArgumentRole, OptionRole, Schema, SchemaBuilder};
///
/// #[derive(Default)]
/// struct CopyFiles {
///     force: bool,
///     files: Vec<String>,
/// }
///
/// impl Schema for CopyFiles {
///     fn declare(schema: &mut SchemaBuilder<Self>) {
///         schema
///             .member("Force", |c: &mut Self, v: bool| c.force = v)
///             .option(OptionRole::new().description("Overwrite existing files"));
///         schema
///             .member("Files", |c: &mut Self, v: Vec<String>| c.files = v)
///             .argument(ArgumentRole::new(0).name("files").multiple_values());
///     }
/// }
///
/// let copy: CopyFiles = command_bind::parse_args(["-f", "a", "b"]).unwrap();
/// assert!(copy.force);
/// assert_eq!(copy.files, ["a", "b"]);
/// ```
pub trait Schema: Default + Sized + 'static {
    /// Lists the members of the schema in declaration order.
    fn declare(schema: &mut SchemaBuilder<Self>);

    /// Application-level settings.
    fn settings() -> AppSettings {
        AppSettings::default()
    }

    /// Conventions applied after the members are introspected, in order.
    fn conventions() -> Vec<Box<dyn Convention<Self>>> {
        Vec::new()
    }

    /// Schema-level validation rules, checked after parsing completes.
    fn validate(&self) -> Vec<Violation> {
        Vec::new()
    }

    /// Runs the command. `None` means success (exit code `0`).
    fn on_execute(&mut self, context: &ExecutionContext<'_>) -> Option<i32> {
        let _ = context;
        None
    }
}

/// Collects the members of a schema.
pub struct SchemaBuilder<T> {
    members: Vec<Member<T>>,
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T: 'static> SchemaBuilder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a member. The setter's value type decides the member's
    /// declared [`ValueType`].
    pub fn member<V, F>(&mut self, name: impl Into<String>, setter: F) -> &mut Member<T>
    where
        V: Bindable,
        F: Fn(&mut T, V) + 'static,
    {
        self.members.push(Member::new(name, setter));
        let last = self.members.len() - 1;
        &mut self.members[last]
    }

    /// Declared members, in declaration order.
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }
}

/// One bindable member of a schema.
pub struct Member<T> {
    name: String,
    value_type: ValueType,
    accepts: fn(OptionCategory) -> bool,
    setter: MemberSetter<T>,
    option: Option<OptionRole>,
    argument: Option<ArgumentRole>,
}

impl<T> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("option", &self.option)
            .field("argument", &self.argument)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Member<T> {
    /// Creates an untagged member.
    pub fn new<V, F>(name: impl Into<String>, setter: F) -> Self
    where
        V: Bindable,
        F: Fn(&mut T, V) + 'static,
    {
        let setter: MemberSetter<T> = Rc::new(move |target: &mut T, raw: RawValue| {
            let value = V::coerce(raw)?;
            setter(target, value);
            Ok(())
        });

        Self {
            name: name.into(),
            value_type: V::value_type(),
            accepts: V::accepts,
            setter,
            option: None,
            argument: None,
        }
    }
}

impl<T> Member<T> {
    /// Gives the member an option role.
    pub fn option(&mut self, role: OptionRole) -> &mut Self {
        self.option = Some(role);
        self
    }

    /// Gives the member a positional argument role.
    pub fn argument(&mut self, role: ArgumentRole) -> &mut Self {
        self.argument = Some(role);
        self
    }

    /// The member identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The option role, if any.
    pub fn option_role(&self) -> Option<&OptionRole> {
        self.option.as_ref()
    }

    /// The argument role, if any.
    pub fn argument_role(&self) -> Option<&ArgumentRole> {
        self.argument.as_ref()
    }

    /// Returns `true` if the member has no role.
    pub fn is_untagged(&self) -> bool {
        self.option.is_none() && self.argument.is_none()
    }

    /// Whether the member's type can receive values of `category`.
    pub fn accepts(&self, category: OptionCategory) -> bool {
        (self.accepts)(category)
    }

    /// A shared handle to the member's setter.
    pub fn setter(&self) -> MemberSetter<T> {
        Rc::clone(&self.setter)
    }

    /// Coerces `raw` and writes it onto `target`.
    pub fn set(&self, target: &mut T, raw: RawValue) -> Result<(), CoercionError> {
        (self.setter)(target, raw)
    }
}

/// Marks a member as an option.
///
/// Without a template, names are derived from the member identifier
/// (`MaxCount` → `-m`, `--max-count`). Explicit short/long names override
/// the derived or templated ones; an empty name removes that form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRole {
    /// Template such as `-n|--name <VALUE>`.
    pub template: Option<String>,
    /// Description for help output.
    pub description: Option<String>,
    /// Explicit short name (without dash).
    pub short_name: Option<String>,
    /// Explicit long name (without dashes).
    pub long_name: Option<String>,
    /// Explicit value placeholder.
    pub value_name: Option<String>,
    /// Explicit category, bypassing the type mapper.
    pub option_type: Option<OptionCategory>,
    /// Whether nested commands inherit the option.
    pub inherited: bool,
    /// Whether help output lists the option.
    pub show_in_help: bool,
    /// Whether validation requires the option.
    pub required: bool,
}

impl Default for OptionRole {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionRole {
    /// Creates an option role with derived names.
    pub fn new() -> Self {
        Self {
            template: None,
            description: None,
            short_name: None,
            long_name: None,
            value_name: None,
            option_type: None,
            inherited: false,
            show_in_help: true,
            required: false,
        }
    }

    /// Uses a template instead of derived names.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Adds a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the short name.
    pub fn short_name(mut self, short: impl Into<String>) -> Self {
        self.short_name = Some(short.into());
        self
    }

    /// Overrides the long name.
    pub fn long_name(mut self, long: impl Into<String>) -> Self {
        self.long_name = Some(long.into());
        self
    }

    /// Overrides the value placeholder.
    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Sets the category explicitly.
    pub fn option_type(mut self, category: OptionCategory) -> Self {
        self.option_type = Some(category);
        self
    }

    /// Marks the option as inherited by nested commands.
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
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
}

/// Marks a member as a positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentRole {
    /// Positional rank; must be unique within a schema.
    pub order: i32,
    /// Name for help and messages; derived from the member when absent.
    pub name: Option<String>,
    /// Description for help output.
    pub description: Option<String>,
    /// Whether the argument absorbs every remaining value.
    pub multiple_values: bool,
    /// Whether help output lists the argument.
    pub show_in_help: bool,
    /// Whether validation requires a value.
    pub required: bool,
}

impl ArgumentRole {
    /// Creates an argument role at the given rank.
    pub fn new(order: i32) -> Self {
        Self {
            order,
            name: None,
            description: None,
            multiple_values: false,
            show_in_help: true,
            required: false,
        }
    }

    /// Sets the argument name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the argument as accepting multiple values.
    pub fn multiple_values(mut self) -> Self {
        self.multiple_values = true;
        self
    }

    /// Hides the argument from help output.
    pub fn hidden(mut self) -> Self {
        self.show_in_help = false;
        self
    }

    /// Marks the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
