//! Schema introspection: turns declared members into model entries and
//! write-backs.
//!
//! Introspection runs in two phases. The first classifies every member and
//! builds its descriptor without touching the context, so any structural
//! error aborts the build before a single write-back exists. The second
//! inserts options in declaration order and arguments by ascending order,
//! then registers one write-back per member in declaration order.

use std::collections::BTreeMap;

use command_bind_core::{
    ArgumentDescriptor, ArgumentHandle, BuildError, OptionCategory, OptionDescriptor,
    OptionHandle, TypeMapper, derive_names,
};
use tracing::debug;

use crate::context::{BuildContext, unsupported};
use crate::schema::{ArgumentRole, Member, OptionRole};

/// Builds the initial model from a schema's declared members.
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'m> {
    mapper: &'m TypeMapper,
}

impl<'m> Introspector<'m> {
    /// Creates an introspector resolving option types with `mapper`.
    pub fn new(mapper: &'m TypeMapper) -> Self {
        Self { mapper }
    }

    /// Populates `context` from its members.
    ///
    /// # Errors
    ///
    /// Any [`BuildError`] found in a member declaration; nothing is
    /// registered when a member is malformed.
    pub fn run<T>(&self, context: &mut BuildContext<'_, T>) -> Result<(), BuildError> {
        let mut options: Vec<(usize, &Member<T>, DerivedOption)> = Vec::new();
        let mut arguments: BTreeMap<i32, (usize, &Member<T>, ArgumentDescriptor)> = BTreeMap::new();

        for (index, member) in context.members().iter().enumerate() {
            match (member.option_role(), member.argument_role()) {
                (None, None) => {
                    debug!(member = member.name(), "Skipping untagged member");
                }
                (Some(_), Some(_)) => {
                    return Err(BuildError::DuplicateRole {
                        member: member.name().to_string(),
                    });
                }
                (None, Some(role)) => {
                    let descriptor = argument_descriptor(member, role)?;
                    if let Some((_, existing, _)) = arguments.get(&role.order) {
                        return Err(BuildError::DuplicateOrder {
                            order: role.order,
                            first: existing.name().to_string(),
                            second: member.name().to_string(),
                        });
                    }
                    arguments.insert(role.order, (index, member, descriptor));
                }
                (Some(role), None) => {
                    let option = self.option_descriptor(member, role)?;
                    options.push((index, member, option));
                }
            }
        }

        let last_order = arguments.keys().next_back().copied();
        for (order, (_, _, descriptor)) in &arguments {
            if descriptor.multiple_values && Some(*order) != last_order {
                return Err(BuildError::TrailingMultiValueArgument {
                    name: descriptor.name.clone(),
                });
            }
        }

        let mut slots: Vec<(usize, &Member<T>, Slot)> =
            Vec::with_capacity(options.len() + arguments.len());

        for (index, member, option) in options {
            let mut descriptor = option.descriptor;
            if option.derived_short {
                yield_short_to_help(context, member, &mut descriptor);
            }
            debug!(
                member = member.name(),
                option = %descriptor.display_name(),
                category = %descriptor.category,
                "Added option"
            );
            let handle = context.add_option(descriptor)?;
            slots.push((index, member, Slot::Option(handle)));
        }

        for (index, member, descriptor) in arguments.into_values() {
            debug!(
                member = member.name(),
                argument = %descriptor.name,
                order = descriptor.order,
                "Added argument"
            );
            let handle = context.add_argument(descriptor)?;
            slots.push((index, member, Slot::Argument(handle)));
        }

        // Write-backs run in member declaration order.
        slots.sort_by_key(|(index, _, _)| *index);
        for (_, member, slot) in slots {
            match slot {
                Slot::Option(handle) => context.bind_option(member, handle)?,
                Slot::Argument(handle) => context.bind_argument(member, handle)?,
            }
        }

        Ok(())
    }

    fn option_descriptor<T>(
        &self,
        member: &Member<T>,
        role: &OptionRole,
    ) -> Result<DerivedOption, BuildError> {
        if member.name().is_empty() {
            return Err(BuildError::EmptyMemberName);
        }

        let category = match role.option_type {
            Some(category) => category,
            None => self.mapper.resolve(member.value_type()).ok_or_else(|| {
                BuildError::UnresolvedOptionType {
                    member: member.name().to_string(),
                    value_type: member.value_type().clone(),
                }
            })?,
        };
        if !member.accepts(category) {
            return Err(unsupported(member, category));
        }

        let mut descriptor = match &role.template {
            Some(template) => OptionDescriptor::from_template(template, category)?,
            None => {
                let names = derive_names(member.name()).ok_or_else(|| missing_name(member))?;
                let mut descriptor = OptionDescriptor::new(category)
                    .with_short(names.short)
                    .with_long(names.long);
                if category.takes_value() {
                    descriptor.value_name = Some(member.name().to_string());
                }
                descriptor
            }
        };
        let derived_short = role.template.is_none() && role.short_name.is_none();

        if let Some(short) = &role.short_name {
            descriptor.short_name = parse_short_name(short)?;
        }
        if let Some(long) = &role.long_name {
            descriptor.long_name = (!long.is_empty()).then(|| long.clone());
        }
        if let Some(value_name) = &role.value_name {
            descriptor.value_name = Some(value_name.clone());
        }
        if descriptor.short_forms().next().is_none() && descriptor.long_name.is_none() {
            return Err(missing_name(member));
        }

        descriptor.description = role.description.clone();
        descriptor.show_in_help = role.show_in_help;
        descriptor.inherited = role.inherited;
        descriptor.required = role.required;

        Ok(DerivedOption {
            descriptor,
            derived_short,
        })
    }
}

struct DerivedOption {
    descriptor: OptionDescriptor,
    /// The short name came from the identifier, not from the role.
    derived_short: bool,
}

enum Slot {
    Option(OptionHandle),
    Argument(ArgumentHandle),
}

/// Drops a derived short name the help option already claims (`Host` would
/// otherwise collide with `-h`). The long name still identifies the option.
fn yield_short_to_help<T>(
    context: &BuildContext<'_, T>,
    member: &Member<T>,
    descriptor: &mut OptionDescriptor,
) {
    let model = context.model();
    let Some(help) = model.help_option() else {
        return;
    };
    if let Some(short) = descriptor.short_name {
        if model.find_short(short) == Some(help) && descriptor.long_name.is_some() {
            debug!(member = member.name(), short = %short, "Derived short name taken by help");
            descriptor.short_name = None;
        }
    }
}

fn argument_descriptor<T>(
    member: &Member<T>,
    role: &ArgumentRole,
) -> Result<ArgumentDescriptor, BuildError> {
    if member.name().is_empty() {
        return Err(BuildError::EmptyMemberName);
    }

    let category = if role.multiple_values {
        OptionCategory::MultiValue
    } else {
        OptionCategory::SingleValue
    };
    if !member.accepts(category) {
        return Err(unsupported(member, category));
    }

    let name = match &role.name {
        Some(name) => name.clone(),
        None => derive_names(member.name())
            .map(|n| n.long)
            .unwrap_or_else(|| member.name().to_string()),
    };

    Ok(ArgumentDescriptor {
        name,
        description: role.description.clone(),
        order: role.order,
        multiple_values: role.multiple_values,
        show_in_help: role.show_in_help,
        required: role.required,
    })
}

fn parse_short_name(short: &str) -> Result<Option<char>, BuildError> {
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(BuildError::InvalidOptionName {
            name: format!("-{short}"),
        }),
    }
}

fn missing_name<T>(member: &Member<T>) -> BuildError {
    BuildError::MissingOptionName {
        member: member.name().to_string(),
    }
}
