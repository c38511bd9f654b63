//! Mapping from declared value types to option categories.
//!
//! A process-wide default mapper is initialized with the built-in mappings
//! and can be extended once at startup with [`TypeMapper::register_global`].
//! A build can also carry its own mapper instance instead of the global one.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::types::{OptionCategory, ValueType};

static GLOBAL: OnceLock<RwLock<TypeMapper>> = OnceLock::new();

fn global() -> &'static RwLock<TypeMapper> {
    GLOBAL.get_or_init(|| RwLock::new(TypeMapper::default()))
}

/// Resolves a [`ValueType`] to an [`OptionCategory`].
///
/// # Examples
///
/// ```
/// use command_bind_core::{OptionCategory, TypeMapper, ValueType};
///
/// let mut mapper = TypeMapper::default();
/// assert_eq!(mapper.resolve(&ValueType::Bool), Some(OptionCategory::Flag));
/// assert_eq!(mapper.resolve(&ValueType::named("Level")), None);
///
/// mapper.register(ValueType::named("Level"), OptionCategory::SingleValue);
/// assert_eq!(mapper.resolve(&ValueType::named("Level")), Some(OptionCategory::SingleValue));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapper {
    mappings: HashMap<ValueType, OptionCategory>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        let mappings = HashMap::from([
            (ValueType::Bool, OptionCategory::Flag),
            (ValueType::String, OptionCategory::SingleValue),
            (ValueType::StringList, OptionCategory::MultiValue),
            (ValueType::Integer, OptionCategory::SingleValue),
            (ValueType::Unsigned, OptionCategory::SingleValue),
            (ValueType::Float, OptionCategory::SingleValue),
        ]);
        Self { mappings }
    }
}

impl TypeMapper {
    /// Creates a mapper with no mappings at all.
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Adds or replaces a mapping.
    pub fn register(&mut self, value_type: ValueType, category: OptionCategory) -> &mut Self {
        self.mappings.insert(value_type, category);
        self
    }

    /// Looks up the category for a type.
    pub fn resolve(&self, value_type: &ValueType) -> Option<OptionCategory> {
        self.mappings.get(value_type).copied()
    }

    /// Returns a copy of the process-wide mapper.
    pub fn global() -> Self {
        match global().read() {
            Ok(mapper) => mapper.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Adds a mapping to the process-wide mapper.
    ///
    /// Intended to run once at startup, before any build uses the global
    /// mapper.
    pub fn register_global(value_type: ValueType, category: OptionCategory) {
        let mut mapper = match global().write() {
            Ok(mapper) => mapper,
            Err(poisoned) => poisoned.into_inner(),
        };
        mapper.register(value_type, category);
    }
}
