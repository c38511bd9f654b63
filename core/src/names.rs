//! Default option names derived from member identifiers.

/// Short and long option names derived from an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    /// Lowercase first character.
    pub short: char,
    /// Kebab-case identifier.
    pub long: String,
}

/// Derives `(short, long)` option names from a member identifier.
///
/// Every uppercase character after the first starts a new `-`-separated
/// word and is lowercased. Underscores act as separators too, so Rust field
/// names derive the same names as their PascalCase spelling. Returns `None`
/// if the identifier contains no alphanumeric character.
///
/// # Examples
///
/// ```
/// use command_bind_core::derive_names;
///
/// let names = derive_names("MaxRetryCount").unwrap();
/// assert_eq!(names.short, 'm');
/// assert_eq!(names.long, "max-retry-count");
///
/// assert_eq!(derive_names("max_retry_count").unwrap().long, "max-retry-count");
/// assert!(derive_names("__").is_none());
/// ```
pub fn derive_names(identifier: &str) -> Option<DerivedNames> {
    let trimmed = identifier.trim_matches('_');
    let short = trimmed
        .chars()
        .find(|c| c.is_alphanumeric())?
        .to_lowercase()
        .next()?;

    let mut long = String::with_capacity(trimmed.len() + 4);
    let mut pending_separator = false;
    for (i, ch) in trimmed.chars().enumerate() {
        if ch == '_' {
            pending_separator = true;
            continue;
        }
        if (pending_separator || (i > 0 && ch.is_uppercase())) && !long.ends_with('-') {
            long.push('-');
        }
        pending_separator = false;
        long.extend(ch.to_lowercase());
    }

    Some(DerivedNames { short, long })
}
