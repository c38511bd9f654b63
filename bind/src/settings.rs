//! Application-level settings.
//!
//! Settings describe the application as a whole rather than any member:
//! how it reacts to unexpected tokens, which option requests help, and the
//! exit code used for failures.
//!
//! # Example YAML
//!
//! ```yaml
//! name: hello
//! description: Greets somebody
//! throw_on_unexpected_argument: false
//! help_option: "-h|--help"
//! error_exit_code: 2
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Default help option template.
pub const DEFAULT_HELP_OPTION: &str = "-?|-h|--help";

/// Settings applied to the parsing model before members are introspected.
///
/// # Examples
///
/// ```
/// use command_bind::AppSettings;
///
/// let settings = AppSettings::from_yaml_str("throw_on_unexpected_argument: false").unwrap();
/// assert!(!settings.throw_on_unexpected_argument);
/// assert_eq!(settings.help_option.as_deref(), Some("-?|-h|--help"));
/// assert_eq!(settings.error_exit_code, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Application name.
    pub name: Option<String>,
    /// Application description.
    pub description: Option<String>,
    /// Fail on tokens nothing accepts; when `false` they are kept as
    /// remaining arguments.
    pub throw_on_unexpected_argument: bool,
    /// Template of the help option; `None` disables help detection.
    pub help_option: Option<String>,
    /// Exit code reported for failed executions.
    pub error_exit_code: i32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            throw_on_unexpected_argument: true,
            help_option: Some(DEFAULT_HELP_OPTION.to_string()),
            error_exit_code: 1,
        }
    }
}

impl AppSettings {
    /// Sets the application name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the application description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Keeps unexpected tokens as remaining arguments instead of failing.
    pub fn allow_unexpected_arguments(mut self) -> Self {
        self.throw_on_unexpected_argument = false;
        self
    }

    /// Replaces the help option template; `None` disables it.
    pub fn with_help_option(mut self, template: Option<&str>) -> Self {
        self.help_option = template.map(String::from);
        self
    }

    /// Parses settings from YAML; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert!(settings.throw_on_unexpected_argument);
        assert_eq!(settings.help_option.as_deref(), Some(DEFAULT_HELP_OPTION));
        assert_eq!(settings.error_exit_code, 1);
    }

    #[test]
    fn test_null_help_option_disables_help() {
        let settings = AppSettings::from_yaml_str("help_option: null\nname: tool").unwrap();
        assert_eq!(settings.help_option, None);
        assert_eq!(settings.name.as_deref(), Some("tool"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name: hello\nerror_exit_code: 2").unwrap();

        let settings = AppSettings::load(file.path()).unwrap();
        assert_eq!(settings.name.as_deref(), Some("hello"));
        assert_eq!(settings.error_exit_code, 2);
        assert!(settings.throw_on_unexpected_argument);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppSettings::load("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_rejects_wrong_type() {
        let err = AppSettings::from_yaml_str("error_exit_code: many").unwrap_err();
        assert!(matches!(err, SettingsError::Yaml(_)));
    }
}
