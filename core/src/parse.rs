//! Token parsing against a [`CommandModel`].
//!
//! Accepted shapes: `--long`, `--long=value`, `--long value`, `-s`,
//! `-s value`, `-s=value`, `-s:value` and `-svalue`. A bare `--` ends option
//! processing; everything after it is positional. A multi-value argument
//! absorbs every remaining positional value.

use serde::Serialize;
use tracing::debug;

use crate::error::ParseError;
use crate::model::CommandModel;
use crate::types::{ArgumentHandle, OptionCategory, OptionDescriptor, OptionHandle};

/// What a parse produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// All tokens were consumed.
    Parsed(ParseResult),
    /// The help option was given; parsing stopped there.
    HelpRequested,
    /// The tokens do not fit the model.
    Error(ParseError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct OptionValues {
    occurrences: usize,
    values: Vec<String>,
}

/// Values collected for every option and argument of a model.
///
/// Lookups take the handles returned when the model was built. A handle from
/// a different model yields empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    options: Vec<OptionValues>,
    arguments: Vec<Vec<String>>,
    remaining: Vec<String>,
}

impl ParseResult {
    fn for_model(model: &CommandModel) -> Self {
        Self {
            options: vec![OptionValues::default(); model.option_count()],
            arguments: vec![Vec::new(); model.argument_count()],
            remaining: Vec::new(),
        }
    }

    /// Returns `true` if the option appeared at least once.
    pub fn has_value(&self, handle: OptionHandle) -> bool {
        self.options
            .get(handle.0)
            .is_some_and(|o| o.occurrences > 0)
    }

    /// Number of times the option appeared.
    pub fn occurrences(&self, handle: OptionHandle) -> usize {
        self.options.get(handle.0).map_or(0, |o| o.occurrences)
    }

    /// First value given to the option.
    pub fn value(&self, handle: OptionHandle) -> Option<&str> {
        self.values(handle).first().map(String::as_str)
    }

    /// Every value given to the option, in order.
    pub fn values(&self, handle: OptionHandle) -> &[String] {
        self.options
            .get(handle.0)
            .map_or(&[], |o| o.values.as_slice())
    }

    /// First value given to the argument.
    pub fn argument_value(&self, handle: ArgumentHandle) -> Option<&str> {
        self.argument_values(handle).first().map(String::as_str)
    }

    /// Every value given to the argument, in order.
    pub fn argument_values(&self, handle: ArgumentHandle) -> &[String] {
        self.arguments
            .get(handle.0)
            .map_or(&[], |a| a.as_slice())
    }

    /// Tokens that matched nothing, when the model tolerates them.
    pub fn remaining_arguments(&self) -> &[String] {
        &self.remaining
    }
}

enum Step {
    Continue,
    Help,
}

impl CommandModel {
    /// Parses a token sequence (without the program name).
    pub fn parse<I, S>(&self, tokens: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut result = ParseResult::for_model(self);

        match self.parse_into(&tokens, &mut result) {
            Ok(Step::Continue) => {
                debug!(
                    tokens = tokens.len(),
                    remaining = result.remaining.len(),
                    "Parsed tokens"
                );
                ParseOutcome::Parsed(result)
            }
            Ok(Step::Help) => ParseOutcome::HelpRequested,
            Err(e) => {
                debug!(error = %e, "Token parsing failed");
                ParseOutcome::Error(e)
            }
        }
    }

    fn parse_into(&self, tokens: &[String], result: &mut ParseResult) -> Result<Step, ParseError> {
        let mut iter = tokens.iter();
        let mut positional = 0usize;
        let mut options_done = false;

        while let Some(token) = iter.next() {
            if !options_done {
                if token == "--" {
                    options_done = true;
                    continue;
                }

                let matched = if let Some(rest) = token.strip_prefix("--") {
                    let (name, inline) = match rest.split_once('=') {
                        Some((name, value)) => (name, Some(value)),
                        None => (rest, None),
                    };
                    self.options()
                        .find(|(_, o)| o.matches_long(name))
                        .map(|(h, o)| (h, o, inline))
                } else if let Some(rest) = token.strip_prefix('-').filter(|r| !r.is_empty()) {
                    let mut chars = rest.chars();
                    let short = chars.next();
                    let attached = chars.as_str();
                    let inline = match attached.chars().next() {
                        None => None,
                        Some('=' | ':') => Some(&attached[1..]),
                        Some(_) => Some(attached),
                    };
                    short
                        .and_then(|c| self.options().find(|(_, o)| o.matches_short(c)))
                        .map(|(h, o)| (h, o, inline))
                } else {
                    None
                };

                if let Some((handle, option, inline)) = matched {
                    if Some(handle) == self.help_option() {
                        return Ok(Step::Help);
                    }
                    self.take_option(handle, option, inline, &mut iter, result)?;
                    continue;
                }

                if token.starts_with('-') && token.len() > 1 {
                    self.unexpected(token, result)?;
                    continue;
                }
            }

            if let Some((_, argument)) = self.arguments().nth(positional) {
                result.arguments[positional].push(token.clone());
                if !argument.multiple_values {
                    positional += 1;
                }
            } else {
                self.unexpected(token, result)?;
            }
        }

        Ok(Step::Continue)
    }

    fn take_option<'t>(
        &self,
        handle: OptionHandle,
        option: &OptionDescriptor,
        inline: Option<&str>,
        iter: &mut impl Iterator<Item = &'t String>,
        result: &mut ParseResult,
    ) -> Result<(), ParseError> {
        let slot = &mut result.options[handle.0];

        if option.category == OptionCategory::Flag {
            if inline.is_some() {
                return Err(ParseError::UnexpectedValue {
                    option: option.display_name(),
                });
            }
            slot.occurrences += 1;
            return Ok(());
        }

        let value = match inline {
            Some(v) => v.to_string(),
            None => iter.next().cloned().ok_or_else(|| ParseError::MissingValue {
                option: option.display_name(),
            })?,
        };

        if option.category == OptionCategory::SingleValue && slot.occurrences > 0 {
            return Err(ParseError::TooManyValues {
                option: option.display_name(),
                value,
            });
        }

        slot.occurrences += 1;
        slot.values.push(value);
        Ok(())
    }

    fn unexpected(&self, token: &str, result: &mut ParseResult) -> Result<(), ParseError> {
        if self.throw_on_unexpected_argument {
            return Err(ParseError::UnexpectedArgument {
                token: token.to_string(),
            });
        }
        result.remaining.push(token.to_string());
        Ok(())
    }
}
