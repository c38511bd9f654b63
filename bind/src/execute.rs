//! Building a schema into a runnable app and driving its lifecycle.
//!
//! Every run walks the same states:
//!
//! ```text
//! Created -> TargetInitialized -> ArgsParsed -> Validated -> Executed
//!                    \                 \             \
//!                     +-----------------+-------------+--> Failed | HelpRequested
//! ```
//!
//! `Failed` and `HelpRequested` are terminal and skip whatever is left.

use command_bind_core::{
    BuildError, CommandModel, OptionCategory, OptionDescriptor, ParseOutcome, ParseResult,
    TypeMapper, ValidationOutcome,
};
use tracing::{debug, info};

use crate::binder::Binder;
use crate::context::{
    BuildContext, ExecutionContext, ParsingCompleteAction, TargetInitializedAction,
};
use crate::convention::Convention;
use crate::error::{Error, Failure};
use crate::introspect::Introspector;
use crate::schema::{Schema, SchemaBuilder};
use crate::settings::AppSettings;

/// Where a run stands, or where it ended.
#[derive(Debug)]
pub enum LifecycleState {
    /// The model is built; no instance exists yet.
    Created,
    /// A fresh instance exists and target-initialized callbacks ran.
    TargetInitialized,
    /// Tokens were parsed and written onto the instance.
    ArgsParsed,
    /// Parsing-complete callbacks ran and validation passed.
    Validated,
    /// The schema's execute hook ran.
    Executed,
    /// The run stopped early.
    Failed(Failure),
    /// The help option was given.
    HelpRequested,
}

impl LifecycleState {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Created => "Created",
            LifecycleState::TargetInitialized => "TargetInitialized",
            LifecycleState::ArgsParsed => "ArgsParsed",
            LifecycleState::Validated => "Validated",
            LifecycleState::Executed => "Executed",
            LifecycleState::Failed(_) => "Failed",
            LifecycleState::HelpRequested => "HelpRequested",
        }
    }

    /// Returns `true` for states a run ends in.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Executed | LifecycleState::Failed(_) | LifecycleState::HelpRequested
        )
    }
}

/// Outcome of [`BoundApp::execute`].
#[derive(Debug)]
pub struct ExecutionResult<T> {
    /// Process exit code.
    pub exit_code: i32,
    /// The bound instance; only present when the run reached `Executed`.
    pub instance: Option<T>,
    /// The terminal state.
    pub state: LifecycleState,
}

impl<T> ExecutionResult<T> {
    /// Returns `true` if the run reached `Executed`.
    pub fn is_success(&self) -> bool {
        matches!(self.state, LifecycleState::Executed)
    }

    /// The failure reason, if the run failed.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            LifecycleState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Configures and builds a [`BoundApp`] for a schema.
///
/// # Examples
///
/// ```
/// use command_bind::{AppBuilder, AppSettings, OptionRole, Schema, SchemaBuilder};
///
/// #[derive(Default)]
/// struct Tool {
///     verbose: bool,
/// }
///
/// impl Schema for Tool {
///     fn declare(schema: &mut SchemaBuilder<Self>) {
///         schema
///             .member("Verbose", |t: &mut Self, v: bool| t.verbose = v)
///             .option(OptionRole::new());
///     }
/// }
///
/// let mut app = AppBuilder::<Tool>::new()
///     .with_settings(AppSettings::default().with_name("tool"))
///     .build()
///     .unwrap();
/// assert!(app.model().find_long("verbose").is_some());
///
/// let result = app.execute(["--verbose"]);
/// assert_eq!(result.exit_code, 0);
/// assert!(result.instance.unwrap().verbose);
/// ```
pub struct AppBuilder<T: Schema> {
    mapper: Option<TypeMapper>,
    settings: AppSettings,
    conventions: Vec<Box<dyn Convention<T>>>,
}

impl<T: Schema> Default for AppBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Schema> AppBuilder<T> {
    /// Starts from the schema's own settings and conventions.
    pub fn new() -> Self {
        Self {
            mapper: None,
            settings: T::settings(),
            conventions: T::conventions(),
        }
    }

    /// Uses `mapper` instead of the process-wide default.
    pub fn with_type_mapper(mut self, mapper: TypeMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Replaces the schema's settings.
    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Appends a convention after the schema's own.
    pub fn with_convention(mut self, convention: impl Convention<T> + 'static) -> Self {
        self.conventions.push(Box::new(convention));
        self
    }

    /// Introspects the schema, applies conventions, and returns the app.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the schema is misconfigured. Nothing is
    /// parsed in that case.
    pub fn build(self) -> Result<BoundApp<T>, BuildError> {
        let mut schema = SchemaBuilder::new();
        T::declare(&mut schema);

        let mut model = CommandModel::new();
        model.name = self.settings.name.clone();
        model.description = self.settings.description.clone();
        model.throw_on_unexpected_argument = self.settings.throw_on_unexpected_argument;

        if let Some(template) = self.settings.help_option.as_deref() {
            let help = OptionDescriptor::from_template(template, OptionCategory::Flag)?
                .with_description("Show help information");
            model.add_help_option(help)?;
        }

        let mapper = self.mapper.unwrap_or_else(TypeMapper::global);
        let mut context = BuildContext::new(schema.members(), model);
        Introspector::new(&mapper).run(&mut context)?;

        for (index, convention) in self.conventions.iter().enumerate() {
            debug!(index, "Applying convention");
            convention.apply(&mut context)?;
        }

        let target_type = context.target_type();
        let parts = context.into_parts();
        info!(
            target_type,
            options = parts.model.option_count(),
            arguments = parts.model.argument_count(),
            write_backs = parts.binder.len(),
            conventions = self.conventions.len(),
            "Built command model"
        );

        Ok(BoundApp {
            model: parts.model,
            binder: parts.binder,
            initialized: parts.initialized,
            parsing_complete: parts.parsing_complete,
            settings: self.settings,
        })
    }
}

enum Halt {
    Help,
    Failed(Failure),
}

/// A built schema, ready to run against token sequences.
///
/// The model and registered actions are reused across runs; every run
/// starts from a fresh `T::default()`.
pub struct BoundApp<T> {
    model: CommandModel,
    binder: Binder<T>,
    initialized: Vec<TargetInitializedAction<T>>,
    parsing_complete: Vec<ParsingCompleteAction<T>>,
    settings: AppSettings,
}

impl<T: Schema> BoundApp<T> {
    /// The parsing model.
    pub fn model(&self) -> &CommandModel {
        &self.model
    }

    /// The settings the app was built with.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Runs the full lifecycle and invokes the schema's execute hook.
    pub fn execute<I, S>(&mut self, tokens: I) -> ExecutionResult<T>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = collect_tokens(tokens);
        let error_exit_code = self.settings.error_exit_code;

        match self.run_to_validated(&tokens) {
            Ok((mut target, result)) => {
                let context = ExecutionContext::new(&tokens, &self.model, &result);
                let exit_code = target.on_execute(&context).unwrap_or(0);
                let state = LifecycleState::Executed;
                info!(state = state.name(), exit_code, "Execution finished");
                ExecutionResult {
                    exit_code,
                    instance: Some(target),
                    state,
                }
            }
            Err(Halt::Help) => {
                let state = LifecycleState::HelpRequested;
                info!(state = state.name(), "Help requested");
                ExecutionResult {
                    exit_code: 0,
                    instance: None,
                    state,
                }
            }
            Err(Halt::Failed(failure)) => {
                info!(reason = %failure, exit_code = error_exit_code, "Execution failed");
                ExecutionResult {
                    exit_code: error_exit_code,
                    instance: None,
                    state: LifecycleState::Failed(failure),
                }
            }
        }
    }

    /// Runs the lifecycle up to `Validated` and returns the bound instance
    /// without invoking the execute hook.
    pub fn parse<I, S>(&mut self, tokens: I) -> Result<T, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = collect_tokens(tokens);
        match self.run_to_validated(&tokens) {
            Ok((target, _)) => Ok(target),
            Err(Halt::Help) => Err(Error::HelpRequested),
            Err(Halt::Failed(failure)) => Err(Error::Failed(failure)),
        }
    }

    fn run_to_validated(&mut self, tokens: &[String]) -> Result<(T, ParseResult), Halt> {
        enter(&LifecycleState::Created);
        let mut target = T::default();
        for action in &mut self.initialized {
            action(&mut target).map_err(|e| Halt::Failed(Failure::Initialization(e)))?;
        }
        enter(&LifecycleState::TargetInitialized);

        let result = match self.model.parse(tokens) {
            ParseOutcome::Parsed(result) => result,
            ParseOutcome::HelpRequested => return Err(Halt::Help),
            ParseOutcome::Error(e) => return Err(Halt::Failed(e.into())),
        };
        self.binder
            .bind(&mut target, &result)
            .map_err(Halt::Failed)?;
        enter(&LifecycleState::ArgsParsed);

        let context = ExecutionContext::new(tokens, &self.model, &result);
        for action in &mut self.parsing_complete {
            action(&mut target, &context).map_err(|e| Halt::Failed(Failure::Initialization(e)))?;
        }

        let mut violations = match self.model.validate(&result) {
            ValidationOutcome::Valid => Vec::new(),
            ValidationOutcome::Invalid(violations) => violations,
        };
        violations.extend(target.validate());
        if !violations.is_empty() {
            return Err(Halt::Failed(Failure::Validation(violations)));
        }
        enter(&LifecycleState::Validated);

        Ok((target, result))
    }
}

fn enter(state: &LifecycleState) {
    debug!(state = state.name(), "Lifecycle transition");
}

fn collect_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect()
}

/// Builds `T` with its own settings and conventions and runs it.
///
/// # Errors
///
/// Only structural problems are errors here; everything that goes wrong
/// during the run is reported through the returned [`ExecutionResult`].
pub fn execute<T, I, S>(tokens: I) -> Result<ExecutionResult<T>, BuildError>
where
    T: Schema,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut app = AppBuilder::<T>::new().build()?;
    Ok(app.execute(tokens))
}

/// Builds `T` and binds `tokens` onto a fresh instance.
pub fn parse_args<T, I, S>(tokens: I) -> Result<T, Error>
where
    T: Schema,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut app = AppBuilder::<T>::new().build()?;
    app.parse(tokens)
}
