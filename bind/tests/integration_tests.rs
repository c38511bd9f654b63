use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use command_bind::{
    AppBuilder, AppSettings, ArgumentRole, Bindable, BuildContext, BuildError, CoercionError,
    Convention, Error, ExecutionContext, Failure, FieldPatternConvention, LifecycleState,
    OptionCategory, OptionRole, ParseError, RawValue, RemainingArgumentsConvention, Schema,
    SchemaBuilder, TypeMapper, ValueType, Violation,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Greeter {
    count: i32,
    subject: String,
    verbose: bool,
}

impl Schema for Greeter {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Count", |g: &mut Self, v: i32| g.count = v)
            .option(OptionRole::new().short_name("n"));
        schema
            .member("Subject", |g: &mut Self, v: String| g.subject = v)
            .option(OptionRole::new().description("The subject"));
        schema
            .member("Verbose", |g: &mut Self, v: bool| g.verbose = v)
            .option(OptionRole::new());
    }
}

#[derive(Debug, Default)]
struct CopyFiles {
    force: bool,
    source: String,
    targets: Vec<String>,
}

impl Schema for CopyFiles {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Targets", |c: &mut Self, v: Vec<String>| c.targets = v)
            .argument(ArgumentRole::new(1).multiple_values());
        schema
            .member("Source", |c: &mut Self, v: String| c.source = v)
            .argument(ArgumentRole::new(0).required());
        schema
            .member("Force", |c: &mut Self, v: bool| c.force = v)
            .option(OptionRole::new());
    }
}

fn run<T: Schema>(tokens: &[&str]) -> command_bind::ExecutionResult<T> {
    command_bind::execute::<T, _, _>(tokens).unwrap()
}

// ---------------------------------------------------------------------------
// Option binding
// ---------------------------------------------------------------------------

#[test]
fn test_options_bind_onto_instance() {
    let result = run::<Greeter>(&["--count", "3", "--subject", "world"]);

    assert_eq!(result.exit_code, 0);
    let greeter = result.instance.unwrap();
    assert_eq!(greeter.count, 3);
    assert_eq!(greeter.subject, "world");
    assert!(!greeter.verbose);
}

#[test]
fn test_absent_option_keeps_default() {
    let greeter = run::<Greeter>(&["--subject", "world"]).instance.unwrap();
    assert_eq!(greeter.count, 0);
}

#[test]
fn test_flag_reflects_presence() {
    assert!(!run::<Greeter>(&[]).instance.unwrap().verbose);
    assert!(run::<Greeter>(&["--verbose"]).instance.unwrap().verbose);
    assert!(run::<Greeter>(&["-v"]).instance.unwrap().verbose);
}

#[test]
fn test_short_and_inline_forms() {
    let greeter = run::<Greeter>(&["-n=4", "--subject=moon"]).instance.unwrap();
    assert_eq!(greeter.count, 4);
    assert_eq!(greeter.subject, "moon");

    let greeter = run::<Greeter>(&["-n5", "-s:sun"]).instance.unwrap();
    assert_eq!(greeter.count, 5);
    assert_eq!(greeter.subject, "sun");
}

#[test]
fn test_invalid_number_fails_without_instance() {
    let result = run::<Greeter>(&["--count", "abc"]);

    assert_eq!(result.exit_code, 1);
    assert!(result.instance.is_none());
    match result.failure() {
        Some(Failure::InvalidValue { name, value, .. }) => {
            assert_eq!(name, "--count");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn test_unexpected_argument_fails() {
    let result = run::<Greeter>(&["--colour", "red"]);

    assert!(matches!(
        result.failure(),
        Some(Failure::Parse(ParseError::UnexpectedArgument { token })) if token == "--colour"
    ));
}

#[test]
fn test_repeated_single_value_fails() {
    let result = run::<Greeter>(&["-n", "1", "-n", "2"]);
    assert!(matches!(
        result.failure(),
        Some(Failure::Parse(ParseError::TooManyValues { .. }))
    ));
}

// ---------------------------------------------------------------------------
// Positional arguments
// ---------------------------------------------------------------------------

#[test]
fn test_arguments_follow_declared_order() {
    let copy = run::<CopyFiles>(&["a.txt", "b/", "c/", "--force"]).instance.unwrap();

    assert!(copy.force);
    assert_eq!(copy.source, "a.txt");
    assert_eq!(copy.targets, ["b/", "c/"]);
}

#[derive(Debug, Default)]
struct Traced {
    trace: Vec<String>,
}

impl Schema for Traced {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Source", |t: &mut Self, v: String| {
                t.trace.push(format!("source={v}"))
            })
            .argument(ArgumentRole::new(0));
        schema
            .member("Verbose", |t: &mut Self, v: bool| {
                t.trace.push(format!("verbose={v}"))
            })
            .option(OptionRole::new());
    }
}

#[test]
fn test_write_backs_run_in_declaration_order() {
    let traced = run::<Traced>(&["a", "--verbose"]).instance.unwrap();
    assert_eq!(traced.trace, ["source=a", "verbose=true"]);
}

#[test]
fn test_double_dash_ends_options() {
    let copy = run::<CopyFiles>(&["--", "--force", "x"]).instance.unwrap();

    assert!(!copy.force);
    assert_eq!(copy.source, "--force");
    assert_eq!(copy.targets, ["x"]);
}

#[test]
fn test_required_argument_is_validated() {
    let result = run::<CopyFiles>(&["--force"]);

    match result.failure() {
        Some(Failure::Validation(violations)) => {
            assert_eq!(violations, &[Violation::MissingArgument("source".into())]);
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn test_help_requested() {
    for token in ["-h", "--help", "-?"] {
        let result = run::<Greeter>(&["--count", "2", token]);
        assert_eq!(result.exit_code, 0);
        assert!(matches!(result.state, LifecycleState::HelpRequested));
        assert!(result.instance.is_none());
    }
}

#[test]
fn test_help_can_be_disabled() {
    let mut app = AppBuilder::<Greeter>::new()
        .with_settings(AppSettings::default().with_help_option(None))
        .build()
        .unwrap();

    let result = app.execute(["--help"]);
    assert!(matches!(
        result.failure(),
        Some(Failure::Parse(ParseError::UnexpectedArgument { .. }))
    ));
}

#[test]
fn test_default_help_template_builds() {
    let app = AppBuilder::<Greeter>::new()
        .with_settings(AppSettings::default())
        .build()
        .unwrap();

    let model = app.model();
    let help = model.help_option().unwrap();
    assert_eq!(model.find_short('?'), Some(help));
    assert_eq!(model.find_short('h'), Some(help));
    assert_eq!(model.find_long("help"), Some(help));
    assert_eq!(model.option(help).unwrap().display_name(), "--help");
}

#[derive(Debug, Default)]
struct Server {
    host: String,
    hours: i32,
}

impl Schema for Server {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Host", |s: &mut Self, v: String| s.host = v)
            .option(OptionRole::new());
        schema
            .member("Hours", |s: &mut Self, v: i32| s.hours = v)
            .option(OptionRole::new());
    }
}

#[test]
fn test_derived_short_name_yields_to_help() {
    let mut app = AppBuilder::<Server>::new().build().unwrap();

    let model = app.model();
    let host = model.find_long("host").unwrap();
    assert_eq!(model.option(host).unwrap().short_name, None);
    assert_eq!(model.find_short('h'), model.help_option());

    let result = app.execute(["--host", "example.org", "--hours", "8"]);
    let server = result.instance.unwrap();
    assert_eq!(server.host, "example.org");
    assert_eq!(server.hours, 8);

    let result = app.execute(["-h"]);
    assert!(matches!(result.state, LifecycleState::HelpRequested));
}

#[derive(Debug, Default)]
struct ExplicitH {
    host: String,
}

impl Schema for ExplicitH {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Host", |s: &mut Self, v: String| s.host = v)
            .option(OptionRole::new().short_name("h"));
    }
}

#[test]
fn test_explicit_short_name_still_clashes_with_help() {
    let err = AppBuilder::<ExplicitH>::new().build().err().unwrap();
    assert_eq!(
        err,
        BuildError::DuplicateOptionName { name: "-h".into() }
    );
}

#[test]
fn test_parse_args_reports_help() {
    let err = command_bind::parse_args::<Greeter, _, _>(["-h"]).unwrap_err();
    assert!(matches!(err, Error::HelpRequested));
}

// ---------------------------------------------------------------------------
// Conventions and callbacks
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Named {
    name: String,
    verbose: bool,
}

impl Schema for Named {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema.member("_name", |n: &mut Self, v: String| n.name = v);
        schema
            .member("Verbose", |n: &mut Self, v: bool| n.verbose = v)
            .option(OptionRole::new());
    }

    fn conventions() -> Vec<Box<dyn Convention<Self>>> {
        vec![Box::new(FieldPatternConvention::underscore_prefixed())]
    }
}

#[test]
fn test_field_pattern_convention_binds_in_same_pass() {
    let named = run::<Named>(&["--verbose", "--name", "my value"])
        .instance
        .unwrap();

    assert_eq!(named.name, "my value");
    assert!(named.verbose);
}

#[test]
fn test_field_pattern_convention_leaves_default_when_absent() {
    let named = run::<Named>(&[]).instance.unwrap();
    assert_eq!(named.name, "");
}

#[derive(Debug)]
struct Preset {
    count: i32,
}

impl Default for Preset {
    fn default() -> Self {
        Self { count: 42 }
    }
}

impl Schema for Preset {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Count", |p: &mut Self, v: i32| p.count = v)
            .option(OptionRole::new());
    }
}

#[test]
fn test_target_initialized_sees_defaults() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);

    let mut app = AppBuilder::<Preset>::new()
        .with_convention(
            move |context: &mut BuildContext<'_, Preset>| -> Result<(), BuildError> {
                let initialized = Rc::clone(&log);
                context.on_target_initialized(move |p: &mut Preset| {
                    initialized.borrow_mut().push(("initialized", p.count));
                    Ok(())
                });
                let complete = Rc::clone(&log);
                context.on_parsing_complete(move |p: &mut Preset, _: &ExecutionContext<'_>| {
                    complete.borrow_mut().push(("complete", p.count));
                    Ok(())
                });
                Ok(())
            },
        )
        .build()
        .unwrap();

    let result = app.execute(["--count", "7"]);
    assert_eq!(result.instance.unwrap().count, 7);
    assert_eq!(*seen.borrow(), [("initialized", 42), ("complete", 7)]);
}

#[test]
fn test_initialization_failure() {
    let mut app = AppBuilder::<Preset>::new()
        .with_convention(
            |context: &mut BuildContext<'_, Preset>| -> Result<(), BuildError> {
                context.on_target_initialized(|_: &mut Preset| Err("not ready".into()));
                Ok(())
            },
        )
        .build()
        .unwrap();

    let result = app.execute(["--count", "1"]);
    assert_eq!(result.exit_code, 1);
    assert!(matches!(result.failure(), Some(Failure::Initialization(_))));
    assert_eq!(
        result.failure().unwrap().to_string(),
        "initialization failed: not ready"
    );
}

#[derive(Debug, Default)]
struct Passthrough {
    verbose: bool,
    remaining: Vec<String>,
}

impl Schema for Passthrough {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Verbose", |p: &mut Self, v: bool| p.verbose = v)
            .option(OptionRole::new());
        schema.member("RemainingArguments", |p: &mut Self, v: Vec<String>| {
            p.remaining = v
        });
    }

    fn settings() -> AppSettings {
        AppSettings::default().allow_unexpected_arguments()
    }

    fn conventions() -> Vec<Box<dyn Convention<Self>>> {
        vec![Box::new(RemainingArgumentsConvention::default())]
    }
}

#[test]
fn test_remaining_arguments_collected() {
    let passthrough = run::<Passthrough>(&["--verbose", "--unknown", "x", "-q"])
        .instance
        .unwrap();

    assert!(passthrough.verbose);
    assert_eq!(passthrough.remaining, ["--unknown", "x", "-q"]);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Deploy {
    token: Option<String>,
    replicas: u32,
}

impl Schema for Deploy {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Token", |d: &mut Self, v: Option<String>| d.token = v)
            .option(OptionRole::new().required());
        schema
            .member("Replicas", |d: &mut Self, v: u32| d.replicas = v)
            .option(OptionRole::new());
    }

    fn validate(&self) -> Vec<Violation> {
        if self.replicas > 10 {
            vec![Violation::Rule("replicas must be at most 10".into())]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn test_validation_collects_every_violation() {
    let result = run::<Deploy>(&["--replicas", "11"]);

    match result.failure() {
        Some(Failure::Validation(violations)) => {
            assert_eq!(
                violations,
                &[
                    Violation::MissingOption("--token".into()),
                    Violation::Rule("replicas must be at most 10".into()),
                ]
            );
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn test_validation_passes() {
    let deploy = run::<Deploy>(&["--token", "abc", "-r", "3"]).instance.unwrap();
    assert_eq!(deploy.token.as_deref(), Some("abc"));
    assert_eq!(deploy.replicas, 3);
}

// ---------------------------------------------------------------------------
// Structural errors
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct BothRoles {
    value: String,
}

impl Schema for BothRoles {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Value", |b: &mut Self, v: String| b.value = v)
            .option(OptionRole::new())
            .argument(ArgumentRole::new(0));
    }
}

#[test]
fn test_duplicate_role_is_build_error() {
    let err = command_bind::execute::<BothRoles, _, _>(["x"]).unwrap_err();
    assert_eq!(
        err,
        BuildError::DuplicateRole {
            member: "Value".into()
        }
    );

    let err = command_bind::parse_args::<BothRoles, _, _>(["x"]).unwrap_err();
    assert!(matches!(err, Error::Build(BuildError::DuplicateRole { .. })));
}

#[derive(Debug, Default)]
struct Clashing {
    help: bool,
}

impl Schema for Clashing {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Help", |c: &mut Self, v: bool| c.help = v)
            .option(OptionRole::new().short_name(""));
    }
}

#[test]
fn test_option_clashing_with_help_is_build_error() {
    let err = AppBuilder::<Clashing>::new().build().err().unwrap();
    assert_eq!(
        err,
        BuildError::DuplicateOptionName {
            name: "--help".into()
        }
    );

    let app = AppBuilder::<Clashing>::new()
        .with_settings(AppSettings::default().with_help_option(Some("-?")))
        .build()
        .unwrap();
    assert!(app.model().find_long("help").is_some());
}

// ---------------------------------------------------------------------------
// Type mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Level {
    #[default]
    Info,
    Debug,
}

impl Bindable for Level {
    fn value_type() -> ValueType {
        ValueType::named("level")
    }

    fn accepts(category: OptionCategory) -> bool {
        category == OptionCategory::SingleValue
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        match raw.into_single("info or debug")?.as_str() {
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(CoercionError::new(other, "info or debug")),
        }
    }
}

#[derive(Debug, Default)]
struct Logged {
    level: Level,
}

impl Schema for Logged {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Level", |l: &mut Self, v: Level| l.level = v)
            .option(OptionRole::new());
    }
}

#[test]
fn test_custom_type_needs_mapping() {
    let err = AppBuilder::<Logged>::new()
        .with_type_mapper(TypeMapper::default())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, BuildError::UnresolvedOptionType { .. }));

    let mut mapper = TypeMapper::default();
    mapper.register(ValueType::named("level"), OptionCategory::SingleValue);
    let mut app = AppBuilder::<Logged>::new()
        .with_type_mapper(mapper)
        .build()
        .unwrap();

    let logged = app.execute(["--level", "debug"]).instance.unwrap();
    assert_eq!(logged.level, Level::Debug);

    let result = app.execute(["--level", "trace"]);
    assert!(matches!(
        result.failure(),
        Some(Failure::InvalidValue { value, .. }) if value == "trace"
    ));
}

#[derive(Debug, Default)]
struct Tinted {
    tint: Tint,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tint(u8);

impl Bindable for Tint {
    fn value_type() -> ValueType {
        ValueType::named("tint")
    }

    fn accepts(category: OptionCategory) -> bool {
        category == OptionCategory::SingleValue
    }

    fn coerce(raw: RawValue) -> Result<Self, CoercionError> {
        raw.parse("a tint between 0 and 255").map(Tint)
    }
}

impl Schema for Tinted {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Tint", |t: &mut Self, v: Tint| t.tint = v)
            .option(OptionRole::new());
    }
}

#[test]
fn test_global_mapping_registration() {
    TypeMapper::register_global(ValueType::named("tint"), OptionCategory::SingleValue);

    let tinted = run::<Tinted>(&["--tint", "200"]).instance.unwrap();
    assert_eq!(tinted.tint, Tint(200));
}

// ---------------------------------------------------------------------------
// Model snapshots and settings
// ---------------------------------------------------------------------------

#[test]
fn test_builds_are_equivalent() {
    let first = AppBuilder::<CopyFiles>::new().build().unwrap();
    let second = AppBuilder::<CopyFiles>::new().build().unwrap();

    assert_eq!(first.model(), second.model());
    assert_eq!(
        serde_json::to_value(first.model()).unwrap(),
        serde_json::to_value(second.model()).unwrap()
    );
}

#[test]
fn test_settings_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name: greeter\nthrow_on_unexpected_argument: false\nerror_exit_code: 3"
    )
    .unwrap();
    let settings = AppSettings::load(file.path()).unwrap();

    let mut app = AppBuilder::<Greeter>::new()
        .with_settings(settings)
        .build()
        .unwrap();
    assert_eq!(app.model().name.as_deref(), Some("greeter"));

    let result = app.execute(["--unknown"]);
    assert!(result.is_success());

    let result = app.execute(["--count", "x"]);
    assert_eq!(result.exit_code, 3);
}
