use command_bind::{
    AppBuilder, AppSettings, CommandModel, ExecutionContext, LifecycleState,
    OptionRole, Schema, SchemaBuilder,
};

/// Greets a subject a number of times.
#[derive(Debug, Default)]
struct HelloWorld {
    subject: Option<String>,
    count: i32,
    show_model: bool,
}

impl Schema for HelloWorld {
    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .member("Subject", |h: &mut Self, v: Option<String>| h.subject = v)
            .option(OptionRole::new().description("The subject"));
        schema
            .member("Count", |h: &mut Self, v: i32| h.count = v)
            .option(
                OptionRole::new()
                    .short_name("n")
                    .value_name("N")
                    .description("How many times to greet"),
            );
        schema
            .member("ShowModel", |h: &mut Self, v: bool| h.show_model = v)
            .option(
                OptionRole::new()
                    .short_name("")
                    .description("Print the parsing model as JSON and exit")
                    .hidden(),
            );
    }

    fn settings() -> AppSettings {
        AppSettings::default()
            .with_name("hello")
            .with_description("Says hello")
    }

    fn on_execute(&mut self, context: &ExecutionContext<'_>) -> Option<i32> {
        if self.show_model {
            return match serde_json::to_string_pretty(context.model()) {
                Ok(json) => {
                    println!("{json}");
                    None
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    Some(1)
                }
            };
        }

        let subject = self.subject.as_deref().unwrap_or("world");
        for _ in 0..self.count {
            println!("Hello {subject}!");
        }
        None
    }
}

fn main() {
    let mut app = match AppBuilder::<HelloWorld>::new().build() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let result = app.execute(std::env::args().skip(1));
    match &result.state {
        LifecycleState::HelpRequested => print_help(app.model()),
        LifecycleState::Failed(failure) => eprintln!("error: {failure}"),
        _ => {}
    }

    std::process::exit(result.exit_code);
}

fn print_help(model: &CommandModel) {
    let name = model.name.as_deref().unwrap_or("hello");
    if let Some(description) = &model.description {
        println!("{description}\n");
    }

    let mut usage = format!("Usage: {name} [OPTIONS]");
    for (_, argument) in model.arguments().filter(|(_, a)| a.show_in_help) {
        usage.push_str(&format!(" [{}]", argument.name));
    }
    println!("{usage}\n");

    println!("Options:");
    for (_, option) in model.options().filter(|(_, o)| o.show_in_help) {
        let mut names: Vec<String> = option.short_forms().map(|c| format!("-{c}")).collect();
        if let Some(long) = &option.long_name {
            names.push(format!("--{long}"));
        }
        let mut label = names.join(", ");
        if let Some(value) = option.value_name.as_deref().filter(|_| option.category.takes_value()) {
            label.push_str(&format!(" <{value}>"));
        }
        println!("  {label:<24} {}", option.description.as_deref().unwrap_or(""));
    }
}
