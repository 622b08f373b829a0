use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use control_schema_core::{Control, EditControl, FieldPath, ObjectControl, OnChange, View};
use control_schema_loader::SchemaRegistry;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Output format for rendered views.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ViewFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "control-schema")]
#[command(about = "Run schema controls over JSON values", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the schemas found and whether each one builds.
    List(ListArgs),
    /// Print the default value of a schema.
    Default(SchemaArgs),
    /// Canonicalize a raw JSON value.
    Construct(InputArgs),
    /// Check an input value field by field.
    Validate(InputArgs),
    /// Validate, save and print the serialized value.
    Save(InputArgs),
    /// Render a value as text or as a JSON view tree.
    Render(RenderArgs),
    /// Set one field, addressed by a dotted path, and print the new value.
    Set(SetArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Schema description file or directory of description files.
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema description file or directory of description files.
    #[arg(long)]
    schema: PathBuf,
    /// Schema name, required when more than one schema is loaded.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Debug, Args)]
struct InputArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// JSON input file, or `-` for stdin.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// JSON input file, or `-` for stdin. Renders the default value if omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Render the editing view with per-field validity.
    #[arg(long)]
    edit: bool,
    #[arg(long, default_value = "text")]
    format: ViewFormat,
}

#[derive(Debug, Args)]
struct SetArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// JSON input file, or `-` for stdin. Starts from the default value if omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Dotted field path, list items by index (e.g. `address.city`, `tags.0`).
    #[arg(long)]
    path: String,
    /// New value as JSON. Text that is not valid JSON is taken as a string.
    #[arg(long)]
    value: String,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::List(args) => run_list(args),
        Command::Default(args) => run_default(args),
        Command::Construct(args) => run_construct(args),
        Command::Validate(args) => run_validate(args),
        Command::Save(args) => run_save(args),
        Command::Render(args) => run_render(args),
        Command::Set(args) => run_set(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let registry = load_registry(&args.schema)?;
    let failures = registry.check();
    for name in registry.names() {
        match failures.iter().find(|(failed, _)| failed == name) {
            Some((_, err)) => println!("{name}\terror: {err}"),
            None => println!("{name}\tok"),
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} schema(s) failed to build", failures.len()))
    }
}

fn run_default(args: SchemaArgs) -> Result<(), String> {
    let control = load_control(&args)?;
    print_json(&control.default_value())
}

fn run_construct(args: InputArgs) -> Result<(), String> {
    let control = load_control(&args.schema)?;
    let raw = read_input(&args.input)?;
    print_json(&control.construct(&raw))
}

fn run_validate(args: InputArgs) -> Result<(), String> {
    let control = load_control(&args.schema)?;
    let edited = control.edit(&control.construct(&read_input(&args.input)?));
    let editor = control.edit_object();

    let validity = editor.field_validity(&edited);
    for (field, valid) in &validity {
        println!("{}\t{field}", if *valid { "ok" } else { "invalid" });
    }

    let invalid = validity.iter().filter(|(_, valid)| !valid).count();
    if invalid == 0 {
        Ok(())
    } else {
        Err(format!("{invalid} invalid field(s)"))
    }
}

fn run_save(args: InputArgs) -> Result<(), String> {
    let control = load_control(&args.schema)?;
    let edited = control.edit(&control.construct(&read_input(&args.input)?));
    let editor = control.edit_control();
    if !editor.validate(&edited) {
        return Err("input is invalid; run `validate` for details".to_string());
    }
    print_json(&control.serialize(&editor.save(&edited)))
}

fn run_render(args: RenderArgs) -> Result<(), String> {
    let control = load_control(&args.schema)?;
    let values = match &args.input {
        Some(path) => control.construct(&read_input(path)?),
        None => control.default_value(),
    };

    let root = OnChange::root();
    let view = if args.edit {
        let editor = control.edit_control();
        let edited = control.edit(&values);
        let valid = editor.validate(&edited);
        editor.render(&edited, &root, valid)
    } else {
        control.render(&values, &root)
    };

    match args.format {
        ViewFormat::Text => print!("{}", view.render_text()),
        ViewFormat::Json => print_json(&view)?,
    }
    Ok(())
}

fn run_set(args: SetArgs) -> Result<(), String> {
    let control = load_control(&args.schema)?;
    let values = match &args.input {
        Some(path) => control.construct(&read_input(path)?),
        None => control.default_value(),
    };

    let path = FieldPath::parse(&args.path);
    if path.is_root() {
        return Err("--path must name a field".to_string());
    }
    let view = control.render(&values, &OnChange::root());
    if !resolves(&view, path.segments()) {
        return Err(format!("no field at path '{path}'"));
    }

    let new_value = serde_json::from_str(&args.value)
        .unwrap_or_else(|_| Value::String(args.value.clone()));
    print_json(&control.update(&values, path.segments(), new_value))
}

/// Whether `path` names a node of the rendered tree. A list also accepts
/// the index one past its last item.
fn resolves(view: &View, path: &[String]) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return true;
    };
    match view {
        View::Object { rows } => rows
            .iter()
            .any(|row| row.field == *head && resolves(&row.view, rest)),
        View::List { items, .. } => match head.parse::<usize>() {
            Ok(index) if index < items.len() => resolves(&items[index], rest),
            Ok(index) => index == items.len() && rest.is_empty(),
            Err(_) => false,
        },
        View::Display { .. } | View::Input { .. } => false,
    }
}

fn load_registry(path: &Path) -> Result<SchemaRegistry, String> {
    let registry = if path.is_dir() {
        SchemaRegistry::from_dir(path)
    } else {
        SchemaRegistry::from_file(path)
    };
    registry.map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn load_control(args: &SchemaArgs) -> Result<ObjectControl, String> {
    let registry = load_registry(&args.schema)?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => match registry.names().as_slice() {
            [only] => only.to_string(),
            [] => return Err(format!("no schemas in '{}'", args.schema.display())),
            names => {
                return Err(format!(
                    "several schemas loaded ({}); choose one with --name",
                    names.join(", ")
                ));
            }
        },
    };
    debug!(schema = %name, "building control");
    registry.build(&name).map_err(|err| err.to_string())
}

fn read_input(path: &Path) -> Result<Value, String> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        text
    } else {
        fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?
    };
    serde_json::from_str(&text).map_err(|err| format!("Invalid JSON input: {err}"))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{text}");
    Ok(())
}
