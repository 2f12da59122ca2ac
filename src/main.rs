use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use introspect::tool::{self, ToolName};
use introspect::types::SourceLookup;
use introspect::{Config, diagnostics, error, extractor, index, locator, mutator};

#[derive(Parser)]
#[command(name = "introspect", about = "Extract, locate, and rewrite Python definitions")]
struct Cli {
    /// Directory to index.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a definition with new source (read from --file or stdin)
    Edit {
        /// Qualified name, e.g. `pkg.module.function`
        qualified_name: String,
        /// File holding the replacement text
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List every top-level function and class
    List {
        /// Emit full records as JSON
        #[arg(long)]
        json: bool,
        /// Only names containing this substring (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the full module that owns a definition
    Module {
        /// Qualified name, e.g. `pkg.module.function`
        qualified_name: String,
    },
    /// Print one definition's source
    Show {
        /// Qualified name, e.g. `pkg.module.function`
        qualified_name: String,
    },
    /// Run an agent tool call and print its text result
    Tool {
        /// Tool id: summary, get-source, get-module, edit-source
        name: String,
        /// Tool input, usually a JSON object
        #[arg(default_value = "")]
        input: String,
    },
    /// Describe the agent tools
    Tools,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = Config::load(&cli.root).and_then(|config| return run(&cli.root, &config, cli.command));
    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_markdown(&diagnostics::render_error(&e));
            ExitCode::from(2)
        },
    };
}

/// Log to stderr; `RUST_LOG` overrides the default of warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("introspect=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch one subcommand.
///
/// # Errors
///
/// Returns extraction, I/O, or serialization errors.
fn run(root: &Path, config: &Config, command: Commands) -> Result<ExitCode, error::Error> {
    return match command {
        Commands::List { json, filter } => cmd_list(root, config, json, filter.as_deref()),
        Commands::Show { qualified_name } => cmd_show(root, config, &qualified_name),
        Commands::Module { qualified_name } => cmd_module(root, config, &qualified_name),
        Commands::Edit { qualified_name, file } => cmd_edit(root, config, &qualified_name, file.as_deref()),
        Commands::Tool { name, input } => Ok(cmd_tool(root, config, &name, &input)),
        Commands::Tools => {
            for tool in ToolName::ALL {
                println!("{}\n    {}", tool.id(), tool.description());
            }
            Ok(ExitCode::SUCCESS)
        },
    };
}

/// Print the summary, or full records as JSON.
///
/// # Errors
///
/// Returns extraction or JSON errors.
fn cmd_list(root: &Path, config: &Config, json: bool, filter: Option<&str>) -> Result<ExitCode, error::Error> {
    let records = extractor::extract(root, config)?;
    let selected: Vec<_> = match filter {
        Some(needle) => index::search(&records, needle).into_iter().cloned().collect(),
        None => records,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else {
        print!("{}", index::summarize(&selected));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print a definition, or the list of valid names.
///
/// # Errors
///
/// Returns extraction errors.
fn cmd_show(root: &Path, config: &Config, qualified_name: &str) -> Result<ExitCode, error::Error> {
    return match locator::locate_definition_source(root, config, qualified_name)? {
        SourceLookup::Found { text } => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        },
        lookup @ SourceLookup::Unknown { .. } => {
            eprint!("{lookup}");
            Ok(ExitCode::FAILURE)
        },
    };
}

/// Print the owning module verbatim.
///
/// # Errors
///
/// Returns extraction or I/O errors.
fn cmd_module(root: &Path, config: &Config, qualified_name: &str) -> Result<ExitCode, error::Error> {
    let Some(content) = locator::locate_module_source(root, config, qualified_name)? else {
        eprintln!("no module defines `{qualified_name}`");
        return Ok(ExitCode::FAILURE);
    };
    print!("{content}");
    return Ok(ExitCode::SUCCESS);
}

/// Replace a definition; exit 1 if the edit was rejected.
///
/// # Errors
///
/// Returns extraction or I/O errors.
fn cmd_edit(
    root: &Path,
    config: &Config,
    qualified_name: &str,
    file: Option<&Path>,
) -> Result<ExitCode, error::Error> {
    let new_text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        },
    };
    let new_text = tool::strip_code_fence(new_text.trim_end_matches(['\n', '\r']));

    let outcome = mutator::replace_definition(root, config, qualified_name, new_text)?;
    let message = diagnostics::render_edit_outcome(qualified_name, &outcome);
    if outcome.is_applied() {
        println!("{message}");
        return Ok(ExitCode::SUCCESS);
    }
    diagnostics::print_markdown(&message);
    return Ok(ExitCode::FAILURE);
}

/// Run a tool call. Tool results are always text, so only an unknown tool fails.
fn cmd_tool(root: &Path, config: &Config, name: &str, input: &str) -> ExitCode {
    let tool = match name.parse::<ToolName>() {
        Ok(tool) => tool,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        },
    };
    println!("{}", tool::invoke(root, config, tool, input));
    return ExitCode::SUCCESS;
}
