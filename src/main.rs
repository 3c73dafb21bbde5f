use clap::{Parser as ClapParser, Subcommand};
use dftly::cli::{self, CliError, ParseOptions, ResolveCommandOptions};
use dftly::output::{failure_report, to_json, to_json_pretty};
use dftly::{FailureMode, ResolveOptions};
use std::fs;
use std::io::{self, Read};
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "dftly")]
#[command(about = "dftly - resolve simplified dataframe expression configs into canonical form")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a simplified-form document
    Resolve {
        /// Document to resolve (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Path to a schema document mapping column names to types
        #[arg(short, long)]
        schema: Option<String>,

        /// Read documents as YAML
        #[arg(long)]
        yaml: bool,

        /// Keep resolving other entries when one fails
        #[arg(long)]
        isolate: bool,

        /// Check every column against the schema
        #[arg(long)]
        validate_columns: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Parse a single expression strictly and print its node
    Parse {
        /// The expression to parse
        expression: String,

        /// Path to a schema document mapping column names to types
        #[arg(short, long)]
        schema: Option<String>,

        /// Read the schema as YAML
        #[arg(long)]
        yaml: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List expression kinds and their aliases
    Kinds,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            input,
            schema,
            yaml,
            isolate,
            validate_columns,
            pretty,
        } => run_resolve(input, schema, yaml, isolate, validate_columns, pretty),
        Commands::Parse {
            expression,
            schema,
            yaml,
            pretty,
        } => run_parse(expression, schema, yaml, pretty),
        Commands::Kinds => {
            print!("{}", cli::get_kinds_overview());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_schema(path: Option<String>) -> Result<Option<String>, CliError> {
    Ok(path.map(fs::read_to_string).transpose()?)
}

fn run_resolve(
    input: Option<String>,
    schema: Option<String>,
    yaml: bool,
    isolate: bool,
    validate_columns: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = ResolveCommandOptions {
        input,
        schema: read_schema(schema)?,
        yaml,
        options: ResolveOptions {
            failure_mode: if isolate {
                FailureMode::Isolate
            } else {
                FailureMode::FailFast
            },
            validate_columns,
        },
    };

    let resolution = cli::execute_resolve(&options)?;
    let json = if pretty {
        to_json_pretty(&resolution.entries)
    } else {
        to_json(&resolution.entries)
    }?;
    println!("{}", json);

    if !resolution.is_complete() {
        eprint!("{}", failure_report(&resolution.failures));
        return Err(CliError::Incomplete {
            failed: resolution.failures.len(),
            total: resolution.failures.len() + resolution.entries.len(),
        });
    }
    Ok(())
}

fn run_parse(
    expression: String,
    schema: Option<String>,
    yaml: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let options = ParseOptions {
        expression,
        schema: read_schema(schema)?,
        yaml,
    };
    let node = cli::execute_parse(&options)?;
    let json = if pretty {
        serde_json::to_string_pretty(&node)
    } else {
        serde_json::to_string(&node)
    }?;
    println!("{}", json);
    Ok(())
}
