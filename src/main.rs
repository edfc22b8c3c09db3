//! Pineapple Checker
//!
//! Type-checks parsed Pineapple units and reports the first error.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use pineapple::config::{Config, OutputFormat, DEFAULT_CONTEXT_LINES};
use pineapple::feedback::{render, CheckStats, CompilationFeedback, ErrorReport};
use pineapple::frontend::module::ModuleLoader;
use pineapple::utils::SourceFile;
use pineapple::{CompilationSession, Diagnostic, SourceUnit};

/// Pineapple Checker
#[derive(Parser, Debug)]
#[command(name = "pinec")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Pineapple checker - type resolution and overload resolution for parsed Pineapple units")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check parsed units, given in dependency order
    Check {
        /// Units to check (JSON declaration trees), by path or by name
        #[arg(value_name = "UNIT", required = true)]
        inputs: Vec<String>,

        /// Additional directories searched for units
        #[arg(short = 'I', long = "search-path", value_name = "DIR")]
        search_paths: Vec<PathBuf>,

        /// Output format of diagnostics
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Source lines shown on each side of an error
        #[arg(long, default_value_t = DEFAULT_CONTEXT_LINES)]
        context: usize,

        /// Print the annotated declarations after a successful check
        #[arg(long)]
        emit_typed: bool,
    },
    /// Print version information
    Version,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { inputs, search_paths, format, context, emit_typed } => {
            let mut loader = ModuleLoader::new();
            for path in search_paths {
                loader.add_search_path(path);
            }
            let config = Config::new()
                .with_format(format)
                .with_context_lines(context)
                .with_emit_typed(emit_typed);
            if !check_units(&loader, &inputs, &config)? {
                process::exit(1);
            }
        }
        Commands::Version => {
            println!("pinec 0.1.0");
            println!("Pineapple Checker");
            println!("License: Apache-2.0");
        }
    }
    Ok(())
}

/// Check every unit in order. Returns whether all of them passed.
fn check_units(loader: &ModuleLoader, inputs: &[String], config: &Config) -> anyhow::Result<bool> {
    let started = Instant::now();
    let mut session = CompilationSession::new();
    let mut units: Vec<SourceUnit> = Vec::new();
    let mut failure: Option<Diagnostic> = None;

    for input in inputs {
        let mut unit = match loader.load(input) {
            Ok(unit) => unit,
            Err(error) => {
                let file = SourceFile::new(input.as_str(), "");
                failure = Some(Diagnostic::new(error, &file));
                break;
            }
        };
        if let Err(diagnostic) = session.add_unit(&mut unit) {
            failure = Some(diagnostic);
            break;
        }
        units.push(unit);
    }

    let files = session.checked_files().to_vec();
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let stats = CheckStats::from_symbols(session.symbols(), files.len(), elapsed);

    match config.format {
        OutputFormat::Json => {
            let feedback = match &failure {
                None => CompilationFeedback::success(files, stats),
                Some(diagnostic) => {
                    CompilationFeedback::failure(files, vec![ErrorReport::from_diagnostic(diagnostic)], stats)
                }
            };
            println!("{}", feedback.to_json());
        }
        OutputFormat::Human => match &failure {
            Some(diagnostic) => eprint!("{}", render(diagnostic, config.context_lines)),
            None => eprintln!("✅ No errors found in {} file(s)", files.len()),
        },
    }

    if failure.is_none() && config.emit_typed {
        let typed = serde_json::to_string_pretty(&units).context("serializing the typed declarations")?;
        println!("{}", typed);
    }
    Ok(failure.is_none())
}
