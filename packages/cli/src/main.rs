mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{build, init, make, BuildArgs, InitArgs, MakeArgs};

/// Swatch CLI - atomic CSS at build time
#[derive(Parser, Debug)]
#[command(name = "swatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine and compiler diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new swatch project
    Init(InitArgs),

    /// Extract styles from a project and emit the stylesheet asset
    Build(BuildArgs),

    /// Register a JSON style map and print its classes and sheet
    Make(MakeArgs),
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Build(args) => build(args, &cwd),
            Command::Make(args) => make(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
