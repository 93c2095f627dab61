mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, excerpt, repair, ApplyArgs, CheckArgs, ExcerptArgs, RepairArgs};
use config::Config;
use std::path::PathBuf;

/// richdoc - repair, check and script rich-text documents
#[derive(Parser, Debug)]
#[command(name = "richdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./richdoc.config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Repair a document into a valid tree
    Repair(RepairArgs),

    /// Report invariant violations without changing anything
    Check(CheckArgs),

    /// Print a plain-text excerpt of a document
    Excerpt(ExcerptArgs),

    /// Run a JSON command script against a document
    Apply(ApplyArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Repair(args) => repair(args, &config),
        Command::Check(args) => check(args),
        Command::Excerpt(args) => excerpt(args, &config),
        Command::Apply(args) => apply(args, &config),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
