use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use richdoc_common::read_document;
use richdoc_editor::{check_invariants, coerce_document, RulePipeline};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Document JSON file to repair
    pub input: PathBuf,

    /// Write the repaired document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short, long, conflicts_with = "output")]
    pub in_place: bool,
}

pub fn repair(args: RepairArgs, config: &Config) -> Result<()> {
    let value = read_document(&args.input)?;
    let coerced = coerce_document(value.clone());
    let found = check_invariants(&coerced).len();

    let rules = RulePipeline::standard();
    let nodes = richdoc_editor::repair(value, &rules, &config.editor);
    let json = serde_json::to_string_pretty(&nodes)?;

    let target = if args.in_place {
        Some(args.input.clone())
    } else {
        args.output.clone()
    };
    match target {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!(
                "{} {} → {} ({} blocks, {} problems fixed)",
                "✓".green(),
                args.input.display(),
                path.display(),
                nodes.len(),
                found
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
