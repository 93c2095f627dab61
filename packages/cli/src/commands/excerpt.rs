use crate::config::Config;
use anyhow::Result;
use clap::Args;
use richdoc_editor::{Document, RulePipeline};
use std::path::PathBuf;

const DEFAULT_EXCERPT_LENGTH: usize = 120;

#[derive(Args, Debug)]
pub struct ExcerptArgs {
    /// Document JSON file
    pub input: PathBuf,

    /// Maximum number of characters before the ellipsis
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Print the full plain text instead of an excerpt
    #[arg(long)]
    pub full: bool,
}

pub fn excerpt(args: ExcerptArgs, config: &Config) -> Result<()> {
    let rules = RulePipeline::standard();
    let document = Document::load(args.input.clone(), &rules, &config.editor)?;
    let nodes = document.snapshot();

    if args.full {
        println!("{}", richdoc_editor::serialize(&nodes));
        return Ok(());
    }
    let length = args
        .length
        .or(config.excerpt_length)
        .unwrap_or(DEFAULT_EXCERPT_LENGTH);
    println!("{}", richdoc_editor::excerpt(&nodes, length));
    Ok(())
}
