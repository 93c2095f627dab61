use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use richdoc_editor::{Command, CommandResult, Document, EditSession, RulePipeline};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document JSON file
    pub input: PathBuf,

    /// Command script: a JSON array of commands
    pub script: PathBuf,

    /// Write the result here instead of saving over the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the script without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let script: Vec<Command> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid command script {}", args.script.display()))?;

    let rules = RulePipeline::standard();
    let mut document = Document::load(args.input.clone(), &rules, &config.editor)?;
    if let Some(output) = &args.output {
        document.path = Some(output.clone());
    }
    let mut session = EditSession::from_document(document, rules, config.editor.clone());

    println!("📝 {} {} commands", "Applying".green().bold(), script.len());
    let mut failed = false;
    for (index, command) in script.iter().enumerate() {
        let result = session.execute(command);
        let status = match &result {
            CommandResult::Applied { version } => format!("applied v{}", version).green(),
            CommandResult::Noop => "noop".dimmed(),
            CommandResult::Rejected { reason } => format!("rejected: {}", reason).yellow(),
            CommandResult::Failed { error } => {
                failed = true;
                format!("failed: {}", error).red()
            }
        };
        println!("   {:>3} {:<22} {}", index + 1, command.name(), status);
    }

    println!();
    println!("   Version: {}", session.version());
    println!("   Text:    {}", richdoc_editor::excerpt(&session.snapshot(), 60));

    if failed {
        return Err(anyhow::anyhow!("Script left the document in the structure error state"));
    }
    if args.dry_run || !session.document().is_dirty() {
        return Ok(());
    }
    session.document_mut().save()?;
    if let Some(path) = &session.document().path {
        println!("   {} Saved {}", "✓".green(), path.display());
    }
    Ok(())
}
