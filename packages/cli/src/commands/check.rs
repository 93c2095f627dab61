use anyhow::Result;
use clap::Args;
use colored::Colorize;
use richdoc_common::read_document;
use richdoc_editor::{check_invariants, coerce_document, InvariantViolation};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document JSON files to check
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn check(args: CheckArgs) -> Result<()> {
    let mut total = 0;
    for input in &args.inputs {
        let violations = check_file(input)?;
        total += violations.len();
        match args.format.as_str() {
            "json" => {
                let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
                println!(
                    "{}",
                    serde_json::json!({ "file": input.display().to_string(), "violations": messages })
                );
            }
            _ => print_text(input, &violations),
        }
    }

    if total > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Invariant breaches of a document as stored, before normalization
fn check_file(path: &Path) -> Result<Vec<InvariantViolation>> {
    let value = read_document(path)?;
    Ok(check_invariants(&coerce_document(value)))
}

fn print_text(path: &Path, violations: &[InvariantViolation]) {
    if violations.is_empty() {
        println!("{} {}", "✓".green(), path.display());
        return;
    }
    println!("{} {}", "✗".red(), path.display().to_string().bold());
    for violation in violations {
        println!("   {} {}", "-".yellow(), violation);
    }
}
