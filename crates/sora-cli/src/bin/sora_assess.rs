//! Classify sites from a local JSON file.

use anyhow::Result;
use clap::Parser;
use sora_cli::{load_sites, report};
use sora_core::SoraTables;
use std::path::PathBuf;

/// Run a SORA assessment offline
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Site input file (single site or {"sites": [...]})
    input: PathBuf,

    /// Reference tables JSON (defaults to the built-in SORA 2.5 set)
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Print the project assessment even for a single site
    #[arg(long)]
    project: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tables = match &args.tables {
        Some(path) => SoraTables::from_json(&std::fs::read_to_string(path)?)?,
        None => SoraTables::sora_2_5(),
    };
    let sites = load_sites(&args.input)?;

    if sites.len() == 1 && !args.project {
        let assessment = sora_core::assess_site(&tables, &sites[0])?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        } else {
            print!("{}", report::site_summary(&assessment));
        }
        return Ok(());
    }

    let assessment = sora_core::assess_project(&tables, &sites)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", report::project_summary(&assessment));
    }
    Ok(())
}
