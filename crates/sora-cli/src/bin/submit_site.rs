//! Store sites from a JSON file in a project on a SORA server.

use clap::Parser;
use sora_cli::{load_sites, report, SoraClient};
use std::path::PathBuf;

/// Submit site inputs to a SORA server
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SORA Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Existing project id; a new project is created when omitted
    #[arg(long)]
    project: Option<String>,

    /// Name for a newly created project
    #[arg(long, default_value = "CLI project")]
    name: String,

    /// Only submit the site with this id
    #[arg(long)]
    site: Option<String>,

    /// Site input file (single site or {"sites": [...]})
    #[arg(long)]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut sites = load_sites(&args.input)?;
    if let Some(site_id) = &args.site {
        sites.retain(|site| &site.site_id == site_id);
        if sites.is_empty() {
            anyhow::bail!("no site '{}' in {}", site_id, args.input.display());
        }
    }

    println!("Connecting to SORA Server at {}...", args.url);
    let client = SoraClient::new(&args.url);

    let project_id = match args.project {
        Some(id) => id,
        None => {
            let project = client.create_project(&args.name, None).await?;
            println!("Created project '{}': {}", project.name, project.project_id);
            project.project_id
        }
    };

    for site in &sites {
        let assessment = client.put_site(&project_id, site).await?;
        match assessment.sail {
            Some(sail) => println!("Stored site {}: {}", site.site_id, sail),
            None => println!("Stored site {}: out of scope", site.site_id),
        }
    }

    let project = client.get_project(&project_id).await?;
    println!();
    println!("{} ({})", project.name, project.project_id);
    print!("{}", report::project_summary(&project.assessment));
    Ok(())
}
