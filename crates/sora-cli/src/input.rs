//! Site input files.
//!
//! A file holds either a single site object or `{"sites": [...]}`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use sora_core::SiteInput;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ProjectFile {
    sites: Vec<SiteInput>,
}

/// Read site inputs from a file. Sites without an id get `site-N`.
pub fn load_sites(path: &Path) -> Result<Vec<SiteInput>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_sites(&json).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_sites(json: &str) -> Result<Vec<SiteInput>> {
    let value: Value = serde_json::from_str(json)?;
    let mut sites = if value.get("sites").is_some() {
        serde_json::from_value::<ProjectFile>(value)?.sites
    } else {
        vec![serde_json::from_value::<SiteInput>(value)?]
    };
    for (index, site) in sites.iter_mut().enumerate() {
        if site.site_id.trim().is_empty() {
            site.site_id = format!("site-{}", index + 1);
        }
    }
    Ok(sites)
}
