use super::{json_pretty, yaml, EXIT_SUCCESS};
use clap::ValueEnum;
use rigger_manifest::{parse_manifest_file, Manifest};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable overview.
    #[default]
    Summary,
    Json,
    Yaml,
}

pub fn run(manifest: &Path, format: OutputFormat) -> Result<u8, String> {
    let parsed = parse_manifest_file(manifest).map_err(|e| e.to_string())?;
    let output = match format {
        OutputFormat::Summary => summary(&parsed),
        OutputFormat::Json => json_pretty(&parsed)? + "\n",
        OutputFormat::Yaml => yaml(&parsed)?,
    };
    print!("{output}");
    Ok(EXIT_SUCCESS)
}

fn summary(manifest: &Manifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "deployment:     {}", manifest.name);
    let _ = writeln!(out, "watch time:     {}", manifest.update.update_watch_time);
    let _ = writeln!(out, "networks:       {}", manifest.networks.len());
    let _ = writeln!(out, "resource pools: {}", manifest.resource_pools.len());
    let _ = writeln!(out, "disk pools:     {}", manifest.disk_pools.len());
    let _ = writeln!(out, "properties:     {}", manifest.properties.len());
    let _ = writeln!(out, "jobs:           {}", manifest.jobs.len());
    for job in &manifest.jobs {
        let templates: Vec<&str> = job.templates.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(
            out,
            "  {} x{} ({}) [{}]",
            job.name,
            job.instances,
            job.lifecycle,
            templates.join(", ")
        );
    }
    out
}
