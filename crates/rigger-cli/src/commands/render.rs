use super::EXIT_SUCCESS;
use crate::config::RiggerConfig;
use rigger_manifest::parse_manifest_file;
use rigger_templates::{ErbRenderer, EvaluationContext, TemplateRenderer};
use std::path::Path;
use tracing::info;

pub struct RenderArgs<'a> {
    pub manifest: &'a Path,
    pub job: &'a str,
    pub index: usize,
    pub src: &'a Path,
    pub dst: &'a Path,
}

pub fn run(args: &RenderArgs<'_>, config: &RiggerConfig) -> Result<u8, String> {
    let manifest = parse_manifest_file(args.manifest).map_err(|e| e.to_string())?;
    let job = manifest
        .job(args.job)
        .ok_or_else(|| format!("no job named '{}' in deployment '{}'", args.job, manifest.name))?;
    let ctx = EvaluationContext::for_instance(&manifest, job, args.index).map_err(|e| e.to_string())?;

    let renderer = ErbRenderer::system().with_ruby(&config.ruby);
    renderer
        .render(args.src, args.dst, &ctx)
        .map_err(|e| format!("rendering {}: {e}", args.src.display()))?;

    info!("rendered {}/{} -> {}", job.name, args.index, args.dst.display());
    println!("rendered {} for {}/{}", args.dst.display(), job.name, args.index);
    Ok(EXIT_SUCCESS)
}
