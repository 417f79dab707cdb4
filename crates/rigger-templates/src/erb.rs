use crate::context::EvaluationContext;
use crate::runner::{CmdRunner, CommandSpec, SystemCmdRunner};
use crate::{RenderError, TemplateRenderer};
use std::path::{Path, PathBuf};
use tracing::debug;

const RENDER_SCRIPT: &str = include_str!("erb_render.rb");
const SCRIPT_NAME: &str = "erb-render.rb";
const CONTEXT_NAME: &str = "erb-context.json";

/// Renders ERB templates by running `ruby` on a generated driver script.
///
/// Each render gets its own temporary directory holding the driver and the
/// JSON context; it is removed when the render returns, whatever the outcome.
pub struct ErbRenderer<R: CmdRunner = SystemCmdRunner> {
    runner: R,
    ruby: String,
    temp_root: Option<PathBuf>,
}

impl ErbRenderer<SystemCmdRunner> {
    pub fn system() -> Self {
        Self::new(SystemCmdRunner)
    }
}

impl<R: CmdRunner> ErbRenderer<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            ruby: "ruby".to_owned(),
            temp_root: None,
        }
    }

    /// Use a specific Ruby interpreter instead of `ruby` from `PATH`.
    #[must_use]
    pub fn with_ruby(mut self, ruby: impl Into<String>) -> Self {
        self.ruby = ruby.into();
        self
    }

    /// Create per-render directories under `root` instead of the system temp dir.
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn temp_dir(&self) -> Result<tempfile::TempDir, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("rigger-erb-");
        match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(RenderError::TempDir)
    }
}

impl<R: CmdRunner> TemplateRenderer for ErbRenderer<R> {
    fn render(&self, src: &Path, dst: &Path, ctx: &EvaluationContext) -> Result<(), RenderError> {
        let workdir = self.temp_dir()?;

        let script_path = workdir.path().join(SCRIPT_NAME);
        write_file(&script_path, RENDER_SCRIPT.as_bytes())?;

        let context_path = workdir.path().join(CONTEXT_NAME);
        let context_json = serde_json::to_vec_pretty(ctx)?;
        write_file(&context_path, &context_json)?;

        let command = CommandSpec::new(&self.ruby)
            .arg(script_path.to_string_lossy())
            .arg(context_path.to_string_lossy())
            .arg(src.to_string_lossy())
            .arg(dst.to_string_lossy());
        debug!("rendering {} -> {}: {command}", src.display(), dst.display());

        let output = self.runner.run(&command).map_err(|source| RenderError::Spawn {
            program: self.ruby.clone(),
            source,
        })?;
        if !output.success() {
            return Err(RenderError::Command {
                command: command.to_string(),
                status: output.status_text(),
                stderr: output.stderr.trim().to_owned(),
            });
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
