//! Template rendering for rigger jobs.
//!
//! Rendering is a collaborator of manifest parsing: a job's normalized
//! properties, plus its network and instance-index details, are packed into an
//! [`EvaluationContext`] and handed to a [`TemplateRenderer`]. The shipped
//! implementation, [`ErbRenderer`], runs a small Ruby ERB driver through a
//! pluggable [`CmdRunner`].

pub mod context;
pub mod erb;
pub mod mock;
pub mod runner;

pub use context::{ContextError, EvaluationContext, NetworkContext};
pub use erb::ErbRenderer;
pub use runner::{CmdOutput, CmdRunner, CommandSpec, SystemCmdRunner};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("creating temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("writing {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("serializing evaluation context: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("running '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{command}' exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Renders one template file into a destination file.
pub trait TemplateRenderer {
    fn render(&self, src: &Path, dst: &Path, ctx: &EvaluationContext) -> Result<(), RenderError>;
}
