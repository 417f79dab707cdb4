mod commands;
mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::parse::OutputFormat;
use commands::render::RenderArgs;
use commands::{exit_code_for, EXIT_FAILURE};
use config::RiggerConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "rigger",
    version,
    about = "Parse deployment manifests and render job templates"
)]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/rigger/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a deployment manifest and print the resulting model.
    Parse {
        /// Path to the manifest YAML file.
        manifest: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
    },
    /// Render one ERB template for a job instance.
    Render {
        /// Path to the manifest YAML file.
        manifest: PathBuf,
        /// Job whose properties and networks feed the template.
        #[arg(long)]
        job: String,
        /// Instance index within the job.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Template source file.
        src: PathBuf,
        /// Destination for the rendered output.
        dst: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RiggerConfig::load(path),
        None => RiggerConfig::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        config.log.as_deref().unwrap_or("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RIGGER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Parse { manifest, format } => commands::parse::run(&manifest, format),
        Commands::Render {
            manifest,
            job,
            index,
            src,
            dst,
        } => commands::render::run(
            &RenderArgs {
                manifest: &manifest,
                job: &job,
                index,
                src: &src,
                dst: &dst,
            },
            &config,
        ),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
