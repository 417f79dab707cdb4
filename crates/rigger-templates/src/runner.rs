use std::fmt;
use std::io;
use std::process::Command;

/// A program invocation, kept as data so runners can be swapped in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_owned(),
        }
    }
}

pub trait CmdRunner: Send + Sync {
    /// Run the command to completion. `Err` means it could not be started.
    fn run(&self, command: &CommandSpec) -> io::Result<CmdOutput>;
}

/// Runs commands on the host with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCmdRunner;

impl CmdRunner for SystemCmdRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CmdOutput> {
        let output = Command::new(&command.name).args(&command.args).output()?;
        Ok(CmdOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
