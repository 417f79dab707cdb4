use crate::runner::{CmdOutput, CmdRunner, CommandSpec};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRun {
    pub command: CommandSpec,
    /// Contents of every argument that named a readable file at run time.
    pub files: BTreeMap<String, String>,
}

/// Runner that records commands instead of executing them.
///
/// A configured result applies to a command whose line equals its key or
/// starts with the key followed by a space, the longest key winning. Keying on
/// `"ruby"` alone therefore matches every Ruby invocation whatever its
/// temporary paths. Unknown commands succeed with empty output.
#[derive(Default)]
pub struct MockCmdRunner {
    runs: Mutex<Vec<MockRun>>,
    results: Mutex<HashMap<String, io::Result<CmdOutput>>>,
}

impl MockCmdRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&self, command_line: &str, output: CmdOutput) {
        lock(&self.results).insert(command_line.to_owned(), Ok(output));
    }

    pub fn add_spawn_error(&self, command_line: &str, kind: io::ErrorKind) {
        lock(&self.results).insert(command_line.to_owned(), Err(io::Error::from(kind)));
    }

    pub fn runs(&self) -> Vec<MockRun> {
        lock(&self.runs).clone()
    }
}

/// A panic in another test thread must not hide what was recorded.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CmdRunner for MockCmdRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CmdOutput> {
        let files = command
            .args
            .iter()
            .filter(|arg| Path::new(arg).is_file())
            .filter_map(|arg| Some((arg.clone(), std::fs::read_to_string(arg).ok()?)))
            .collect();

        lock(&self.runs).push(MockRun {
            command: command.clone(),
            files,
        });

        let line = command.to_string();
        let results = lock(&self.results);
        let matched = results
            .iter()
            .filter(|(key, _)| {
                line == **key
                    || line
                        .strip_prefix(key.as_str())
                        .is_some_and(|rest| rest.starts_with(' '))
            })
            .max_by_key(|(key, _)| key.len());
        match matched {
            Some((_, Ok(output))) => Ok(output.clone()),
            Some((_, Err(e))) => Err(io::Error::from(e.kind())),
            None => Ok(CmdOutput {
                code: Some(0),
                ..CmdOutput::default()
            }),
        }
    }
}
