//! Resolved process invocations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One fully resolved process invocation.
///
/// Immutable once built. Argument order is exactly the order produced by
/// template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandSetting {
    file_name: String,
    dir_path: PathBuf,
    command_name: String,
    command_args: Vec<String>,
}

impl CommandSetting {
    pub(crate) fn new(
        file_name: impl Into<String>,
        dir_path: impl Into<PathBuf>,
        command_name: impl Into<String>,
        command_args: Vec<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            dir_path: dir_path.into(),
            command_name: command_name.into(),
            command_args,
        }
    }

    /// A phase with nothing to launch (e.g. compiling an interpreted SDK).
    pub(crate) fn noop(file_name: impl Into<String>, dir_path: impl Into<PathBuf>) -> Self {
        Self::new(file_name, dir_path, String::new(), Vec::new())
    }

    /// Logical name of the phase's target artifact.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    /// Executable, resolved against `PATH` at launch time.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn command_args(&self) -> &[String] {
        &self.command_args
    }

    pub fn is_noop(&self) -> bool {
        self.command_name.is_empty()
    }

    /// Translate into the descriptor handed to a process runner.
    pub fn to_descriptor(&self) -> ProcessDescriptor {
        ProcessDescriptor {
            executable: self.command_name.clone(),
            arguments: self.command_args.clone(),
            working_directory: self.dir_path.clone(),
        }
    }
}

/// What a process runner needs to launch one phase.
///
/// An empty `executable` means there is no phase to run; runners skip it
/// and proceed to the next phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub executable: String,
    pub arguments: Vec<String>,
    pub working_directory: PathBuf,
}

impl ProcessDescriptor {
    pub fn is_noop(&self) -> bool {
        self.executable.is_empty()
    }

    /// Shell-like rendering for logs. Not meant to be re-parsed.
    pub fn display_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
