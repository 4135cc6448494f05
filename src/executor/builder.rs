//! Staged assembly of an [`Executor`].

use std::path::PathBuf;

use tracing::debug;

use super::Executor;
use crate::command::CommandSetting;
use crate::error::ConfigError;
use crate::source;
use crate::toolchain::{Substitutions, Toolchain};
use crate::validators::Validator;

/// Mutable staging area for one submission's [`Executor`].
///
/// Nothing is resolved until [`build`](Self::build), and the builder has
/// no phase operations of its own:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use sdk_exec::{ExecutorBuilder, Sdk, Toolchain, ToolchainConfig};
///
/// let toolchain = Toolchain::new(Sdk::Python, Arc::new(ToolchainConfig::default()));
/// let builder = ExecutorBuilder::new(toolchain, "./", "main.py", Vec::new());
/// let _ = builder.compile();
/// ```
#[derive(Debug, Clone)]
pub struct ExecutorBuilder {
    toolchain: Toolchain,
    work_dir: PathBuf,
    file_path: String,
    main_entry: Option<String>,
    validators: Vec<Validator>,
}

/// Start a builder for one submission.
///
/// Free-function form of [`ExecutorBuilder::new`].
pub fn base_executor_builder(
    toolchain: Toolchain,
    work_dir: impl Into<PathBuf>,
    file_path: impl Into<String>,
    validators: Vec<Validator>,
) -> ExecutorBuilder {
    ExecutorBuilder::new(toolchain, work_dir, file_path, validators)
}

impl ExecutorBuilder {
    /// `file_path` must name a file the caller already placed under
    /// `work_dir`; it is used as a string only.
    pub fn new(
        toolchain: Toolchain,
        work_dir: impl Into<PathBuf>,
        file_path: impl Into<String>,
        validators: Vec<Validator>,
    ) -> Self {
        Self {
            toolchain,
            work_dir: work_dir.into(),
            file_path: file_path.into(),
            main_entry: None,
            validators,
        }
    }

    /// Entry identifier for SDKs that dispatch by name (the Java main class).
    #[must_use]
    pub fn main_entry(mut self, name: impl Into<String>) -> Self {
        self.main_entry = Some(name.into());
        self
    }

    /// Append one validator after those already staged.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Resolve both phases and freeze them into an [`Executor`].
    pub fn build(self) -> Result<Executor, ConfigError> {
        if self.file_path.is_empty() {
            return Err(ConfigError::EmptyFilePath);
        }
        self.toolchain.check()?;

        let work_dir = self.work_dir.to_string_lossy();
        let subs = Substitutions {
            work_dir: &work_dir,
            file_path: &self.file_path,
            file_name: source::file_name(&self.file_path),
        };

        let compile = self.toolchain.compile_command(&subs).map_or_else(
            || CommandSetting::noop(self.file_path.as_str(), self.work_dir.clone()),
            |resolved| {
                CommandSetting::new(
                    self.file_path.as_str(),
                    self.work_dir.clone(),
                    resolved.command,
                    resolved.args,
                )
            },
        );

        let run_target = self
            .main_entry
            .clone()
            .unwrap_or_else(|| subs.file_name.to_string());
        let resolved = self
            .toolchain
            .run_command(&subs, self.main_entry.as_deref());
        let run = CommandSetting::new(run_target, self.work_dir.clone(), resolved.command, resolved.args);

        debug!(
            sdk = %self.toolchain.sdk(),
            compile = %compile.to_descriptor().display_line(),
            run = %run.to_descriptor().display_line(),
            validators = self.validators.len(),
            "Executor built"
        );

        Ok(Executor {
            compile,
            run,
            validators: self.validators,
        })
    }
}
