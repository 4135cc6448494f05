//! Per-submission executor.
//!
//! An [`Executor`] owns the resolved compile and run settings plus the
//! validators for exactly one submission. It is pure data: validating and
//! producing descriptors never spawns a process, opens a file or blocks.
//!
//! Callers drive the phases in order:
//!
//! ```text
//! Built -> Validating -> ValidationFailed
//!                     -> Validated -> Compiling -> CompileFailed
//!                                               -> Compiled | NoCompileNeeded -> Running -> RunFailed
//!                                                                                         -> RunSucceeded
//! ```
//!
//! [`crate::pipeline::execute`] implements that walk on top of a
//! [`crate::runner::ProcessRunner`].

mod builder;

pub use builder::{base_executor_builder, ExecutorBuilder};

use crate::command::{CommandSetting, ProcessDescriptor};
use crate::validators::{ValidationReport, Validator};

/// Resolved phases and validators for one submission.
///
/// Only obtainable through [`ExecutorBuilder::build`].
#[derive(Debug, Clone)]
pub struct Executor {
    compile: CommandSetting,
    run: CommandSetting,
    validators: Vec<Validator>,
}

impl Executor {
    /// Run every validator against the submission.
    ///
    /// Does not stop at the first failure. Callers must not launch either
    /// phase unless the report is ok; `compile` and `run` do not re-check.
    pub fn validate(&self, source: &str) -> ValidationReport {
        ValidationReport::run(&self.validators, source, self.compile.file_name())
    }

    /// Descriptor for the compile phase. Empty executable when the SDK has
    /// nothing to compile.
    pub fn compile(&self) -> ProcessDescriptor {
        self.compile.to_descriptor()
    }

    pub fn run(&self) -> ProcessDescriptor {
        self.run.to_descriptor()
    }

    pub const fn compile_setting(&self) -> &CommandSetting {
        &self.compile
    }

    pub const fn run_setting(&self) -> &CommandSetting {
        &self.run
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}
