//! Configuration errors raised before any process exists.

use thiserror::Error;

use crate::sdk::Sdk;

/// A toolchain or submission is misconfigured.
///
/// Every variant is fatal to the submission and never retried. They are
/// reported synchronously, before the filesystem is touched or a process
/// is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown SDK: '{0}'")]
    UnknownSdk(String),

    #[error("no toolchain configured for {0}")]
    MissingToolchain(Sdk),

    #[error("toolchain for {sdk} has no run command")]
    MissingRunCommand { sdk: Sdk },

    #[error("toolchain for {sdk} is compiled but has no compile command")]
    MissingCompileCommand { sdk: Sdk },

    #[error("toolchain for {sdk} is interpreted but declares a compile phase")]
    UnexpectedCompileCommand { sdk: Sdk },

    #[error("toolchain for {sdk} has a malformed command: '{command}'")]
    MalformedCommand { sdk: Sdk, command: String },

    #[error("file path is empty")]
    EmptyFilePath,
}
