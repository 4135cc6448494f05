//! Per-SDK template resolution.
//!
//! Each [`Toolchain`] variant carries its SDK's template data and knows
//! how to turn it into concrete command lines. Resolution walks the
//! template in order: literals pass through, placeholders are replaced,
//! nothing is reordered or deduplicated.

use std::sync::Arc;

use crate::config::ToolchainConfig;
use crate::error::ConfigError;
use crate::sdk::Sdk;

const WORK_DIR: &str = "work_dir";
const FILE_PATH: &str = "file_path";
const FILE_NAME: &str = "file_name";
const CLASSPATH: &str = "classpath";

const CLASSPATH_FLAGS: [&str; 3] = ["-classpath", "-cp", "--class-path"];

/// Values substituted into templates for one submission.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Substitutions<'a> {
    pub work_dir: &'a str,
    pub file_path: &'a str,
    pub file_name: &'a str,
}

impl Substitutions<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            WORK_DIR => Some(self.work_dir),
            FILE_PATH => Some(self.file_path),
            FILE_NAME => Some(self.file_name),
            _ => None,
        }
    }
}

/// An executable plus its resolved arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedCommand {
    pub command: String,
    pub args: Vec<String>,
}

/// Toolchain strategy for one SDK.
#[derive(Debug, Clone)]
pub enum Toolchain {
    /// Compiled to class files; classpath-bearing.
    Java(Arc<ToolchainConfig>),
    /// Compiled to a native binary.
    Go(Arc<ToolchainConfig>),
    /// Interpreted, no compile phase.
    Python(Arc<ToolchainConfig>),
    /// Interpreted through the build tool, no compile phase.
    Scio(Arc<ToolchainConfig>),
}

impl Toolchain {
    pub fn new(sdk: Sdk, config: Arc<ToolchainConfig>) -> Self {
        match sdk {
            Sdk::Java => Self::Java(config),
            Sdk::Go => Self::Go(config),
            Sdk::Python => Self::Python(config),
            Sdk::Scio => Self::Scio(config),
        }
    }

    pub const fn sdk(&self) -> Sdk {
        match self {
            Self::Java(_) => Sdk::Java,
            Self::Go(_) => Sdk::Go,
            Self::Python(_) => Sdk::Python,
            Self::Scio(_) => Sdk::Scio,
        }
    }

    pub fn config(&self) -> &ToolchainConfig {
        match self {
            Self::Java(config) | Self::Go(config) | Self::Python(config) | Self::Scio(config) => {
                config.as_ref()
            }
        }
    }

    /// Check that the template fields required by this SDK are present.
    pub fn check(&self) -> Result<(), ConfigError> {
        let sdk = self.sdk();
        let config = self.config();

        if config.run_command.trim().is_empty() {
            return Err(ConfigError::MissingRunCommand { sdk });
        }

        for command in [&config.run_command, &config.compile_command] {
            if command.trim() != command.as_str() {
                return Err(ConfigError::MalformedCommand {
                    sdk,
                    command: command.clone(),
                });
            }
        }

        let has_compile = !config.compile_command.trim().is_empty();
        if sdk.is_compiled() && !has_compile {
            return Err(ConfigError::MissingCompileCommand { sdk });
        }
        if !sdk.is_compiled() && (has_compile || !config.compile_args.is_empty()) {
            return Err(ConfigError::UnexpectedCompileCommand { sdk });
        }

        Ok(())
    }

    /// Resolve the compile phase. `None` for interpreted SDKs.
    pub(crate) fn compile_command(&self, subs: &Substitutions<'_>) -> Option<ResolvedCommand> {
        let config = self.config();
        let mut args = match self {
            Self::Java(_) => expand_java(&config.compile_args, subs, &config.compile_classpath),
            Self::Go(_) => expand_all(&config.compile_args, subs),
            Self::Python(_) | Self::Scio(_) => return None,
        };
        if !references_file_path(&config.compile_args) {
            args.push(subs.file_path.to_string());
        }
        Some(ResolvedCommand {
            command: expand(&config.compile_command, |name| subs.lookup(name)),
            args,
        })
    }

    /// Resolve the run phase.
    ///
    /// `main_entry` is the detected entry identifier for SDKs that
    /// dispatch by name; other SDKs ignore it.
    pub(crate) fn run_command(
        &self,
        subs: &Substitutions<'_>,
        main_entry: Option<&str>,
    ) -> ResolvedCommand {
        let config = self.config();
        let args = match self {
            Self::Java(_) => {
                let mut args = expand_java(&config.run_args, subs, &config.run_classpath);
                if let Some(entry) = main_entry {
                    args.push(entry.to_string());
                }
                args
            }
            Self::Go(_) => expand_all(&config.run_args, subs),
            Self::Python(_) | Self::Scio(_) => {
                let mut args = expand_all(&config.run_args, subs);
                if !references_file_path(&config.run_args) {
                    args.push(subs.file_path.to_string());
                }
                args
            }
        };
        ResolvedCommand {
            command: expand(&config.run_command, |name| subs.lookup(name)),
            args,
        }
    }
}

fn references_file_path(template: &[String]) -> bool {
    let token = format!("{{{FILE_PATH}}}");
    template.iter().any(|arg| arg.contains(&token))
}

fn expand_all(template: &[String], subs: &Substitutions<'_>) -> Vec<String> {
    template
        .iter()
        .map(|token| expand(token, |name| subs.lookup(name)))
        .collect()
}

/// Java expansion: the common placeholders plus classpath injection.
///
/// A classpath flag that ends the template receives the classpath as its
/// value, and a flag value ending in `:` gets the classpath appended.
/// Both are no-ops when `classpath` is empty.
fn expand_java(template: &[String], subs: &Substitutions<'_>, classpath: &[String]) -> Vec<String> {
    let joined = classpath.join(":");
    let mut args = Vec::with_capacity(template.len() + 1);
    let mut after_flag = false;

    for token in template {
        let mut arg = expand(token, |name| {
            if name == CLASSPATH {
                Some(joined.as_str())
            } else {
                subs.lookup(name)
            }
        });
        if after_flag && !joined.is_empty() && arg.ends_with(':') {
            arg.push_str(&joined);
        }
        after_flag = CLASSPATH_FLAGS.contains(&token.as_str());
        args.push(arg);
    }

    if after_flag && !joined.is_empty() {
        args.push(joined);
    }
    args
}

/// Replace `{name}` placeholders in a single pass.
///
/// Unknown names and unterminated braces are kept literally, and
/// substituted values are never rescanned.
fn expand<'a>(token: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
