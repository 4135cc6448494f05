//! sdk-exec library
//!
//! Command construction and validation for multi-SDK code execution:
//! - Toolchain configuration loaded from the SDK config folder
//! - Per-SDK template resolution into compile and run descriptors
//! - Validators that gate execution
//! - A process runner trait and the pipeline enforcing phase order

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod runner;
pub mod sdk;
pub mod source;
pub mod toolchain;
pub mod validators;

pub use command::{CommandSetting, ProcessDescriptor};
pub use config::{Config, ToolchainConfig};
pub use error::ConfigError;
pub use executor::{base_executor_builder, Executor, ExecutorBuilder};
pub use sdk::Sdk;
pub use toolchain::Toolchain;
pub use validators::{ValidationFailure, ValidationReport, Validator};
