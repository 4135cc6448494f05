//! sdk-exec
//!
//! Resolves the compile and run commands for a source file and, on
//! request, executes them locally. Toolchains are read from the folder
//! named by `CONFIG_FOLDER` (or `--config-folder`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sdk_exec::runner::{LocalRunner, RunnerConfig};
use sdk_exec::{pipeline, source, validators, Config, ExecutorBuilder, Sdk};

#[derive(Parser, Debug)]
#[command(name = "sdk-exec")]
#[command(about = "Build and run compile/run commands for a code submission")]
struct Args {
    /// Target SDK (e.g. SDK_JAVA, go, python)
    #[arg(long)]
    sdk: String,

    /// Source file, relative to the working directory or absolute
    #[arg(long)]
    file: String,

    /// Directory the processes are launched in
    #[arg(long, default_value = "./")]
    work_dir: PathBuf,

    /// Toolchain config folder (defaults to $CONFIG_FOLDER)
    #[arg(long)]
    config_folder: Option<PathBuf>,

    /// Main class for SDKs that dispatch by name (detected when omitted)
    #[arg(long)]
    main_class: Option<String>,

    /// Launch the commands instead of printing them
    #[arg(long)]
    execute: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config_folder {
        Some(dir) => Config::from_dir(dir),
        None => Config::from_env().context("Failed to load toolchain configuration")?,
    };
    info!(sdks = ?config.sdks(), "Loaded configuration");

    let sdk: Sdk = args.sdk.parse()?;
    let toolchain = config.toolchain(sdk)?;

    let source_path = args.work_dir.join(&args.file);
    let content = std::fs::read_to_string(&source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;

    let mut builder = ExecutorBuilder::new(
        toolchain,
        args.work_dir.clone(),
        args.file.clone(),
        validators::for_sdk(sdk),
    );
    let main_class = args
        .main_class
        .clone()
        .or_else(|| (sdk == Sdk::Java).then(|| source::java_main_class(&content)).flatten());
    if let Some(name) = main_class {
        builder = builder.main_entry(name);
    }
    let executor = builder.build()?;

    let output = if args.execute {
        let outcome = pipeline::execute(
            &executor,
            &content,
            &LocalRunner::new(),
            &RunnerConfig::from_env(),
        )
        .await?;
        serde_json::to_value(outcome)?
    } else {
        json!({
            "sdk": sdk,
            "validation": executor.validate(&content),
            "compile": executor.compile(),
            "run": executor.run(),
        })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
