//! Toolchain configuration loaded from the SDK config folder.
//!
//! The folder is located through the `CONFIG_FOLDER` environment variable
//! and holds one JSON file per SDK (`SDK_JAVA.json`, `SDK_GO.json`, ...).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::sdk::Sdk;
use crate::toolchain::Toolchain;

/// Environment variable naming the toolchain config folder.
pub const CONFIG_FOLDER_ENV: &str = "CONFIG_FOLDER";

/// Static description of how to compile and run code for one SDK.
///
/// Argument templates may contain `{work_dir}`, `{file_path}` and
/// `{file_name}` placeholders; Java templates additionally accept
/// `{classpath}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolchainConfig {
    /// Compiler executable. Empty for interpreted SDKs.
    #[serde(default, rename = "compile_cmd", deserialize_with = "trimmed")]
    pub compile_command: String,

    /// Runtime executable. An empty value is rejected at build time.
    #[serde(default, rename = "run_cmd", deserialize_with = "trimmed")]
    pub run_command: String,

    /// Compiler argument template.
    #[serde(default)]
    pub compile_args: Vec<String>,

    /// Runtime argument template.
    #[serde(default)]
    pub run_args: Vec<String>,

    /// Library paths injected into the compile classpath (Java only).
    #[serde(default)]
    pub compile_classpath: Vec<String>,

    /// Library paths injected into the run classpath (Java only).
    #[serde(default)]
    pub run_classpath: Vec<String>,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// The set of loaded toolchains, keyed by SDK.
///
/// Loaded once at startup and only read afterwards; entries are shared
/// with every [`Toolchain`] handed out.
#[derive(Debug, Clone, Default)]
pub struct Config {
    toolchains: HashMap<Sdk, Arc<ToolchainConfig>>,
}

impl Config {
    /// Load every toolchain from the folder named by `CONFIG_FOLDER`.
    pub fn from_env() -> Result<Self> {
        let folder = std::env::var(CONFIG_FOLDER_ENV)
            .with_context(|| format!("{CONFIG_FOLDER_ENV} not set"))?;
        Ok(Self::from_dir(Path::new(&folder)))
    }

    /// Scan a folder for `SDK_*.json` toolchain files.
    ///
    /// Unreadable, unparsable or unknown-SDK files are logged and skipped.
    pub fn from_dir(dir: &Path) -> Self {
        let mut config = Self::default();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot read config folder");
                return config;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "Error reading config folder entry");
                    continue;
                }
            };

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.starts_with("SDK_") {
                debug!(path = %path.display(), "Ignoring non-toolchain file");
                continue;
            }

            let sdk = match stem.parse::<Sdk>() {
                Ok(sdk) => sdk,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping toolchain file");
                    continue;
                }
            };

            match Self::load_toolchain_file(&path) {
                Ok(toolchain) => {
                    info!(sdk = %sdk, path = %path.display(), "Loaded toolchain");
                    config.insert(sdk, toolchain);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping toolchain file");
                }
            }
        }

        config
    }

    /// Read and parse a single toolchain file.
    pub fn load_toolchain_file(path: &Path) -> Result<ToolchainConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Register or replace the toolchain for an SDK.
    pub fn insert(&mut self, sdk: Sdk, toolchain: ToolchainConfig) {
        if self.toolchains.insert(sdk, Arc::new(toolchain)).is_some() {
            info!(sdk = %sdk, "Toolchain replaced");
        }
    }

    /// SDKs with a loaded toolchain, sorted.
    pub fn sdks(&self) -> Vec<Sdk> {
        let mut sdks: Vec<_> = self.toolchains.keys().copied().collect();
        sdks.sort_unstable();
        sdks
    }

    /// Resolve the toolchain strategy for an SDK.
    pub fn toolchain(&self, sdk: Sdk) -> Result<Toolchain, ConfigError> {
        self.toolchains
            .get(&sdk)
            .map(|config| Toolchain::new(sdk, Arc::clone(config)))
            .ok_or(ConfigError::MissingToolchain(sdk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAVA_CONFIG: &str = r#"{
        "compile_cmd": "javac",
        "run_cmd": "java",
        "compile_args": ["-d", "bin", "-classpath"],
        "run_args": ["-cp", "bin:"]
    }"#;

    #[test]
    fn parse_toolchain_json() {
        let config: ToolchainConfig = serde_json::from_str(JAVA_CONFIG).unwrap();
        assert_eq!(config.compile_command, "javac");
        assert_eq!(config.run_command, "java");
        assert_eq!(config.compile_args, vec!["-d", "bin", "-classpath"]);
        assert_eq!(config.run_args, vec!["-cp", "bin:"]);
        assert!(config.compile_classpath.is_empty());
        assert!(config.run_classpath.is_empty());
    }

    #[test]
    fn parse_interpreted_toolchain_defaults() {
        let config: ToolchainConfig =
            serde_json::from_str(r#"{"run_cmd": "python3", "run_args": []}"#).unwrap();
        assert!(config.compile_command.is_empty());
        assert!(config.compile_args.is_empty());
    }

    #[test]
    fn missing_run_cmd_parses_as_empty() {
        // Rejected later by the builder as a configuration error.
        let config: ToolchainConfig = serde_json::from_str(r#"{"compile_cmd": "go"}"#).unwrap();
        assert!(config.run_command.is_empty());
    }

    #[test]
    fn commands_are_trimmed_on_load() {
        let config: ToolchainConfig =
            serde_json::from_str(r#"{"compile_cmd": " javac\n", "run_cmd": "  java "}"#).unwrap();
        assert_eq!(config.compile_command, "javac");
        assert_eq!(config.run_command, "java");

        let blank: ToolchainConfig = serde_json::from_str(r#"{"run_cmd": "   "}"#).unwrap();
        assert_eq!(blank.run_command, "");
    }

    #[test]
    fn scan_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path());
        assert!(config.sdks().is_empty());
    }

    #[test]
    fn scan_nonexistent_dir() {
        let config = Config::from_dir(Path::new("/nonexistent/path"));
        assert!(config.sdks().is_empty());
    }

    #[test]
    fn scan_loads_known_sdks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SDK_JAVA.json"), JAVA_CONFIG).unwrap();
        std::fs::write(
            dir.path().join("SDK_PYTHON.json"),
            r#"{"run_cmd": "python3", "run_args": ["-u"]}"#,
        )
        .unwrap();

        let config = Config::from_dir(dir.path());
        assert_eq!(config.sdks(), vec![Sdk::Java, Sdk::Python]);

        let java = config.toolchain(Sdk::Java).unwrap();
        assert_eq!(java.sdk(), Sdk::Java);
        assert_eq!(java.config().compile_command, "javac");
    }

    #[test]
    fn scan_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SDK_GO.json"), "not json").unwrap();
        std::fs::write(dir.path().join("SDK_RUST.json"), r#"{"run_cmd": "cargo"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("other.json"), r#"{"run_cmd": "x"}"#).unwrap();

        let config = Config::from_dir(dir.path());
        assert!(config.sdks().is_empty());
    }

    #[test]
    fn missing_toolchain_is_config_error() {
        let config = Config::default();
        let err = config.toolchain(Sdk::Go).unwrap_err();
        assert_eq!(err, ConfigError::MissingToolchain(Sdk::Go));
    }

    #[test]
    fn load_toolchain_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SDK_JAVA.json");
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_toolchain_file(&path).is_err());
    }

    #[test]
    fn insert_replaces_existing() {
        let mut config = Config::default();
        config.insert(
            Sdk::Python,
            ToolchainConfig {
                run_command: "python2".into(),
                ..ToolchainConfig::default()
            },
        );
        config.insert(
            Sdk::Python,
            ToolchainConfig {
                run_command: "python3".into(),
                ..ToolchainConfig::default()
            },
        );
        let python = config.toolchain(Sdk::Python).unwrap();
        assert_eq!(python.config().run_command, "python3");
    }
}
