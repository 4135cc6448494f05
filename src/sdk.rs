//! Supported SDKs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A source-code language/toolchain the service can compile and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sdk {
    #[serde(rename = "SDK_JAVA")]
    Java,
    #[serde(rename = "SDK_GO")]
    Go,
    #[serde(rename = "SDK_PYTHON")]
    Python,
    #[serde(rename = "SDK_SCIO")]
    Scio,
}

impl Sdk {
    /// Every supported SDK, in declaration order.
    pub const ALL: [Self; 4] = [Self::Java, Self::Go, Self::Python, Self::Scio];

    /// Identifier used in config file names and logs (e.g. `SDK_JAVA`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Java => "SDK_JAVA",
            Self::Go => "SDK_GO",
            Self::Python => "SDK_PYTHON",
            Self::Scio => "SDK_SCIO",
        }
    }

    /// Name of the toolchain file for this SDK inside the config folder.
    pub fn config_file_name(self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Whether a compile phase precedes the run phase.
    pub const fn is_compiled(self) -> bool {
        matches!(self, Self::Java | Self::Go)
    }
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sdk {
    type Err = ConfigError;

    /// Accepts both `SDK_JAVA` and `java`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("SDK_").unwrap_or(&upper);
        match name {
            "JAVA" => Ok(Self::Java),
            "GO" => Ok(Self::Go),
            "PYTHON" => Ok(Self::Python),
            "SCIO" => Ok(Self::Scio),
            _ => Err(ConfigError::UnknownSdk(s.to_string())),
        }
    }
}
