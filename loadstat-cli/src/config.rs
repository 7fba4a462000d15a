//! Configuration loading from loadstat.toml
//!
//! Loadstat configuration can be specified in a `loadstat.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use loadstat_logic::{SLA_DISABLED, Thresholds};
use loadstat_parse::ParserKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`LoadstatConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "loadstat.toml";

/// Loadstat configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoadstatConfig {
    /// Classification thresholds
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// Parsers to run, in order
    #[serde(default)]
    pub parsers: Vec<ParserConfig>,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Threshold configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Error percentage above which the build fails (-1 disables)
    #[serde(default = "default_disabled")]
    pub fail: i32,
    /// Error percentage above which the build is unstable (-1 disables)
    #[serde(default = "default_disabled")]
    pub unstable: i32,
    /// 90th percentile limit in milliseconds (unset disables)
    #[serde(default)]
    pub sla_millis: Option<u64>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            fail: default_disabled(),
            unstable: default_disabled(),
            sla_millis: None,
        }
    }
}

fn default_disabled() -> i32 {
    -1
}

impl ThresholdsConfig {
    /// Thresholds for the classifier
    pub fn to_thresholds(self) -> Thresholds {
        Thresholds {
            fail_threshold: self.fail,
            unstable_threshold: self.unstable,
            sla_millis: self.sla_millis.unwrap_or(SLA_DISABLED),
        }
    }
}

/// One parser and the files it reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parser name: aggregate, summarizer, jtl-csv or jtl-xml
    pub kind: ParserKind,
    /// Glob patterns for the current build (defaults to the parser's pattern)
    #[serde(default)]
    pub files: Vec<String>,
    /// Glob patterns for the previous build, used for diffs
    #[serde(default)]
    pub previous: Vec<String>,
}

impl ParserConfig {
    /// Patterns for the current build, falling back to the parser default
    pub fn patterns(&self) -> Vec<String> {
        if self.files.is_empty() {
            vec![self.kind.default_pattern().to_string()]
        } else {
            self.files.clone()
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write output to this file instead of stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            file: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl LoadstatConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `loadstat.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), "ignoring configuration: {}", e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Loadstat Configuration
# https://github.com/ml-rust/loadstat

[thresholds]
# Error percentage above which the build fails (-1 disables)
fail = -1
# Error percentage above which the build is unstable (-1 disables)
unstable = -1
# 90th percentile limit in milliseconds (uncomment to enable)
# sla_millis = 500

[[parsers]]
# Parser: aggregate, summarizer, jtl-csv or jtl-xml
kind = "jtl-xml"
# Result files of the current build
files = ["**/*.jtl"]
# Result files of the previous build, for diffs (uncomment to enable)
# previous = ["previous/**/*.jtl"]

[output]
# Output format: human or json
format = "human"
# Write to a file instead of stdout (uncomment to enable)
# file = "loadstat.json"
"#
        .to_string()
    }
}
