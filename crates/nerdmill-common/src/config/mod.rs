//! Configuration loading for nerdmill.
//! Reads nerdmill.toml from an explicit path, the NERDMILL_CONFIG env var, or the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NerdError, Result};

const DEFAULT_CONFIG_FILE: &str = "nerdmill.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { url: default_service_url(), timeout_secs: default_timeout_secs() }
    }
}

fn default_service_url()  -> String { "http://localhost:8090/service/disambiguate".to_string() }
fn default_timeout_secs() -> u64    { 120 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Same-document retries after an unparseable response. -1 retries forever.
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: i64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { extensions: default_extensions(), max_parse_retries: default_max_parse_retries() }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string()]
}
fn default_max_parse_retries() -> i64 { 3 }

impl BatchConfig {
    /// Retry bound for malformed responses; `None` means unbounded.
    pub fn parse_retry_limit(&self) -> Option<u32> {
        if self.max_parse_retries < 0 {
            None
        } else {
            Some(self.max_parse_retries.min(u32::MAX as i64) as u32)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding `nerd.template.tei.xml` / `nerd.template.csv` overrides.
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { category: default_category() }
    }
}

fn default_category() -> String { "species".to_string() }


impl Config {
    /// Load configuration.
    ///
    /// An explicit path (argument or NERDMILL_CONFIG) must exist; a missing
    /// `./nerdmill.toml` falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("NERDMILL_CONFIG").map(PathBuf::from));

        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(NerdError::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p
            }
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NerdError::Config(e.to_string()))
    }
}
