use super::{
    DEFAULT_API_ENDPOINT, DEFAULT_FORMAT, DEFAULT_OUTPUT_PATH, DEFAULT_RESULTS, DEFAULT_SEED,
};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_source, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_results")]
    pub results: usize,
    #[serde(default = "default_seed")]
    pub seed: String,
    #[serde(default = "default_format")]
    pub format: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            results: default_results(),
            seed: default_seed(),
            format: default_format(),
            timeout_seconds: None,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_true")]
    pub write_statistics: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            write_statistics: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// `tracing` 過濾字串，例如 "user_etl=debug"
    pub log_level: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_results() -> usize {
    DEFAULT_RESULTS
}

fn default_seed() -> String {
    DEFAULT_SEED.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_true() -> bool {
    true
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})；找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn results(&self) -> usize {
        self.source.results
    }

    fn seed(&self) -> &str {
        &self.source.seed
    }

    fn format(&self) -> &str {
        &self.source.format
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.source
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn write_statistics(&self) -> bool {
        self.load.write_statistics
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_source(
            &self.source.endpoint,
            self.source.results,
            &self.source.seed,
            &self.source.format,
            self.source.timeout_seconds,
        )?;
        validate_path("load.output_path", &self.load.output_path)
    }
}
