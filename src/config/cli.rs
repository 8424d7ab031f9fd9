use super::{
    DEFAULT_API_ENDPOINT, DEFAULT_FORMAT, DEFAULT_OUTPUT_PATH, DEFAULT_RESULTS, DEFAULT_SEED,
};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_source, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "user-etl")]
#[command(about = "Fetch random users, clean them, summarize and chart the result")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    /// Number of users to request
    #[arg(long, default_value_t = DEFAULT_RESULTS)]
    pub results: usize,

    /// Seed sent to the API so repeated runs return the same users
    #[arg(long, default_value = DEFAULT_SEED)]
    pub seed: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    /// Request timeout; the HTTP client default applies when omitted
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Do not write statistics_summary.csv
    #[arg(long)]
    pub skip_statistics: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            results: DEFAULT_RESULTS,
            seed: DEFAULT_SEED.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            timeout_seconds: None,
            skip_statistics: false,
            verbose: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn results(&self) -> usize {
        self.results
    }

    fn seed(&self) -> &str {
        &self.seed
    }

    fn format(&self) -> &str {
        DEFAULT_FORMAT
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn write_statistics(&self) -> bool {
        !self.skip_statistics
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_source(
            &self.api_endpoint,
            self.results,
            &self.seed,
            DEFAULT_FORMAT,
            self.timeout_seconds,
        )?;
        validate_path("output_path", &self.output_path)
    }
}
