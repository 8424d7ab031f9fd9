#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

pub const DEFAULT_API_ENDPOINT: &str = "https://randomuser.me/api";
pub const DEFAULT_RESULTS: usize = 1000;
pub const DEFAULT_SEED: &str = "1234";
pub const DEFAULT_FORMAT: &str = "json";
pub const DEFAULT_OUTPUT_PATH: &str = "data_output";
