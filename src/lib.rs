pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::storage::LocalStorage;
pub use app::pipelines::UserPipeline;
pub use core::etl::EtlEngine;
pub use domain::model::RunReport;
pub use utils::error::{EtlError, Result};
