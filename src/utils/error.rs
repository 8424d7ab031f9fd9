use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with status {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("No valid data to transform: {message}")]
    MissingDataError { message: String },

    #[error("Required column '{column}' not found in the data")]
    MissingColumnError { column: String },

    #[error("Failed to render chart '{chart}': {message}")]
    RenderError { chart: String, message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Config,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::MissingDataError { .. } | EtlError::MissingColumnError { .. } => {
                ErrorCategory::Data
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Config,
            EtlError::CsvError(_) | EtlError::RenderError { .. } => ErrorCategory::Output,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一產出失敗只記錄，不中斷流程
            ErrorCategory::Output => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => {
                "Check the network connection and that the API endpoint is reachable"
            }
            EtlError::HttpStatusError { .. } => {
                "Verify the endpoint URL and query parameters, then try again later"
            }
            EtlError::MissingDataError { .. } => {
                "Make sure the API returns a JSON object with a 'results' array"
            }
            EtlError::MissingColumnError { .. } => {
                "The API response layout changed; make sure each record contains 'dob.age'"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output directory is writable and has free space"
            }
            EtlError::RenderError { .. } => "Check the clean data for values that can be plotted",
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => {
                format!("Extraction failed, the process has stopped: {}", self)
            }
            EtlError::MissingDataError { .. } | EtlError::MissingColumnError { .. } => format!(
                "Transformation failed, no clean CSV or charts will be generated: {}",
                self
            ),
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => format!("Invalid configuration: {}", self),
            _ => self.to_string(),
        }
    }
}
