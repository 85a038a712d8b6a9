use crate::domain::model::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Write error: {message}")]
    Write { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("run aborted during {stage}: {source}")]
    Aborted {
        stage: Stage,
        #[source]
        source: Box<ScrapeError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parse,
    Write,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn parse(message: impl Into<String>) -> Self {
        ScrapeError::Parse {
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        ScrapeError::Write {
            message: message.into(),
        }
    }

    /// 將錯誤包裝為致命錯誤並標記發生的階段
    pub fn abort(self, stage: Stage) -> Self {
        ScrapeError::Aborted {
            stage,
            source: Box::new(self),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            ScrapeError::Aborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::Network { .. } | ScrapeError::HttpStatus { .. } => ErrorCategory::Network,
            ScrapeError::Parse { .. } => ErrorCategory::Parse,
            ScrapeError::IoError(_)
            | ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::Write { .. } => ErrorCategory::Write,
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorCategory::Config,
            ScrapeError::Aborted { source, .. } => source.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parse => ErrorSeverity::High,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Write => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the network connection and that the listing URL is reachable, then run again"
            }
            ErrorCategory::Parse => {
                "The page layout may have changed; check the anchors in the [extract] section"
            }
            ErrorCategory::Write => {
                "Check that the output path exists, is writable and has free space"
            }
            ErrorCategory::Config => "Fix the configuration file or command line arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::Aborted { stage, source } => {
                format!("Scrape aborted at {}: {}", stage, source.user_friendly_message())
            }
            ScrapeError::Network { url, .. } => format!("Could not reach {}", url),
            ScrapeError::HttpStatus { url, status } => {
                format!("Server answered {} for {}", status, url)
            }
            ScrapeError::Parse { message } => format!("Could not read page: {}", message),
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => format!("Invalid configuration: {}", self),
            _ => format!("Could not write output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
