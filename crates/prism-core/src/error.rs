use thiserror::Error;

/// Top-level error type for the Prism query console.
#[derive(Error, Debug)]
pub enum PrismError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PrismError>;
