use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on {field}: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Backend error: {message}")]
    BackendError { message: String },

    #[error("Payment gateway error: {message}")]
    GatewayError { message: String },

    #[error("Persistence error: {message}")]
    StoreError { message: String },
}

pub type Result<T> = std::result::Result<T, FunnelError>;
