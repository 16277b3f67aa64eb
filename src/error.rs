use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
