//! Configuration error types

use thiserror::Error;

/// Errors loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors from semantic validation of loaded configuration
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_field_names() {
        let err = ValidationError::MissingRequired("database.url");
        assert!(err.to_string().contains("database.url"));

        let err = ValidationError::Invalid {
            field: "server.host",
            reason: "bad".to_string(),
        };
        assert!(err.to_string().contains("server.host"));
        assert!(err.to_string().contains("bad"));
    }
}
