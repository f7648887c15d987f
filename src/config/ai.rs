//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.openai_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("ai.openai_api_key"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::MissingRequired("ai.model"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::Invalid {
                field: "ai.timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AiConfig {
        AiConfig {
            openai_api_key: "sk-test".to_string(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
        assert_eq!(config().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn missing_key_fails() {
        let mut c = config();
        c.openai_api_key = String::new();
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_timeout_fails() {
        let mut c = config();
        c.timeout_secs = 0;
        assert!(c.validate().is_err());
    }
}
