//! Storefront backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Storefront backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CommerceConfig {
    /// Base URL of the storefront REST API
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl CommerceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate commerce configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("commerce.base_url"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::Invalid {
                field: "commerce.base_url",
                reason: "must be an http(s) URL".to_string(),
            });
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    15
}
