//! Database configuration (PostgreSQL)

use serde::Deserialize;

use super::error::ValidationError;

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::Invalid {
                field: "database.url",
                reason: "must be a postgres:// or postgresql:// URL".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ValidationError::Invalid {
                field: "database.max_connections",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_url_passes() {
        let config = DatabaseConfig {
            url: "postgresql://user@localhost/concierge".to_string(),
            max_connections: 5,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_postgres_url_fails() {
        let config = DatabaseConfig {
            url: "mysql://localhost/db".to_string(),
            max_connections: 5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_pool_size_fails() {
        let config = DatabaseConfig {
            url: "postgres://localhost/db".to_string(),
            max_connections: 0,
        };
        assert!(config.validate().is_err());
    }
}
