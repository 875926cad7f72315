use crate::error::{EtlError, Result};

/// Process-level configuration for the ETL core.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub database_url: String,
    pub log_level: String,
    pub max_pool_connections: u32,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/etl_development".to_string(),
            log_level: "info".to_string(),
            max_pool_connections: 10,
        }
    }
}

impl EtlConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(level) = std::env::var("ETL_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(max_connections) = std::env::var("ETL_MAX_POOL_CONNECTIONS") {
            config.max_pool_connections =
                max_connections
                    .parse()
                    .map_err(|e| EtlError::Configuration {
                        message: format!("invalid max_pool_connections: {e}"),
                    })?;
        }

        Ok(config)
    }
}
