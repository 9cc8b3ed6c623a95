use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Catalog provider (Spotify-style) credentials and endpoints
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base_url: String,
    pub token_url: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub log_level: String,
    pub environment: String,
    /// Cash balance granted at registration
    pub starting_balance: Decimal,
    /// Per-transaction share cap
    pub max_shares_per_trade: i64,
    /// Interval between popularity refresh sweeps
    pub refresh_interval_secs: u64,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/anticip_db".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl CatalogConfig {
    /// Create catalog config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let client_id = env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| "SPOTIFY_CLIENT_ID environment variable is required")?;
        let client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| "SPOTIFY_CLIENT_SECRET environment variable is required")?;

        let api_base_url = env::var("CATALOG_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.spotify.com/v1".to_string());
        let token_url = env::var("CATALOG_TOKEN_URL")
            .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string());

        Ok(Self {
            client_id,
            client_secret,
            api_base_url,
            token_url,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let starting_balance = match env::var("STARTING_BALANCE") {
            Ok(s) => s
                .parse::<Decimal>()
                .map_err(|_| format!("Invalid STARTING_BALANCE: {}", s))?,
            Err(_) => Decimal::new(10_000, 0),
        };

        let max_shares_per_trade = env::var("MAX_SHARES_PER_TRADE")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(10_000);

        let refresh_interval_secs = env::var("POPULARITY_REFRESH_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(86_400); // daily

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        if starting_balance < Decimal::ZERO {
            return Err("STARTING_BALANCE must not be negative".to_string());
        }

        if max_shares_per_trade <= 0 {
            return Err("MAX_SHARES_PER_TRADE must be greater than 0".to_string());
        }

        Ok(Self {
            database,
            catalog,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
            starting_balance,
            max_shares_per_trade,
            refresh_interval_secs,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Get the refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            catalog: CatalogConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            starting_balance: Decimal::new(10_000, 0),
            max_shares_per_trade: 10_000,
            refresh_interval_secs: 86_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.starting_balance, Decimal::new(10_000, 0));
        assert_eq!(config.max_shares_per_trade, 10_000);
        assert!(config.is_development());
        assert!(!config.is_production());
    }
}
