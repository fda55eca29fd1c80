//! Aegis Admin configuration.
//!
//! Loaded from environment variables with fallback to development defaults.
//!
//! | variable                   | default                 |
//! |----------------------------|-------------------------|
//! | `AEGIS_DATABASE_PATH`      | `./aegis.db`            |
//! | `AEGIS_DB_MAX_CONNECTIONS` | `5`                     |
//! | `AEGIS_JWT_SECRET`         | development secret      |
//! | `AEGIS_JWT_LIFETIME_SECS`  | `3600`                  |
//! | `AEGIS_LOG`                | `info`                  |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use aegis_db::DbConfig;

const DEV_JWT_SECRET: &str = "aegis-admin-dev-secret-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 signing key for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// `tracing` filter directive, e.g. `info,aegis_db=debug`
    pub log_filter: String,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `load` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AdminConfig {
            database_path: lookup("AEGIS_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./aegis.db")),

            db_max_connections: parse(&lookup, "AEGIS_DB_MAX_CONNECTIONS", "5")?,

            // In production, this MUST be set via environment variable
            jwt_secret: lookup("AEGIS_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: parse(&lookup, "AEGIS_JWT_LIFETIME_SECS", "3600")?,

            log_filter: lookup("AEGIS_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AEGIS_DB_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "AEGIS_JWT_LIFETIME_SECS".to_string(),
                value: config.jwt_lifetime_secs.to_string(),
            });
        }
        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("AEGIS_JWT_SECRET".to_string()));
        }

        Ok(config)
    }

    /// Pool settings for [`aegis_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
    })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.database_path, PathBuf::from("./aegis.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 3600);
        assert_eq!(config.log_filter, "info");
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_overrides() {
        let config = AdminConfig::from_lookup(lookup(&[
            ("AEGIS_DATABASE_PATH", "/var/lib/aegis/admin.db"),
            ("AEGIS_DB_MAX_CONNECTIONS", "12"),
            ("AEGIS_JWT_SECRET", "s3cret"),
            ("AEGIS_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.db_max_connections, 12);
        assert!(!config.uses_dev_secret());

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert_eq!(db.database_path, PathBuf::from("/var/lib/aegis/admin.db"));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let err = AdminConfig::from_lookup(lookup(&[("AEGIS_JWT_LIFETIME_SECS", "an hour")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "AEGIS_JWT_LIFETIME_SECS"));

        let err = AdminConfig::from_lookup(lookup(&[("AEGIS_DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = AdminConfig::from_lookup(lookup(&[("AEGIS_JWT_SECRET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
