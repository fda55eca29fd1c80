//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Service startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← from AdminConfig (AEGIS_DATABASE_PATH)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block writers and writers don't block readers. Usage
//! increments still serialize on SQLite's single writer.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::company::CompanyRepository;
use crate::repository::coupon::CouponRepository;
use crate::repository::notification::NotificationRepository;
use crate::repository::tenant::TenantRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/aegis/aegis.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the file at `path`.
    ///
    /// ## Arguments
    /// * `path` - SQLite database file; created on first connect if missing.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = DbConfig::new("./data/aegis.db");
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Upper bound on pooled connections. `AEGIS_DB_MAX_CONNECTIONS` feeds this.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Connections kept open while idle.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// How long `acquire` waits for a free connection before `PoolExhausted`.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Whether `Database::new` applies pending migrations. Turn off when
    /// the schema is managed elsewhere.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an isolated in-memory database configuration (for testing).
    ///
    /// Every pool built from it gets a fresh, empty schema; nothing is
    /// shared between tests.
    ///
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// True for configurations built by [`DbConfig::in_memory`].
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap: clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous
    ///    - Foreign keys enabled (company → tenant, coupon → scope)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Called by `new()` unless disabled.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// For advanced queries not covered by repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    pub fn tenants(&self) -> TenantRepository {
        TenantRepository::new(self.pool.clone())
    }

    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new(self.pool.clone())
    }

    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/aegis-test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
