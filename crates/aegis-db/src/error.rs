//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (aegis-service) ← What services reason about               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError → ErrorPayload { code, message } for the dashboard       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Coupon code already used in the same scope (any letter case)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Company referencing a missing tenant
    /// - Deleting a tenant that still owns companies
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (usage above the cap, bad enum text, ...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// The guarded increment found the coupon already at `max_uses`.
    #[error("Coupon {id} has reached its usage limit")]
    UseLimitReached { id: String },

    /// A compare-and-set write found the row changed since it was read.
    #[error("{entity} {id} changed since it was read")]
    Stale { entity: String, id: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A JSON column could not be encoded or decoded.
    #[error("Invalid JSON in column {column}: {message}")]
    Json { column: String, message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn json(column: impl Into<String>, err: serde_json::Error) -> Self {
        DbError::Json {
            column: column.into(),
            message: err.to_string(),
        }
    }

    /// True for failures of the storage backend itself, as opposed to
    /// answers about the data (missing row, constraint hit).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::MigrationFailed(_)
                | DbError::QueryFailed(_)
                | DbError::PoolExhausted
                | DbError::Internal(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraints as:
                //   "UNIQUE constraint failed: <table>.<column>" or "... index '<name>'"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
