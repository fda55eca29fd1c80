//! # aegis-db: Database Layer for Aegis Admin
//!
//! SQLite storage for tenants, companies, coupons and notifications,
//! using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aegis Admin Data Flow                            │
//! │                                                                         │
//! │  CouponService::redeem (aegis-service)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     aegis-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ CouponRepo     │   │ 001_init.sql │   │   │
//! │  │   │ SqlitePool    │◄───│ TenantRepo     │   │ ...          │   │   │
//! │  │   │               │    │ CompanyRepo    │   │              │   │   │
//! │  │   │               │    │ NotificationRe │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (aegis.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aegis_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./aegis.db")).await?;
//!
//! let coupon = db.coupons().conditional_increment_use(&id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::company::CompanyRepository;
pub use repository::coupon::{CouponRepository, ScopeFilter};
pub use repository::notification::NotificationRepository;
pub use repository::tenant::TenantRepository;
