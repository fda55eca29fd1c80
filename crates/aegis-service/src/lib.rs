//! # aegis-service
//!
//! Guarded operations over coupons, tenants, companies and notifications.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard                                                             │
//! │     │ bearer token                                                      │
//! │     ▼                                                                   │
//! │  IdentityProvider::authenticate ──► Principal                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  CouponService::redeem(&principal, id, request, now)                   │
//! │     ├── can_perform(principal, Redeem, coupon)   (aegis-core)          │
//! │     ├── check_redemption_scope                   (aegis-core)          │
//! │     ├── redeem_purchase                          (aegis-core)          │
//! │     └── CouponStore::conditional_increment_use   (aegis-db / memory)   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Result<Redemption, ServiceError> → ErrorPayload { code, message }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no process-wide session: every call takes the caller's
//! [`Principal`](aegis_core::Principal) explicitly.

pub mod auth;
pub mod config;
pub mod coupon_service;
pub mod directory_service;
pub mod error;
mod guard;
pub mod memory;
pub mod notification_service;
pub mod store;
pub mod telemetry;

pub use auth::{Credentials, IdentityProvider, JwtIdentityProvider, Session};
pub use config::{AdminConfig, ConfigError};
pub use coupon_service::{CouponService, RedemptionRequest};
pub use directory_service::DirectoryService;
pub use error::{ErrorCode, ErrorPayload, ServiceError, ServiceResult};
pub use memory::InMemoryStore;
pub use notification_service::NotificationService;
pub use store::{
    CouponStore, DirectoryStore, DynCouponStore, DynDirectoryStore, DynNotificationStore,
    NotificationStore, ScopeFilter, StoreError, StoreResult,
};
