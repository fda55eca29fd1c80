//! # aegis-core: Pure Business Logic for Aegis Admin
//!
//! This crate holds the rules of the admin backend as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aegis Admin Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (presentation)                     │   │
//! │  │    Tenants ──► Companies ──► Coupons ──► Notifications          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    aegis-service                                │   │
//! │  │    CouponService, DirectoryService, NotificationService         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ aegis-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  coupon   │  │  access   │  │   │
//! │  │   │  Coupon   │  │   Money   │  │  status   │  │  policy   │  │   │
//! │  │   │  Tenant   │  │ Percent   │  │  redeem   │  │ Principal │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    aegis-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Coupon, Tenant, Company, Notification)
//! - [`money`] - Integer money and basis-point percentages
//! - [`coupon`] - Effective status, redemption, scope checks
//! - [`access`] - Role based access policy
//! - [`validation`] - Field and invariant validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use aegis_core::coupon::{effective_status, redeem};
//! use aegis_core::money::Money;
//! use aegis_core::types::{Coupon, DiscountType, EffectiveStatus};
//! use chrono::Utc;
//!
//! let coupon = Coupon::new("WELCOME20", DiscountType::Percentage, 2000, "admin");
//! let now = Utc::now();
//!
//! assert_eq!(effective_status(&coupon, now), EffectiveStatus::Active);
//!
//! let redemption = redeem(&coupon, Money::from_major(100), now).unwrap();
//! assert_eq!(redemption.discount, Money::from_major(20));
//! assert_eq!(redemption.coupon.current_uses, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod coupon;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{can_perform, Action, Principal, Resource, ResourceKind, Role, Scope};
pub use error::{RedemptionError, ValidationError};
pub use money::{Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a coupon code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of entity names (tenants, companies, notification titles).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 500;
