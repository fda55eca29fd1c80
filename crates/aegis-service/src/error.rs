//! # Service Errors
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ──► RedemptionError ──┐                               │
//! │                                        ├──► ServiceError ──► Payload   │
//! │  sqlx::Error ──► DbError ──► StoreError┘                               │
//! │                                                                         │
//! │  Dashboard receives:                                                   │
//! │  { "code": "BELOW_MINIMUM_PURCHASE",                                   │
//! │    "message": "Purchase of $50.00 is below the minimum of $100.00" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use aegis_core::money::Money;
use aegis_core::{EffectiveStatus, RedemptionError, ValidationError};

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A field or invariant is violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Coupon {code} is not redeemable: {status}")]
    NotRedeemable { code: String, status: EffectiveStatus },

    #[error("Purchase of {amount} is below the minimum of {minimum}")]
    BelowMinimumPurchase { minimum: Money, amount: Money },

    #[error("Coupon {code} does not apply to any item in this purchase")]
    NotApplicable { code: String },

    /// Lost the race for the last use at the store.
    #[error("Coupon {code} has reached its usage limit")]
    UseLimitReached { code: String },

    /// The access policy refused the call, or the coupon is out of scope.
    #[error("Access denied: {reason}")]
    ScopeDenied { reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// The store failed; the only retryable class.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        ServiceError::ScopeDenied {
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same call. The services never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::StoreUnavailable(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Validation(_) => ErrorCode::ValidationError,
            ServiceError::NotRedeemable { .. } => ErrorCode::NotRedeemable,
            ServiceError::BelowMinimumPurchase { .. } => ErrorCode::BelowMinimumPurchase,
            ServiceError::NotApplicable { .. } => ErrorCode::NotApplicable,
            ServiceError::UseLimitReached { .. } => ErrorCode::UseLimitReached,
            ServiceError::ScopeDenied { .. } => ErrorCode::ScopeDenied,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Conflict(_) => ErrorCode::Conflict,
            ServiceError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            ServiceError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            ServiceError::Config(_) => ErrorCode::ConfigError,
        }
    }
}

impl From<RedemptionError> for ServiceError {
    fn from(err: RedemptionError) -> Self {
        match err {
            RedemptionError::NotRedeemable { code, status } => {
                ServiceError::NotRedeemable { code, status }
            }
            RedemptionError::BelowMinimumPurchase { minimum, amount } => {
                ServiceError::BelowMinimumPurchase { minimum, amount }
            }
            RedemptionError::NotApplicable { code } => ServiceError::NotApplicable { code },
            RedemptionError::UseLimitReached { code } => ServiceError::UseLimitReached { code },
            RedemptionError::ScopeDenied { code } => ServiceError::ScopeDenied {
                reason: format!("coupon {code} cannot be used in this scope"),
            },
            RedemptionError::Validation(e) => ServiceError::Validation(e),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            // Only `redeem` knows the coupon's code, and it maps this itself.
            StoreError::UseLimitReached { id } => {
                ServiceError::Conflict(format!("coupon {id} has reached its usage limit"))
            }
            StoreError::Stale { entity, id } => ServiceError::Conflict(format!(
                "{entity} {id} changed while it was being edited; reload and retry"
            )),
            StoreError::Duplicate { field, value } => {
                ServiceError::Conflict(format!("{field} '{value}' already exists"))
            }
            StoreError::Rejected { reason } => ServiceError::Conflict(reason),
            StoreError::Unavailable(e) => {
                tracing::error!(error = %e, "Store unavailable");
                ServiceError::StoreUnavailable(e)
            }
        }
    }
}

// =============================================================================
// Presentation Payload
// =============================================================================

/// Machine-readable error codes for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotRedeemable,
    BelowMinimumPurchase,
    NotApplicable,
    UseLimitReached,
    ScopeDenied,
    NotFound,
    Conflict,
    Unauthenticated,
    StoreUnavailable,
    ConfigError,
}

/// What the dashboard receives when a call fails.
///
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "discount_value must be positive", "field": "discount_value", "retryable": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    /// Offending form field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub retryable: bool,
}

impl From<&ServiceError> for ErrorPayload {
    fn from(err: &ServiceError) -> Self {
        let field = match err {
            ServiceError::Validation(v) => Some(v.field().to_string()),
            _ => None,
        };

        ErrorPayload {
            code: err.code(),
            message: err.to_string(),
            field,
            retryable: err.is_retryable(),
        }
    }
}

impl From<ServiceError> for ErrorPayload {
    fn from(err: ServiceError) -> Self {
        ErrorPayload::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_unavailable_is_retryable() {
        assert!(ServiceError::StoreUnavailable("pool closed".into()).is_retryable());
        assert!(!ServiceError::UseLimitReached { code: "X".into() }.is_retryable());
        assert!(!ServiceError::denied("nope").is_retryable());
        assert!(!ServiceError::not_found("Coupon", "c1").is_retryable());
    }

    #[test]
    fn test_payload_serialization() {
        let err = ServiceError::Validation(ValidationError::MustBePositive {
            field: "discount_value".into(),
        });
        let json = serde_json::to_value(ErrorPayload::from(&err)).unwrap();

        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "discount_value must be positive");
        assert_eq!(json["field"], "discount_value");
        assert_eq!(json["retryable"], false);
    }

    #[test]
    fn test_payload_omits_field_for_non_validation() {
        let payload = ErrorPayload::from(ServiceError::StoreUnavailable("disk".into()));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["code"], "STORE_UNAVAILABLE");
        assert_eq!(json["retryable"], true);
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_redemption_errors_convert() {
        let err: ServiceError = RedemptionError::BelowMinimumPurchase {
            minimum: Money::from_major(100),
            amount: Money::from_major(50),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::BelowMinimumPurchase);
        assert_eq!(
            err.to_string(),
            "Purchase of $50.00 is below the minimum of $100.00"
        );

        let err: ServiceError = RedemptionError::ScopeDenied { code: "ACME".into() }.into();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
    }

    #[test]
    fn test_store_errors_convert() {
        let err: ServiceError = StoreError::Duplicate {
            field: "code".into(),
            value: "WELCOME20".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err: ServiceError = StoreError::UseLimitReached {
            id: "6f1c2a".into(),
        }
        .into();
        assert!(!matches!(err, ServiceError::UseLimitReached { .. }));
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err: ServiceError = StoreError::Stale {
            entity: "Coupon".into(),
            id: "6f1c2a".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err: ServiceError = StoreError::Unavailable("pool timed out".into()).into();
        assert!(err.is_retryable());
    }
}
