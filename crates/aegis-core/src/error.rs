//! # Error Types
//!
//! Domain-specific error types for aegis-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  aegis-core errors (this file)                                         │
//! │  ├── ValidationError  - Field/invariant violations on create/edit      │
//! │  └── RedemptionError  - Why a coupon could not be applied              │
//! │                                                                         │
//! │  aegis-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  aegis-service errors                                                  │
//! │  ├── StoreError       - Store collaborator failures                    │
//! │  └── ServiceError     - What the dashboard sees ({code, message})      │
//! │                                                                         │
//! │  Flow: ValidationError → RedemptionError → ServiceError → Dashboard    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;
use crate::types::EffectiveStatus;

// =============================================================================
// Redemption Error
// =============================================================================

/// Reasons a coupon redemption is refused.
///
/// ## User Workflow
/// ```text
/// Checkout applies "SUMMER50" to a $50 basket
///      │
///      ▼
/// redeem() sees min purchase $100
///      │
///      ▼
/// BelowMinimumPurchase { minimum: $100.00, amount: $50.00 }
///      │
///      ▼
/// UI shows: "Purchase must be at least $100.00"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedemptionError {
    /// The coupon's effective status is not active at redemption time.
    #[error("Coupon {code} is not redeemable: {status}")]
    NotRedeemable { code: String, status: EffectiveStatus },

    /// The purchase is smaller than the coupon's minimum.
    #[error("Purchase of {amount} is below the minimum of {minimum}")]
    BelowMinimumPurchase { minimum: Money, amount: Money },

    /// The coupon is restricted to products/categories absent from the purchase.
    #[error("Coupon {code} does not apply to any item in this purchase")]
    NotApplicable { code: String },

    /// The usage cap was reached, typically by a concurrent redemption.
    #[error("Coupon {code} has reached its usage limit")]
    UseLimitReached { code: String },

    /// The coupon is scoped to another tenant or company.
    #[error("Coupon {code} cannot be used in this scope")]
    ScopeDenied { code: String },

    /// Redemption input was malformed.
    #[error("Invalid redemption: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so the dashboard can highlight
/// it next to the form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields contradict each other (e.g., start after end).
    #[error("{field} is inconsistent: {reason}")]
    Inconsistent { field: String, reason: String },

    /// Field cannot change after creation.
    #[error("{field} cannot be changed")]
    Immutable { field: String },
}

impl ValidationError {
    /// Returns the name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Inconsistent { field, .. }
            | ValidationError::Immutable { field } => field,
        }
    }
}

/// Convenience alias for redemption results.
pub type RedemptionResult<T> = Result<T, RedemptionError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redemption_error_messages() {
        let err = RedemptionError::BelowMinimumPurchase {
            minimum: Money::from_major(100),
            amount: Money::from_major(50),
        };
        assert_eq!(
            err.to_string(),
            "Purchase of $50.00 is below the minimum of $100.00"
        );

        let err = RedemptionError::NotRedeemable {
            code: "FIXED25".to_string(),
            status: EffectiveStatus::Expired,
        };
        assert_eq!(err.to_string(), "Coupon FIXED25 is not redeemable: expired");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::OutOfRange {
            field: "discount_value".to_string(),
            min: 1,
            max: 10000,
        };
        assert_eq!(err.field(), "discount_value");
        assert_eq!(err.to_string(), "discount_value must be between 1 and 10000");
    }

    #[test]
    fn test_validation_converts_to_redemption_error() {
        let err: RedemptionError = ValidationError::MustBePositive {
            field: "purchase_amount".to_string(),
        }
        .into();
        assert!(matches!(err, RedemptionError::Validation(_)));
    }
}
