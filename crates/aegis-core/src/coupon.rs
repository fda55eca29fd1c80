//! # Coupon Engine
//!
//! Effective status, discount computation and redemption for coupons.
//!
//! ## Effective Status
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  effective_status(coupon, now)                                          │
//! │                                                                         │
//! │  stored status = inactive? ──yes──► INACTIVE  (admin intent wins)       │
//! │         │ no                                                            │
//! │  today > end_date?         ──yes──► EXPIRED                             │
//! │         │ no                                                            │
//! │  uses >= max_uses?         ──yes──► EXPIRED   (exhausted)               │
//! │         │ no                                                            │
//! │  today < start_date?       ──yes──► INACTIVE  (not started yet)         │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │       ACTIVE                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dates are calendar days compared against the UTC date of `now`; both
//! `start_date` and `end_date` are inclusive.
//!
//! ## Redemption
//! ```text
//! Checkout ──► check_redemption_scope ──► redeem ──► store.conditional_increment_use
//!                    │                       │                  │
//!                ScopeDenied          NotRedeemable        UseLimitReached
//!                                     BelowMinimumPurchase (lost race)
//! ```
//!
//! Everything here is pure. The `coupon` returned by [`redeem`] is what the
//! store should end up holding; the store applies the increment atomically.

use chrono::{DateTime, Utc};

use crate::access::Scope;
use crate::error::{RedemptionError, RedemptionResult};
use crate::money::{Money, Percent};
use crate::types::{Coupon, CouponStatus, DiscountType, EffectiveStatus, Purchase, Redemption};
use crate::validation::validate_purchase_amount;

/// Computes the status a coupon has at `now`.
///
/// Never mutates the coupon; the stored status is administrative intent and
/// `expired` is only ever derived.
pub fn effective_status(coupon: &Coupon, now: DateTime<Utc>) -> EffectiveStatus {
    if coupon.status == CouponStatus::Inactive {
        return EffectiveStatus::Inactive;
    }

    let today = now.date_naive();

    if matches!(coupon.end_date, Some(end) if today > end) {
        return EffectiveStatus::Expired;
    }

    if matches!(coupon.max_uses, Some(max) if coupon.current_uses >= max) {
        return EffectiveStatus::Expired;
    }

    if matches!(coupon.start_date, Some(start) if today < start) {
        return EffectiveStatus::Inactive;
    }

    EffectiveStatus::Active
}

/// Discount the coupon grants on `amount`, ignoring status and minimums.
///
/// - percentage: `amount × bps / 10000`, rounded half up to the cent
/// - fixed: `min(value, amount)`, so the total never goes negative
/// - both clamped to `max_discount_cents` when set
pub fn compute_discount(coupon: &Coupon, amount: Money) -> Money {
    let raw = match coupon.discount_type {
        DiscountType::Percentage => amount.percentage(Percent::from_bps(coupon.discount_value)),
        DiscountType::Fixed => Money::from_cents(coupon.discount_value).min(amount),
    };

    match coupon.max_discount() {
        Some(cap) => raw.min(cap),
        None => raw,
    }
}

/// Applies a coupon to a purchase amount.
///
/// ## Steps
/// 1. effective status must be active, else `NotRedeemable`
/// 2. amount must reach `min_purchase_cents`, else `BelowMinimumPurchase`
/// 3. discount from [`compute_discount`]
/// 4. returned coupon has `current_uses + 1`
///
/// One call is one redemption. Deduplicating retried purchases is the
/// caller's job.
///
/// ## Example
/// ```rust
/// use aegis_core::coupon::redeem;
/// use aegis_core::money::Money;
/// use aegis_core::types::{Coupon, DiscountType};
/// use chrono::Utc;
///
/// let coupon = Coupon::new("FIXED30", DiscountType::Fixed, 3000, "admin");
/// let result = redeem(&coupon, Money::from_major(20), Utc::now()).unwrap();
/// assert_eq!(result.discount, Money::from_major(20));
/// ```
pub fn redeem(
    coupon: &Coupon,
    purchase_amount: Money,
    now: DateTime<Utc>,
) -> RedemptionResult<Redemption> {
    validate_purchase_amount(purchase_amount.cents())?;

    let status = effective_status(coupon, now);
    if status != EffectiveStatus::Active {
        return Err(RedemptionError::NotRedeemable {
            code: coupon.code.clone(),
            status,
        });
    }

    if let Some(minimum) = coupon.min_purchase() {
        if purchase_amount < minimum {
            return Err(RedemptionError::BelowMinimumPurchase {
                minimum,
                amount: purchase_amount,
            });
        }
    }

    let discount = compute_discount(coupon, purchase_amount);

    let mut redeemed = coupon.clone();
    redeemed.current_uses += 1;
    redeemed.updated_at = now;

    Ok(Redemption {
        coupon: redeemed,
        discount,
    })
}

/// Applies a coupon to an itemised purchase.
///
/// Restricted coupons (non-empty product/category lists) must match at
/// least one product or category of the purchase.
pub fn redeem_purchase(
    coupon: &Coupon,
    purchase: &Purchase,
    now: DateTime<Utc>,
) -> RedemptionResult<Redemption> {
    if !applies_to(coupon, purchase) {
        return Err(RedemptionError::NotApplicable {
            code: coupon.code.clone(),
        });
    }
    redeem(coupon, purchase.amount, now)
}

/// Whether the coupon's product/category restrictions admit the purchase.
pub fn applies_to(coupon: &Coupon, purchase: &Purchase) -> bool {
    if !coupon.is_restricted() {
        return true;
    }

    let product_hit = purchase
        .product_ids
        .iter()
        .any(|p| coupon.applicable_products.contains(p));
    let category_hit = purchase
        .category_ids
        .iter()
        .any(|c| coupon.applicable_categories.contains(c));

    product_hit || category_hit
}

/// Checks that a coupon may be redeemed from `position`.
///
/// Tenant coupons only inside their tenant, company coupons only inside
/// their company, global coupons anywhere.
pub fn check_redemption_scope(coupon: &Coupon, position: &Scope) -> RedemptionResult<()> {
    if coupon.scope().is_visible_from(position) {
        Ok(())
    } else {
        Err(RedemptionError::ScopeDenied {
            code: coupon.code.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
