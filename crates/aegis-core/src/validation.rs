//! # Validation Module
//!
//! Field and invariant validation for Aegis Admin records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms                                              │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: aegis-service                                                │
//! │  ├── Deserialization into typed drafts/patches                         │
//! │  └── THIS MODULE: coupon invariants, field rules                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (uses ≤ max uses, value > 0)                    │
//! │  ├── UNIQUE (scope, code COLLATE NOCASE)                               │
//! │  └── Foreign keys (company → tenant)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coupon Invariants
//! 1. `discount_value > 0`
//! 2. percentage ⇒ `discount_value <= 10000` bps
//! 3. `start_date <= end_date`
//! 4. `0 <= current_uses <= max_uses`
//! 5. `company_id` requires `tenant_id`, and the company belongs to it

use crate::error::ValidationError;
use crate::money::FULL_PERCENT_BPS;
use crate::types::{Company, Coupon, DiscountType, NotificationDraft, Tenant};
use crate::{MAX_CODE_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Coupon Codes
// =============================================================================

/// Canonical form of a code for comparisons: trimmed and upper-cased.
///
/// Only ASCII letters are folded, the same as SQLite's `NOCASE`.
///
/// ```rust
/// use aegis_core::validation::normalize_code;
///
/// assert_eq!(normalize_code("  welcome20 "), "WELCOME20");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Case-insensitive code equality.
pub fn codes_match(a: &str, b: &str) -> bool {
    normalize_code(a) == normalize_code(b)
}

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - ASCII letters, digits, hyphens and underscores only
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only ASCII letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Coupon Invariants
// =============================================================================

/// Validates the discount type and value.
pub fn validate_discount(discount_type: DiscountType, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount_value".to_string(),
        });
    }

    if discount_type == DiscountType::Percentage && value > FULL_PERCENT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_value".to_string(),
            min: 1,
            max: FULL_PERCENT_BPS,
        });
    }

    Ok(())
}

/// Validates the date window.
pub fn validate_window(coupon: &Coupon) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (coupon.start_date, coupon.end_date) {
        if start > end {
            return Err(ValidationError::Inconsistent {
                field: "end_date".to_string(),
                reason: format!("ends {end} before it starts {start}"),
            });
        }
    }
    Ok(())
}

/// Validates usage counters.
pub fn validate_usage(coupon: &Coupon) -> ValidationResult<()> {
    if coupon.current_uses < 0 {
        return Err(ValidationError::OutOfRange {
            field: "current_uses".to_string(),
            min: 0,
            max: coupon.max_uses.unwrap_or(i64::MAX),
        });
    }

    if let Some(max) = coupon.max_uses {
        if max <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_uses".to_string(),
            });
        }
        if coupon.current_uses > max {
            return Err(ValidationError::Inconsistent {
                field: "max_uses".to_string(),
                reason: format!("already used {} times", coupon.current_uses),
            });
        }
    }

    Ok(())
}

/// Validates the tenant/company scope.
///
/// ## Arguments
/// * `company_tenant` - Owning tenant of `coupon.company_id`, resolved by the
///   caller. `None` when the company does not exist.
pub fn validate_scope(coupon: &Coupon, company_tenant: Option<&str>) -> ValidationResult<()> {
    let Some(company_id) = coupon.company_id.as_deref() else {
        return Ok(());
    };

    let Some(tenant_id) = coupon.tenant_id.as_deref() else {
        return Err(ValidationError::Required {
            field: "tenant_id".to_string(),
        });
    };

    match company_tenant {
        Some(owner) if owner == tenant_id => Ok(()),
        Some(owner) => Err(ValidationError::Inconsistent {
            field: "company_id".to_string(),
            reason: format!("company {company_id} belongs to tenant {owner}, not {tenant_id}"),
        }),
        None => Err(ValidationError::InvalidFormat {
            field: "company_id".to_string(),
            reason: format!("company {company_id} does not exist"),
        }),
    }
}

/// Validates optional money limits and the description.
fn validate_coupon_fields(coupon: &Coupon) -> ValidationResult<()> {
    validate_optional_text("description", coupon.description.as_deref(), MAX_DESCRIPTION_LEN)?;

    if matches!(coupon.min_purchase_cents, Some(v) if v <= 0) {
        return Err(ValidationError::MustBePositive {
            field: "min_purchase_cents".to_string(),
        });
    }
    if matches!(coupon.max_discount_cents, Some(v) if v <= 0) {
        return Err(ValidationError::MustBePositive {
            field: "max_discount_cents".to_string(),
        });
    }

    Ok(())
}

/// Validates a full coupon record against every stored invariant.
///
/// ## Example
/// ```rust
/// use aegis_core::types::{Coupon, DiscountType};
/// use aegis_core::validation::validate_coupon;
///
/// let ok = Coupon::new("SUMMER50", DiscountType::Percentage, 5000, "admin");
/// assert!(validate_coupon(&ok, None).is_ok());
///
/// let too_much = Coupon::new("HUGE", DiscountType::Percentage, 15000, "admin");
/// assert!(validate_coupon(&too_much, None).is_err());
/// ```
pub fn validate_coupon(coupon: &Coupon, company_tenant: Option<&str>) -> ValidationResult<()> {
    validate_code(&coupon.code)?;
    validate_discount(coupon.discount_type, coupon.discount_value)?;
    validate_window(coupon)?;
    validate_usage(coupon)?;
    validate_scope(coupon, company_tenant)?;
    validate_coupon_fields(coupon)?;
    Ok(())
}

/// Validates an administrative edit of an existing coupon.
///
/// On top of [`validate_coupon`], the edit must keep identity and audit
/// fields and must not lower the usage counter.
pub fn validate_coupon_edit(
    before: &Coupon,
    after: &Coupon,
    company_tenant: Option<&str>,
) -> ValidationResult<()> {
    if before.id != after.id {
        return Err(ValidationError::Immutable {
            field: "id".to_string(),
        });
    }
    if before.created_at != after.created_at {
        return Err(ValidationError::Immutable {
            field: "created_at".to_string(),
        });
    }
    if before.created_by != after.created_by {
        return Err(ValidationError::Immutable {
            field: "created_by".to_string(),
        });
    }
    if after.current_uses < before.current_uses {
        return Err(ValidationError::Inconsistent {
            field: "current_uses".to_string(),
            reason: format!("cannot decrease from {}", before.current_uses),
        });
    }

    validate_coupon(after, company_tenant)
}

/// Validates a purchase amount handed to redemption.
pub fn validate_purchase_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "purchase_amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Directory & Notifications
// =============================================================================

/// Validates a required display name (tenant, company, notification title).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

fn validate_optional_text(field: &str, text: Option<&str>, max: usize) -> ValidationResult<()> {
    if let Some(text) = text {
        if text.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(())
}

pub fn validate_tenant(tenant: &Tenant) -> ValidationResult<()> {
    validate_name("name", &tenant.name)?;
    validate_optional_text("description", tenant.description.as_deref(), MAX_DESCRIPTION_LEN)?;

    if tenant.data_quota_gb <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "data_quota_gb".to_string(),
        });
    }

    Ok(())
}

pub fn validate_company(company: &Company) -> ValidationResult<()> {
    validate_uuid_field("tenant_id", &company.tenant_id)?;
    validate_name("name", &company.name)?;
    validate_optional_text("description", company.description.as_deref(), MAX_DESCRIPTION_LEN)?;
    validate_optional_text("address", company.address.as_deref(), MAX_DESCRIPTION_LEN)?;
    validate_optional_text("industry", company.industry.as_deref(), MAX_NAME_LEN)?;

    if let Some(website) = company.website.as_deref() {
        if !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(ValidationError::InvalidFormat {
                field: "website".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_notification(draft: &NotificationDraft) -> ValidationResult<()> {
    if draft.user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }
    validate_name("title", &draft.title)?;
    if draft.message.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "message".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use aegis_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_uuid_field("id", id)
}

fn validate_uuid_field(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompanyDraft, TenantDraft};
    use chrono::{NaiveDate, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn coupon() -> Coupon {
        Coupon::new("WELCOME20", DiscountType::Percentage, 2000, "admin")
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("WELCOME20").is_ok());
        assert!(validate_code("summer_50-x").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("HAS SPACE").is_err());
        assert!(validate_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_code_rejects_non_ascii() {
        let err = validate_code("CAFÉ").unwrap_err();
        assert_eq!(err.field(), "code");
        assert!(validate_code("straße").is_err());
        assert!(validate_code("ＷＥＬＣＯＭＥ").is_err());

        // Folding never widens beyond ASCII.
        assert!(!codes_match("ß", "SS"));
        assert_eq!(normalize_code("café"), "CAFé");
    }

    #[test]
    fn test_codes_match_case_insensitive() {
        assert!(codes_match("welcome20", "WELCOME20"));
        assert!(codes_match(" Welcome20", "welcome20 "));
        assert!(!codes_match("WELCOME20", "WELCOME21"));
    }

    #[test]
    fn test_discount_invariants() {
        assert!(validate_discount(DiscountType::Percentage, 10000).is_ok());
        assert!(validate_discount(DiscountType::Fixed, 50_000).is_ok());

        assert!(matches!(
            validate_discount(DiscountType::Fixed, 0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_discount(DiscountType::Percentage, 10001),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_window_invariant() {
        let ok = coupon().with_window(Some(date(2023, 5, 1)), Some(date(2023, 5, 1)));
        assert!(validate_coupon(&ok, None).is_ok());

        let bad = coupon().with_window(Some(date(2023, 12, 31)), Some(date(2023, 5, 1)));
        let err = validate_coupon(&bad, None).unwrap_err();
        assert_eq!(err.field(), "end_date");
    }

    #[test]
    fn test_usage_invariant() {
        let mut c = coupon().with_max_uses(1);
        c.current_uses = 1;
        assert!(validate_coupon(&c, None).is_ok());

        c.current_uses = 2;
        assert_eq!(validate_coupon(&c, None).unwrap_err().field(), "max_uses");

        let zero_cap = coupon().with_max_uses(0);
        assert!(validate_coupon(&zero_cap, None).is_err());
    }

    #[test]
    fn test_scope_invariant() {
        let company_only = coupon().with_scope(None, Some("c1"));
        assert_eq!(
            validate_coupon(&company_only, Some("t1")).unwrap_err().field(),
            "tenant_id"
        );

        let matched = coupon().with_scope(Some("t1"), Some("c1"));
        assert!(validate_coupon(&matched, Some("t1")).is_ok());

        let mismatched = coupon().with_scope(Some("t2"), Some("c1"));
        assert_eq!(
            validate_coupon(&mismatched, Some("t1")).unwrap_err().field(),
            "company_id"
        );

        let missing_company = coupon().with_scope(Some("t1"), Some("ghost"));
        assert!(validate_coupon(&missing_company, None).is_err());

        let tenant_only = coupon().with_scope(Some("t1"), None);
        assert!(validate_coupon(&tenant_only, None).is_ok());
    }

    #[test]
    fn test_money_limits_must_be_positive() {
        let mut c = coupon();
        c.min_purchase_cents = Some(0);
        assert_eq!(validate_coupon(&c, None).unwrap_err().field(), "min_purchase_cents");

        let mut c = coupon();
        c.max_discount_cents = Some(-5);
        assert_eq!(validate_coupon(&c, None).unwrap_err().field(), "max_discount_cents");
    }

    #[test]
    fn test_edit_cannot_lower_uses_or_touch_identity() {
        let mut before = coupon().with_max_uses(10);
        before.current_uses = 4;

        let mut lowered = before.clone();
        lowered.current_uses = 3;
        assert_eq!(
            validate_coupon_edit(&before, &lowered, None).unwrap_err().field(),
            "current_uses"
        );

        let mut renamed_creator = before.clone();
        renamed_creator.created_by = "someone-else".to_string();
        assert!(matches!(
            validate_coupon_edit(&before, &renamed_creator, None),
            Err(ValidationError::Immutable { .. })
        ));

        let mut raised = before.clone();
        raised.current_uses = 5;
        assert!(validate_coupon_edit(&before, &raised, None).is_ok());
    }

    #[test]
    fn test_validate_tenant_and_company() {
        let now = Utc::now();
        let tenant = TenantDraft {
            name: "Acme Corporation".to_string(),
            description: None,
            data_quota_gb: 500,
        }
        .into_tenant(now);
        assert!(validate_tenant(&tenant).is_ok());

        let mut no_quota = tenant.clone();
        no_quota.data_quota_gb = 0;
        assert!(validate_tenant(&no_quota).is_err());

        let company = CompanyDraft {
            tenant_id: tenant.id.clone(),
            name: "Tech Solutions Inc".to_string(),
            website: Some("https://tech.example.com".to_string()),
            ..Default::default()
        }
        .into_company(now);
        assert!(validate_company(&company).is_ok());

        let mut bad_site = company.clone();
        bad_site.website = Some("tech.example.com".to_string());
        assert_eq!(validate_company(&bad_site).unwrap_err().field(), "website");
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
