//! # Domain Types
//!
//! Core domain records used throughout Aegis Admin.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Tenant      │ 1 │    Company      │   │     Coupon      │       │
//! │  │  ─────────────  │──►│  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │ * │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  tenant_id (FK) │   │  code           │       │
//! │  │  data_quota_gb  │   │  name, size     │   │  discount       │       │
//! │  └─────────────────┘   └─────────────────┘   │  tenant_id?     │       │
//! │                                              │  company_id?    │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   └─────────────────┘       │
//! │  │  CouponStatus   │   │ EffectiveStatus │                             │
//! │  │  (stored)       │   │  (computed)     │   ┌─────────────────┐       │
//! │  │  Active         │   │  Active         │   │  Notification   │       │
//! │  │  Inactive       │   │  Inactive       │   │  user_id, read  │       │
//! │  └─────────────────┘   │  Expired        │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored vs Effective Status
//! `CouponStatus` is what an administrator chose. `EffectiveStatus` is what
//! the clock and usage counters say right now. Only the former is persisted,
//! so `CouponStatus` deliberately has no `Expired` variant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::access::Scope;
use crate::money::{Money, Percent};

/// Distinguishes an explicit `null` (clear the field) from an absent key
/// (leave it alone) in patch payloads.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Generates a new entity identifier (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Coupon Enums
// =============================================================================

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is basis points of the purchase (2000 = 20%).
    Percentage,
    /// `discount_value` is an amount in cents.
    Fixed,
}

/// Administrator-chosen coupon status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    #[default]
    Active,
    Inactive,
}

/// Status derived from stored status, the clock, and usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Active,
    /// Deactivated by an administrator, or not started yet.
    Inactive,
    /// Past its end date or out of uses.
    Expired,
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectiveStatus::Active => "active",
            EffectiveStatus::Inactive => "inactive",
            EffectiveStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount grant.
///
/// ## Scope
/// - neither `tenant_id` nor `company_id`: global coupon
/// - `tenant_id` only: usable anywhere inside that tenant
/// - both: usable only inside that company (which must belong to the tenant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// Unique identifier (UUID v4), immutable.
    pub id: String,

    /// Redemption code, unique per scope, compared case-insensitively.
    pub code: String,

    pub description: Option<String>,

    pub discount_type: DiscountType,

    /// Basis points for percentage coupons, cents for fixed coupons.
    pub discount_value: i64,

    /// First valid day (inclusive).
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,

    /// Last valid day (inclusive).
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,

    /// Usage ceiling; `None` means unlimited.
    pub max_uses: Option<i64>,

    pub current_uses: i64,

    pub status: CouponStatus,

    pub tenant_id: Option<String>,

    pub company_id: Option<String>,

    /// Smallest purchase the coupon applies to, in cents.
    pub min_purchase_cents: Option<i64>,

    /// Upper bound on the discount granted, in cents.
    pub max_discount_cents: Option<i64>,

    /// When non-empty, the purchase must contain one of these products
    /// or one of `applicable_categories`.
    pub applicable_products: Vec<String>,

    pub applicable_categories: Vec<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Principal id of the creator, immutable.
    pub created_by: String,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Creates an active, global, unlimited coupon with zero uses.
    ///
    /// ```rust
    /// use aegis_core::types::{Coupon, CouponStatus, DiscountType};
    ///
    /// let coupon = Coupon::new("FIXED25", DiscountType::Fixed, 2500, "admin");
    /// assert_eq!(coupon.current_uses, 0);
    /// assert_eq!(coupon.status, CouponStatus::Active);
    /// assert!(coupon.scope().is_global());
    /// ```
    pub fn new(
        code: impl Into<String>,
        discount_type: DiscountType,
        discount_value: i64,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Coupon {
            id: new_id(),
            code: code.into(),
            description: None,
            discount_type,
            discount_value,
            start_date: None,
            end_date: None,
            max_uses: None,
            current_uses: 0,
            status: CouponStatus::Active,
            tenant_id: None,
            company_id: None,
            min_purchase_cents: None,
            max_discount_cents: None,
            applicable_products: Vec::new(),
            applicable_categories: Vec::new(),
            created_at: now,
            created_by: created_by.into(),
            updated_at: now,
        }
    }

    /// Restricts the coupon to a tenant and optionally one of its companies.
    pub fn with_scope(mut self, tenant_id: Option<&str>, company_id: Option<&str>) -> Self {
        self.tenant_id = tenant_id.map(str::to_string);
        self.company_id = company_id.map(str::to_string);
        self
    }

    /// Sets the validity window.
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_max_uses(mut self, max_uses: i64) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    pub fn with_min_purchase(mut self, minimum: Money) -> Self {
        self.min_purchase_cents = Some(minimum.cents());
        self
    }

    pub fn with_max_discount(mut self, maximum: Money) -> Self {
        self.max_discount_cents = Some(maximum.cents());
        self
    }

    pub fn with_status(mut self, status: CouponStatus) -> Self {
        self.status = status;
        self
    }

    /// The tenant/company scope of this coupon.
    pub fn scope(&self) -> Scope {
        Scope {
            tenant_id: self.tenant_id.clone(),
            company_id: self.company_id.clone(),
        }
    }

    /// Minimum purchase as Money.
    pub fn min_purchase(&self) -> Option<Money> {
        self.min_purchase_cents.map(Money::from_cents)
    }

    /// Discount cap as Money.
    pub fn max_discount(&self) -> Option<Money> {
        self.max_discount_cents.map(Money::from_cents)
    }

    /// The percentage granted, for percentage coupons.
    pub fn percent(&self) -> Option<Percent> {
        match self.discount_type {
            DiscountType::Percentage => Some(Percent::from_bps(self.discount_value)),
            DiscountType::Fixed => None,
        }
    }

    /// Whether product/category restrictions are configured.
    pub fn is_restricted(&self) -> bool {
        !self.applicable_products.is_empty() || !self.applicable_categories.is_empty()
    }

    /// Remaining uses, `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<i64> {
        self.max_uses.map(|max| (max - self.current_uses).max(0))
    }
}

/// Input for creating a coupon.
///
/// Server-controlled fields (`id`, `current_uses`, `status`, audit fields)
/// are not part of the draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponDraft {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: i64,
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    pub max_uses: Option<i64>,
    pub tenant_id: Option<String>,
    pub company_id: Option<String>,
    pub min_purchase_cents: Option<i64>,
    pub max_discount_cents: Option<i64>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
}

impl CouponDraft {
    /// Builds the stored record: zero uses, active, stamped with the creator.
    ///
    /// A draft without `discount_type` defaults to percentage, matching the
    /// dashboard's form default.
    pub fn into_coupon(self, created_by: &str, now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: new_id(),
            code: self.code.trim().to_string(),
            description: self.description,
            discount_type: self.discount_type.unwrap_or(DiscountType::Percentage),
            discount_value: self.discount_value,
            start_date: self.start_date,
            end_date: self.end_date,
            max_uses: self.max_uses,
            current_uses: 0,
            status: CouponStatus::Active,
            tenant_id: self.tenant_id,
            company_id: self.company_id,
            min_purchase_cents: self.min_purchase_cents,
            max_discount_cents: self.max_discount_cents,
            applicable_products: self.applicable_products,
            applicable_categories: self.applicable_categories,
            created_at: now,
            created_by: created_by.to_string(),
            updated_at: now,
        }
    }
}

/// Partial update of a coupon by an administrator.
///
/// `None` leaves a field untouched. For nullable fields, `Some(None)`
/// clears the value. `id`, `created_at` and `created_by` have no entry,
/// so they cannot be edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouponPatch {
    pub code: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    #[serde(deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub max_uses: Option<Option<i64>>,
    pub current_uses: Option<i64>,
    pub status: Option<CouponStatus>,
    #[serde(deserialize_with = "double_option")]
    pub tenant_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub company_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub min_purchase_cents: Option<Option<i64>>,
    #[serde(deserialize_with = "double_option")]
    pub max_discount_cents: Option<Option<i64>>,
    pub applicable_products: Option<Vec<String>>,
    pub applicable_categories: Option<Vec<String>>,
}

impl CouponPatch {
    /// Returns a copy of `coupon` with this patch applied.
    pub fn apply(&self, coupon: &Coupon, now: DateTime<Utc>) -> Coupon {
        let mut next = coupon.clone();
        if let Some(code) = &self.code {
            next.code = code.trim().to_string();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(discount_type) = self.discount_type {
            next.discount_type = discount_type;
        }
        if let Some(value) = self.discount_value {
            next.discount_value = value;
        }
        if let Some(start) = self.start_date {
            next.start_date = start;
        }
        if let Some(end) = self.end_date {
            next.end_date = end;
        }
        if let Some(max_uses) = self.max_uses {
            next.max_uses = max_uses;
        }
        if let Some(uses) = self.current_uses {
            next.current_uses = uses;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(tenant_id) = &self.tenant_id {
            next.tenant_id = tenant_id.clone();
        }
        if let Some(company_id) = &self.company_id {
            next.company_id = company_id.clone();
        }
        if let Some(min) = self.min_purchase_cents {
            next.min_purchase_cents = min;
        }
        if let Some(max) = self.max_discount_cents {
            next.max_discount_cents = max;
        }
        if let Some(products) = &self.applicable_products {
            next.applicable_products = products.clone();
        }
        if let Some(categories) = &self.applicable_categories {
            next.applicable_categories = categories.clone();
        }
        next.updated_at = now;
        next
    }

    /// True when the patch moves the coupon to another scope.
    pub fn changes_scope(&self) -> bool {
        self.tenant_id.is_some() || self.company_id.is_some()
    }
}

/// A purchase a coupon is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchase {
    pub amount: Money,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

impl Purchase {
    /// A purchase with no item detail.
    pub fn of_amount(amount: Money) -> Self {
        Purchase {
            amount,
            product_ids: Vec::new(),
            category_ids: Vec::new(),
        }
    }
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Redemption {
    /// The coupon after `current_uses` was incremented.
    pub coupon: Coupon,
    /// Discount granted for this purchase.
    pub discount: Money,
}

// =============================================================================
// Tenant & Company
// =============================================================================

/// Active/inactive flag shared by tenants and companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

/// A customer organisation; owns companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Storage quota in gigabytes.
    pub data_quota_gb: i64,
    pub status: RecordStatus,
    /// Number of companies owned, filled in by the store on read.
    pub companies_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenantDraft {
    pub name: String,
    pub description: Option<String>,
    pub data_quota_gb: i64,
}

impl TenantDraft {
    pub fn into_tenant(self, now: DateTime<Utc>) -> Tenant {
        Tenant {
            id: new_id(),
            name: self.name.trim().to_string(),
            description: self.description,
            data_quota_gb: self.data_quota_gb,
            status: RecordStatus::Active,
            companies_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub data_quota_gb: Option<i64>,
    pub status: Option<RecordStatus>,
}

impl TenantPatch {
    pub fn apply(&self, tenant: &Tenant, now: DateTime<Utc>) -> Tenant {
        let mut next = tenant.clone();
        if let Some(name) = &self.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(quota) = self.data_quota_gb {
            next.data_quota_gb = quota;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        next.updated_at = now;
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
}

/// A company; belongs to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub industry: Option<String>,
    pub size: Option<CompanySize>,
    pub website: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn scope(&self) -> Scope {
        Scope::company(&self.tenant_id, &self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyDraft {
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub size: Option<CompanySize>,
    pub website: Option<String>,
    pub address: Option<String>,
}

impl CompanyDraft {
    pub fn into_company(self, now: DateTime<Utc>) -> Company {
        Company {
            id: new_id(),
            tenant_id: self.tenant_id,
            name: self.name.trim().to_string(),
            description: self.description,
            status: RecordStatus::Active,
            industry: self.industry,
            size: self.size,
            website: self.website,
            address: self.address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Company edits. The owning tenant is fixed once created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<RecordStatus>,
    #[serde(deserialize_with = "double_option")]
    pub industry: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub size: Option<Option<CompanySize>>,
    #[serde(deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
}

impl CompanyPatch {
    pub fn apply(&self, company: &Company, now: DateTime<Utc>) -> Company {
        let mut next = company.clone();
        if let Some(name) = &self.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(industry) = &self.industry {
            next.industry = industry.clone();
        }
        if let Some(size) = self.size {
            next.size = size;
        }
        if let Some(website) = &self.website {
            next.website = website.clone();
        }
        if let Some(address) = &self.address {
            next.address = address.clone();
        }
        next.updated_at = now;
        next
    }
}

// =============================================================================
// Notification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotificationDraft {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: Option<NotificationKind>,
}

impl NotificationDraft {
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: new_id(),
            user_id: self.user_id,
            title: self.title.trim().to_string(),
            message: self.message,
            kind: self.kind.unwrap_or_default(),
            read: false,
            created_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_into_coupon_starts_clean() {
        let draft = CouponDraft {
            code: "  SUMMER50 ".to_string(),
            discount_type: Some(DiscountType::Percentage),
            discount_value: 5000,
            max_uses: Some(200),
            ..Default::default()
        };
        let now = Utc::now();
        let coupon = draft.into_coupon("admin", now);

        assert_eq!(coupon.code, "SUMMER50");
        assert_eq!(coupon.current_uses, 0);
        assert_eq!(coupon.status, CouponStatus::Active);
        assert_eq!(coupon.created_by, "admin");
        assert_eq!(coupon.created_at, now);
    }

    #[test]
    fn test_patch_clears_and_keeps_fields() {
        let coupon = Coupon::new("WELCOME20", DiscountType::Percentage, 2000, "admin")
            .with_max_uses(100)
            .with_scope(Some("t1"), None);

        let patch = CouponPatch {
            max_uses: Some(None),
            status: Some(CouponStatus::Inactive),
            ..Default::default()
        };
        let next = patch.apply(&coupon, Utc::now());

        assert_eq!(next.id, coupon.id);
        assert_eq!(next.created_by, coupon.created_by);
        assert_eq!(next.max_uses, None);
        assert_eq!(next.status, CouponStatus::Inactive);
        assert_eq!(next.tenant_id.as_deref(), Some("t1"));
        assert!(!patch.changes_scope());
    }

    #[test]
    fn test_remaining_uses() {
        let mut coupon = Coupon::new("A", DiscountType::Fixed, 100, "admin").with_max_uses(3);
        coupon.current_uses = 2;
        assert_eq!(coupon.remaining_uses(), Some(1));

        let unlimited = Coupon::new("B", DiscountType::Fixed, 100, "admin");
        assert_eq!(unlimited.remaining_uses(), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&EffectiveStatus::Expired).unwrap();
        assert_eq!(json, "\"expired\"");

        // "expired" is not a storable administrative status.
        assert!(serde_json::from_str::<CouponStatus>("\"expired\"").is_err());
    }
}
