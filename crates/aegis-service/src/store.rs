//! # Store Traits
//!
//! The services reach persistence only through these traits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CouponService ─────► DynCouponStore ───────┬──► aegis_db::Database     │
//! │  DirectoryService ──► DynDirectoryStore ────┤                          │
//! │  NotificationService► DynNotificationStore ─┴──► InMemoryStore         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations must make `conditional_increment_use` atomic: the
//! check against `max_uses` and the increment happen as one step.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use aegis_core::{Company, Coupon, Notification, Scope, Tenant};
use aegis_db::{Database, DbError};

pub use aegis_db::ScopeFilter;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The guarded increment found the coupon at its cap.
    #[error("Coupon {id} has reached its usage limit")]
    UseLimitReached { id: String },

    /// A compare-and-set edit found the record changed since it was read.
    #[error("{entity} {id} changed since it was read")]
    Stale { entity: String, id: String },

    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The write breaks a relationship (unknown tenant, tenant still owns companies).
    #[error("Rejected: {reason}")]
    Rejected { reason: String },

    /// Backend failure. Surfaced as-is, never retried here.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => StoreError::Duplicate { field, value },
            DbError::UseLimitReached { id } => StoreError::UseLimitReached { id },
            DbError::Stale { entity, id } => StoreError::Stale { entity, id },
            DbError::ForeignKeyViolation { message } | DbError::CheckViolation { message } => {
                StoreError::Rejected { reason: message }
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

#[async_trait]
pub trait CouponStore: Send + Sync + 'static {
    async fn get(&self, id: &str) -> StoreResult<Option<Coupon>>;

    async fn list(&self, filter: &ScopeFilter) -> StoreResult<Vec<Coupon>>;

    /// Coupon using `code` in exactly `scope`, compared case-insensitively.
    async fn find_by_code(&self, code: &str, scope: &Scope) -> StoreResult<Option<Coupon>>;

    async fn insert(&self, coupon: &Coupon) -> StoreResult<Coupon>;

    /// Writes an already-validated edit and returns the stored record.
    ///
    /// The stored `current_uses` is kept unless `expected_uses` is given;
    /// then `coupon.current_uses` is written only if the stored count still
    /// equals `expected_uses`, else [`StoreError::Stale`].
    async fn update(&self, coupon: &Coupon, expected_uses: Option<i64>) -> StoreResult<Coupon>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// `current_uses += 1` only if the result stays within `max_uses`.
    async fn conditional_increment_use(&self, id: &str) -> StoreResult<Coupon>;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    async fn get_tenant(&self, id: &str) -> StoreResult<Option<Tenant>>;
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;
    async fn insert_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant>;
    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant>;
    async fn delete_tenant(&self, id: &str) -> StoreResult<()>;

    async fn get_company(&self, id: &str) -> StoreResult<Option<Company>>;
    async fn list_companies(&self, tenant_id: Option<&str>) -> StoreResult<Vec<Company>>;
    async fn insert_company(&self, company: &Company) -> StoreResult<Company>;
    async fn update_company(&self, company: &Company) -> StoreResult<Company>;
    async fn delete_company(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    async fn get(&self, id: &str) -> StoreResult<Option<Notification>>;
    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Notification>>;
    async fn unread_count(&self, user_id: &str) -> StoreResult<i64>;
    async fn insert(&self, notification: &Notification) -> StoreResult<Notification>;
    async fn mark_read(&self, id: &str) -> StoreResult<Notification>;
}

pub type DynCouponStore = Arc<dyn CouponStore>;
pub type DynDirectoryStore = Arc<dyn DirectoryStore>;
pub type DynNotificationStore = Arc<dyn NotificationStore>;

// =============================================================================
// SQLite
// =============================================================================

#[async_trait]
impl CouponStore for Database {
    async fn get(&self, id: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.coupons().get(id).await?)
    }

    async fn list(&self, filter: &ScopeFilter) -> StoreResult<Vec<Coupon>> {
        Ok(self.coupons().list(filter).await?)
    }

    async fn find_by_code(&self, code: &str, scope: &Scope) -> StoreResult<Option<Coupon>> {
        Ok(self.coupons().find_by_code_in_scope(code, scope).await?)
    }

    async fn insert(&self, coupon: &Coupon) -> StoreResult<Coupon> {
        Ok(self.coupons().insert(coupon).await?)
    }

    async fn update(&self, coupon: &Coupon, expected_uses: Option<i64>) -> StoreResult<Coupon> {
        Ok(self.coupons().update(coupon, expected_uses).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        Ok(self.coupons().delete(id).await?)
    }

    async fn conditional_increment_use(&self, id: &str) -> StoreResult<Coupon> {
        Ok(self.coupons().conditional_increment_use(id).await?)
    }
}

#[async_trait]
impl DirectoryStore for Database {
    async fn get_tenant(&self, id: &str) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants().get(id).await?)
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        Ok(self.tenants().list().await?)
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        Ok(self.tenants().insert(tenant).await?)
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        Ok(self.tenants().update(tenant).await?)
    }

    async fn delete_tenant(&self, id: &str) -> StoreResult<()> {
        Ok(self.tenants().delete(id).await?)
    }

    async fn get_company(&self, id: &str) -> StoreResult<Option<Company>> {
        Ok(self.companies().get(id).await?)
    }

    async fn list_companies(&self, tenant_id: Option<&str>) -> StoreResult<Vec<Company>> {
        Ok(self.companies().list(tenant_id).await?)
    }

    async fn insert_company(&self, company: &Company) -> StoreResult<Company> {
        Ok(self.companies().insert(company).await?)
    }

    async fn update_company(&self, company: &Company) -> StoreResult<Company> {
        Ok(self.companies().update(company).await?)
    }

    async fn delete_company(&self, id: &str) -> StoreResult<()> {
        Ok(self.companies().delete(id).await?)
    }
}

#[async_trait]
impl NotificationStore for Database {
    async fn get(&self, id: &str) -> StoreResult<Option<Notification>> {
        Ok(self.notifications().get(id).await?)
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        Ok(self.notifications().list_for_user(user_id).await?)
    }

    async fn unread_count(&self, user_id: &str) -> StoreResult<i64> {
        Ok(self.notifications().unread_count(user_id).await?)
    }

    async fn insert(&self, notification: &Notification) -> StoreResult<Notification> {
        Ok(self.notifications().insert(notification).await?)
    }

    async fn mark_read(&self, id: &str) -> StoreResult<Notification> {
        Ok(self.notifications().mark_read(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_store_errors() {
        let err: StoreError = DbError::UseLimitReached { id: "c1".into() }.into();
        assert_eq!(err, StoreError::UseLimitReached { id: "c1".into() });

        let err: StoreError = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Rejected { .. }));

        let err: StoreError = DbError::Stale {
            entity: "Coupon".into(),
            id: "c1".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Stale { .. }));

        let err: StoreError = DbError::PoolExhausted.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
