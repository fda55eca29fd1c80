//! # In-Memory Store
//!
//! A process-local implementation of every store trait, for tests and
//! demos. It mirrors the SQLite schema's rules: case-insensitive code
//! uniqueness per scope, foreign keys between tenants, companies and
//! coupons, and the guarded usage increment.
//!
//! All state sits behind one `tokio::sync::RwLock`; every write, including
//! `conditional_increment_use`, runs under the write guard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use aegis_core::validation::codes_match;
use aegis_core::{Company, Coupon, Notification, Scope, Tenant};

use crate::store::{
    CouponStore, DirectoryStore, NotificationStore, ScopeFilter, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct InMemoryData {
    coupons: HashMap<String, Coupon>,
    tenants: HashMap<String, Tenant>,
    companies: HashMap<String, Company>,
    notifications: HashMap<String, Notification>,
}

impl InMemoryData {
    fn code_taken(&self, coupon: &Coupon) -> bool {
        let scope = coupon.scope();
        self.coupons
            .values()
            .any(|c| c.id != coupon.id && c.scope() == scope && codes_match(&c.code, &coupon.code))
    }

    fn check_coupon_refs(&self, coupon: &Coupon) -> StoreResult<()> {
        if let Some(tenant_id) = &coupon.tenant_id {
            if !self.tenants.contains_key(tenant_id) {
                return Err(StoreError::Rejected {
                    reason: format!("unknown tenant {tenant_id}"),
                });
            }
        }
        if let Some(company_id) = &coupon.company_id {
            if !self.companies.contains_key(company_id) {
                return Err(StoreError::Rejected {
                    reason: format!("unknown company {company_id}"),
                });
            }
        }
        Ok(())
    }

    fn with_count(&self, tenant: &Tenant) -> Tenant {
        let companies_count = self
            .companies
            .values()
            .filter(|c| c.tenant_id == tenant.id)
            .count() as i64;
        Tenant {
            companies_count,
            ..tenant.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<InMemoryData>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Coupons
// =============================================================================

#[async_trait]
impl CouponStore for InMemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Coupon>> {
        self.ensure_online()?;
        Ok(self.data.read().await.coupons.get(id).cloned())
    }

    async fn list(&self, filter: &ScopeFilter) -> StoreResult<Vec<Coupon>> {
        self.ensure_online()?;
        let data = self.data.read().await;

        let mut coupons: Vec<Coupon> = data
            .coupons
            .values()
            .filter(|c| filter.matches(&c.scope()))
            .cloned()
            .collect();
        coupons.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });

        Ok(coupons)
    }

    async fn find_by_code(&self, code: &str, scope: &Scope) -> StoreResult<Option<Coupon>> {
        self.ensure_online()?;
        let data = self.data.read().await;

        Ok(data
            .coupons
            .values()
            .find(|c| &c.scope() == scope && codes_match(&c.code, code))
            .cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> StoreResult<Coupon> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if data.code_taken(coupon) {
            return Err(StoreError::Duplicate {
                field: "code".to_string(),
                value: coupon.code.clone(),
            });
        }
        data.check_coupon_refs(coupon)?;

        debug!(code = %coupon.code, "Inserting coupon");
        data.coupons.insert(coupon.id.clone(), coupon.clone());
        Ok(coupon.clone())
    }

    async fn update(&self, coupon: &Coupon, expected_uses: Option<i64>) -> StoreResult<Coupon> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        let Some(stored) = data.coupons.get(&coupon.id) else {
            return Err(StoreError::not_found("Coupon", &coupon.id));
        };
        let current_uses = match expected_uses {
            Some(expected) if stored.current_uses != expected => {
                return Err(StoreError::Stale {
                    entity: "Coupon".to_string(),
                    id: coupon.id.clone(),
                });
            }
            Some(_) => coupon.current_uses,
            None => stored.current_uses,
        };
        let updated = Coupon {
            current_uses,
            ..coupon.clone()
        };

        if matches!(updated.max_uses, Some(max) if updated.current_uses > max) {
            return Err(StoreError::Rejected {
                reason: format!("max_uses is below the {current_uses} uses already granted"),
            });
        }
        if data.code_taken(&updated) {
            return Err(StoreError::Duplicate {
                field: "code".to_string(),
                value: updated.code.clone(),
            });
        }
        data.check_coupon_refs(&updated)?;

        data.coupons.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.ensure_online()?;
        self.data
            .write()
            .await
            .coupons
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Coupon", id))
    }

    async fn conditional_increment_use(&self, id: &str) -> StoreResult<Coupon> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        let coupon = data
            .coupons
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Coupon", id))?;

        if matches!(coupon.max_uses, Some(max) if coupon.current_uses >= max) {
            return Err(StoreError::UseLimitReached { id: id.to_string() });
        }

        coupon.current_uses += 1;
        coupon.updated_at = Utc::now();
        Ok(coupon.clone())
    }
}

// =============================================================================
// Tenants & Companies
// =============================================================================

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn get_tenant(&self, id: &str) -> StoreResult<Option<Tenant>> {
        self.ensure_online()?;
        let data = self.data.read().await;
        Ok(data.tenants.get(id).map(|t| data.with_count(t)))
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        self.ensure_online()?;
        let data = self.data.read().await;

        let mut tenants: Vec<Tenant> = data.tenants.values().map(|t| data.with_count(t)).collect();
        tenants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tenants)
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if data.tenants.contains_key(&tenant.id) {
            return Err(StoreError::Duplicate {
                field: "id".to_string(),
                value: tenant.id.clone(),
            });
        }
        data.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(data.with_count(tenant))
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if !data.tenants.contains_key(&tenant.id) {
            return Err(StoreError::not_found("Tenant", &tenant.id));
        }
        data.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(data.with_count(tenant))
    }

    async fn delete_tenant(&self, id: &str) -> StoreResult<()> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if !data.tenants.contains_key(id) {
            return Err(StoreError::not_found("Tenant", id));
        }
        if data.companies.values().any(|c| c.tenant_id == id) {
            return Err(StoreError::Rejected {
                reason: format!("tenant {id} still owns companies"),
            });
        }

        data.tenants.remove(id);
        data.coupons.retain(|_, c| c.tenant_id.as_deref() != Some(id));
        Ok(())
    }

    async fn get_company(&self, id: &str) -> StoreResult<Option<Company>> {
        self.ensure_online()?;
        Ok(self.data.read().await.companies.get(id).cloned())
    }

    async fn list_companies(&self, tenant_id: Option<&str>) -> StoreResult<Vec<Company>> {
        self.ensure_online()?;
        let data = self.data.read().await;

        let mut companies: Vec<Company> = data
            .companies
            .values()
            .filter(|c| tenant_id.map_or(true, |t| c.tenant_id == t))
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn insert_company(&self, company: &Company) -> StoreResult<Company> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if !data.tenants.contains_key(&company.tenant_id) {
            return Err(StoreError::Rejected {
                reason: format!("unknown tenant {}", company.tenant_id),
            });
        }
        data.companies.insert(company.id.clone(), company.clone());
        Ok(company.clone())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<Company> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        let Some(existing) = data.companies.get(&company.id) else {
            return Err(StoreError::not_found("Company", &company.id));
        };
        // The owning tenant is fixed, as in the SQL store.
        let updated = Company {
            tenant_id: existing.tenant_id.clone(),
            ..company.clone()
        };
        data.companies.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_company(&self, id: &str) -> StoreResult<()> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        if data.companies.remove(id).is_none() {
            return Err(StoreError::not_found("Company", id));
        }
        data.coupons.retain(|_, c| c.company_id.as_deref() != Some(id));
        Ok(())
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Notification>> {
        self.ensure_online()?;
        Ok(self.data.read().await.notifications.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        self.ensure_online()?;
        let data = self.data.read().await;

        let mut notifications: Vec<Notification> = data
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn unread_count(&self, user_id: &str) -> StoreResult<i64> {
        self.ensure_online()?;
        let data = self.data.read().await;

        Ok(data
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn insert(&self, notification: &Notification) -> StoreResult<Notification> {
        self.ensure_online()?;
        self.data
            .write()
            .await
            .notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(notification.clone())
    }

    async fn mark_read(&self, id: &str) -> StoreResult<Notification> {
        self.ensure_online()?;
        let mut data = self.data.write().await;

        let notification = data
            .notifications
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Notification", id))?;
        notification.read = true;
        Ok(notification.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::{CompanyDraft, DiscountType, TenantDraft};
    use std::sync::Arc;

    async fn tenant(store: &InMemoryStore, name: &str) -> Tenant {
        let tenant = TenantDraft {
            name: name.to_string(),
            description: None,
            data_quota_gb: 500,
        }
        .into_tenant(Utc::now());
        store.insert_tenant(&tenant).await.unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_increments_never_exceed_max() {
        let store = Arc::new(InMemoryStore::new());
        let coupon = Coupon::new("RUSH", DiscountType::Fixed, 500, "admin").with_max_uses(10);
        CouponStore::insert(store.as_ref(), &coupon).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            let id = coupon.id.clone();
            handles.push(tokio::spawn(async move {
                store.conditional_increment_use(&id).await
            }));
        }

        let mut succeeded = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(StoreError::UseLimitReached { .. }) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(refused, 40);

        let stored = CouponStore::get(store.as_ref(), &coupon.id).await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 10);
    }

    #[tokio::test]
    async fn test_update_keeps_uses_granted_after_read() {
        let store = InMemoryStore::new();
        let coupon = Coupon::new("RUSH", DiscountType::Fixed, 500, "admin").with_max_uses(5);
        CouponStore::insert(&store, &coupon).await.unwrap();

        let mut edited = coupon.clone();
        store.conditional_increment_use(&coupon.id).await.unwrap();

        edited.description = Some("Weekend rush".to_string());
        let stored = CouponStore::update(&store, &edited, None).await.unwrap();
        assert_eq!(stored.current_uses, 1);

        edited.current_uses = 3;
        let err = CouponStore::update(&store, &edited, Some(0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Stale { .. }));

        let stored = CouponStore::update(&store, &edited, Some(1)).await.unwrap();
        assert_eq!(stored.current_uses, 3);

        edited.max_uses = Some(2);
        let err = CouponStore::update(&store, &edited, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_codes_unique_per_scope_ignoring_case() {
        let store = InMemoryStore::new();
        let acme = tenant(&store, "Acme Corporation").await;

        let first = Coupon::new("WELCOME20", DiscountType::Percentage, 2000, "admin")
            .with_scope(Some(acme.id.as_str()), None);
        CouponStore::insert(&store, &first).await.unwrap();

        let clash = Coupon::new("welcome20", DiscountType::Percentage, 1000, "admin")
            .with_scope(Some(acme.id.as_str()), None);
        let err = CouponStore::insert(&store, &clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let global = Coupon::new("welcome20", DiscountType::Percentage, 1000, "admin");
        CouponStore::insert(&store, &global).await.unwrap();

        let found = store
            .find_by_code("Welcome20", &Scope::tenant(&acme.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let store = InMemoryStore::new();

        let orphan = Coupon::new("ORPHAN", DiscountType::Fixed, 100, "admin")
            .with_scope(Some("no-such-tenant"), None);
        let err = CouponStore::insert(&store, &orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));

        let acme = tenant(&store, "Acme Corporation").await;
        let company = CompanyDraft {
            tenant_id: acme.id.clone(),
            name: "Tech Solutions Inc".to_string(),
            ..Default::default()
        }
        .into_company(Utc::now());
        store.insert_company(&company).await.unwrap();

        let loaded = store.get_tenant(&acme.id).await.unwrap().unwrap();
        assert_eq!(loaded.companies_count, 1);

        let err = store.delete_tenant(&acme.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = InMemoryStore::new();
        store.set_offline(true);

        let err = store.list_tenants().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_offline(false);
        assert!(store.list_tenants().await.unwrap().is_empty());
    }
}
