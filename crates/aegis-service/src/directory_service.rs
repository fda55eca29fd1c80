//! # Directory Service
//!
//! Tenants and companies. Every call is checked against the access policy:
//! only superadmins create or delete tenants, owners manage companies
//! inside their own tenant, users read.

use chrono::Utc;
use tracing::info;

use aegis_core::validation::{validate_company, validate_tenant};
use aegis_core::{
    can_perform, Action, Company, CompanyDraft, CompanyPatch, Principal, Resource, ResourceKind,
    Tenant, TenantDraft, TenantPatch,
};

use crate::error::{ServiceError, ServiceResult};
use crate::guard::authorize;
use crate::store::DynDirectoryStore;

#[derive(Clone)]
pub struct DirectoryService {
    store: DynDirectoryStore,
}

fn company_resource(company: &Company) -> Resource {
    Resource::new(ResourceKind::Company, company.scope())
}

impl DirectoryService {
    pub fn new(store: DynDirectoryStore) -> Self {
        DirectoryService { store }
    }

    // =========================================================================
    // Tenants
    // =========================================================================

    async fn load_tenant(&self, id: &str) -> ServiceResult<Tenant> {
        self.store
            .get_tenant(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant", id))
    }

    pub async fn get_tenant(&self, principal: &Principal, id: &str) -> ServiceResult<Tenant> {
        let tenant = self.load_tenant(id).await?;
        authorize(principal, Action::Read, &Resource::tenant(id))?;
        Ok(tenant)
    }

    /// Tenants the caller may read, sorted by name.
    pub async fn list_tenants(&self, principal: &Principal) -> ServiceResult<Vec<Tenant>> {
        let mut tenants = self.store.list_tenants().await?;
        tenants.retain(|t| can_perform(principal, Action::Read, &Resource::tenant(&t.id)));
        Ok(tenants)
    }

    pub async fn create_tenant(
        &self,
        principal: &Principal,
        draft: TenantDraft,
    ) -> ServiceResult<Tenant> {
        let tenant = draft.into_tenant(Utc::now());
        authorize(principal, Action::Create, &Resource::tenant(&tenant.id))?;
        validate_tenant(&tenant)?;

        let created = self.store.insert_tenant(&tenant).await?;
        info!(tenant_id = %created.id, name = %created.name, "Tenant created");
        Ok(created)
    }

    pub async fn update_tenant(
        &self,
        principal: &Principal,
        id: &str,
        patch: &TenantPatch,
    ) -> ServiceResult<Tenant> {
        let before = self.load_tenant(id).await?;
        authorize(principal, Action::Update, &Resource::tenant(id))?;

        let after = patch.apply(&before, Utc::now());
        validate_tenant(&after)?;

        let updated = self.store.update_tenant(&after).await?;
        info!(tenant_id = %id, status = ?updated.status, "Tenant updated");
        Ok(updated)
    }

    /// Deletes an empty tenant. A tenant that still owns companies is a
    /// `Conflict`; remove its companies first.
    pub async fn delete_tenant(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        let tenant = self.load_tenant(id).await?;
        authorize(principal, Action::Delete, &Resource::tenant(id))?;

        if tenant.companies_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "tenant '{}' still owns {} companies",
                tenant.name, tenant.companies_count
            )));
        }

        self.store.delete_tenant(id).await?;
        info!(tenant_id = %id, name = %tenant.name, "Tenant deleted");
        Ok(())
    }

    // =========================================================================
    // Companies
    // =========================================================================

    async fn load_company(&self, id: &str) -> ServiceResult<Company> {
        self.store
            .get_company(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company", id))
    }

    pub async fn get_company(&self, principal: &Principal, id: &str) -> ServiceResult<Company> {
        let company = self.load_company(id).await?;
        authorize(principal, Action::Read, &company_resource(&company))?;
        Ok(company)
    }

    /// Companies the caller may read, optionally within one tenant.
    ///
    /// Anyone but a superadmin only ever sees companies of their own tenant.
    pub async fn list_companies(
        &self,
        principal: &Principal,
        tenant_id: Option<&str>,
    ) -> ServiceResult<Vec<Company>> {
        let tenant_id = if principal.is_superadmin() {
            tenant_id
        } else {
            match principal.tenant_id.as_deref() {
                Some(own) if tenant_id.map_or(true, |t| t == own) => Some(own),
                _ => return Ok(Vec::new()),
            }
        };

        let mut companies = self.store.list_companies(tenant_id).await?;
        companies.retain(|c| can_perform(principal, Action::Read, &company_resource(c)));
        Ok(companies)
    }

    pub async fn create_company(
        &self,
        principal: &Principal,
        draft: CompanyDraft,
    ) -> ServiceResult<Company> {
        let company = draft.into_company(Utc::now());
        validate_company(&company)?;
        authorize(principal, Action::Create, &company_resource(&company))?;

        if self.store.get_tenant(&company.tenant_id).await?.is_none() {
            return Err(ServiceError::not_found("Tenant", &company.tenant_id));
        }

        let created = self.store.insert_company(&company).await?;
        info!(
            company_id = %created.id,
            tenant_id = %created.tenant_id,
            name = %created.name,
            "Company created"
        );
        Ok(created)
    }

    pub async fn update_company(
        &self,
        principal: &Principal,
        id: &str,
        patch: &CompanyPatch,
    ) -> ServiceResult<Company> {
        let before = self.load_company(id).await?;
        authorize(principal, Action::Update, &company_resource(&before))?;

        let after = patch.apply(&before, Utc::now());
        validate_company(&after)?;

        let updated = self.store.update_company(&after).await?;
        info!(company_id = %id, "Company updated");
        Ok(updated)
    }

    /// Deletes a company together with the coupons scoped to it.
    pub async fn delete_company(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        let company = self.load_company(id).await?;
        authorize(principal, Action::Delete, &company_resource(&company))?;

        self.store.delete_company(id).await?;
        info!(company_id = %id, tenant_id = %company.tenant_id, "Company deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aegis_core::{RecordStatus, Role};

    use crate::error::{ErrorCode, ErrorPayload};
    use crate::memory::InMemoryStore;

    fn principal(role: Role, tenant: Option<&str>, company: Option<&str>) -> Principal {
        Principal {
            id: format!("{role}-1"),
            email: format!("{role}@example.com"),
            display_name: None,
            role,
            tenant_id: tenant.map(str::to_string),
            company_id: company.map(str::to_string),
        }
    }

    fn admin() -> Principal {
        principal(Role::Superadmin, None, None)
    }

    fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(InMemoryStore::new()))
    }

    fn tenant_draft(name: &str, quota: i64) -> TenantDraft {
        TenantDraft {
            name: name.to_string(),
            description: None,
            data_quota_gb: quota,
        }
    }

    fn company_draft(tenant_id: &str, name: &str) -> CompanyDraft {
        CompanyDraft {
            tenant_id: tenant_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_only_superadmin_creates_tenants() {
        let svc = service();

        let acme = svc
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 500))
            .await
            .unwrap();
        assert_eq!(acme.status, RecordStatus::Active);
        assert_eq!(acme.companies_count, 0);

        let owner = principal(Role::Owner, Some(acme.id.as_str()), None);
        let err = svc
            .create_tenant(&owner, tenant_draft("Side Project", 10))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
    }

    #[tokio::test]
    async fn test_tenant_quota_must_be_positive() {
        let err = service()
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 0))
            .await
            .unwrap_err();
        let payload = ErrorPayload::from(&err);
        assert_eq!(payload.field.as_deref(), Some("data_quota_gb"));
    }

    #[tokio::test]
    async fn test_owner_updates_own_tenant_only() {
        let svc = service();
        let acme = svc
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 500))
            .await
            .unwrap();
        let other = svc
            .create_tenant(&admin(), tenant_draft("Tech Innovations", 1000))
            .await
            .unwrap();
        let owner = principal(Role::Owner, Some(acme.id.as_str()), None);

        let patch = TenantPatch {
            data_quota_gb: Some(750),
            ..Default::default()
        };
        let updated = svc.update_tenant(&owner, &acme.id, &patch).await.unwrap();
        assert_eq!(updated.data_quota_gb, 750);

        let err = svc.update_tenant(&owner, &other.id, &patch).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);

        let visible = svc.list_tenants(&owner).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, acme.id);
    }

    #[tokio::test]
    async fn test_delete_tenant_with_companies_conflicts() {
        let svc = service();
        let acme = svc
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 500))
            .await
            .unwrap();
        let company = svc
            .create_company(&admin(), company_draft(&acme.id, "Tech Solutions Inc"))
            .await
            .unwrap();

        let err = svc.delete_tenant(&admin(), &acme.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        svc.delete_company(&admin(), &company.id).await.unwrap();
        svc.delete_tenant(&admin(), &acme.id).await.unwrap();

        let err = svc.get_tenant(&admin(), &acme.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_create_company_needs_existing_tenant() {
        let svc = service();

        let err = svc
            .create_company(
                &admin(),
                company_draft("550e8400-e29b-41d4-a716-446655440000", "Orphan Ltd"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { ref entity, .. } if entity == "Tenant"));

        let err = svc
            .create_company(&admin(), company_draft("not-a-uuid", "Orphan Ltd"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_owner_manages_companies_in_own_tenant() {
        let svc = service();
        let acme = svc
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 500))
            .await
            .unwrap();
        let other = svc
            .create_tenant(&admin(), tenant_draft("Tech Innovations", 1000))
            .await
            .unwrap();
        let owner = principal(Role::Owner, Some(acme.id.as_str()), None);

        let company = svc
            .create_company(&owner, company_draft(&acme.id, "Tech Solutions Inc"))
            .await
            .unwrap();
        svc.create_company(&admin(), company_draft(&other.id, "Innovation Labs"))
            .await
            .unwrap();

        let err = svc
            .create_company(&owner, company_draft(&other.id, "Sneaky Co"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);

        let patch = CompanyPatch {
            website: Some(Some("https://techsolutions.example".into())),
            ..Default::default()
        };
        let updated = svc.update_company(&owner, &company.id, &patch).await.unwrap();
        assert_eq!(updated.website.as_deref(), Some("https://techsolutions.example"));

        let listed = svc.list_companies(&owner, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(svc.list_companies(&owner, Some(other.id.as_str())).await.unwrap().is_empty());
        assert_eq!(svc.list_companies(&admin(), None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_user_sees_only_own_company() {
        let svc = service();
        let acme = svc
            .create_tenant(&admin(), tenant_draft("Acme Corporation", 500))
            .await
            .unwrap();
        let mine = svc
            .create_company(&admin(), company_draft(&acme.id, "Tech Solutions Inc"))
            .await
            .unwrap();
        svc.create_company(&admin(), company_draft(&acme.id, "Green Energy Co"))
            .await
            .unwrap();
        let user = principal(Role::User, Some(acme.id.as_str()), Some(mine.id.as_str()));

        let listed = svc.list_companies(&user, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        let err = svc.delete_company(&user, &mine.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
    }
}
