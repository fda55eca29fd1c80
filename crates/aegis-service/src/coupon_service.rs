//! # Coupon Service
//!
//! Guarded coupon CRUD and redemption.
//!
//! ## Redemption
//! ```text
//! load ──► policy(redeem) ──► position check ──► engine ──► guarded increment
//!   │            │                  │               │               │
//!   NotFound   ScopeDenied      ScopeDenied   NotRedeemable    UseLimitReached
//!                                             BelowMinimum…    (lost the race)
//!                                             NotApplicable
//! ```
//!
//! The engine works on the loaded snapshot. The store's increment is the
//! only step that decides whether the use is actually granted, so two
//! callers racing for the last use cannot both win.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use aegis_core::coupon::{check_redemption_scope, effective_status, redeem_purchase};
use aegis_core::validation::{validate_coupon, validate_coupon_edit};
use aegis_core::{
    Action, Coupon, CouponDraft, CouponPatch, EffectiveStatus, Principal, Purchase, Redemption,
    Resource, Scope, ValidationError,
};

use crate::error::{ServiceError, ServiceResult};
use crate::guard::authorize;
use crate::store::{DynCouponStore, DynDirectoryStore, ScopeFilter, StoreError};

/// A purchase presented for redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub purchase: Purchase,

    /// Where the purchase happens. Defaults to the caller's own position.
    #[serde(default)]
    pub location: Option<Scope>,
}

impl RedemptionRequest {
    pub fn new(purchase: Purchase) -> Self {
        RedemptionRequest {
            purchase,
            location: None,
        }
    }

    pub fn at(mut self, location: Scope) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Clone)]
pub struct CouponService {
    coupons: DynCouponStore,
    directory: DynDirectoryStore,
}

impl CouponService {
    pub fn new(coupons: DynCouponStore, directory: DynDirectoryStore) -> Self {
        CouponService { coupons, directory }
    }

    async fn load(&self, id: &str) -> ServiceResult<Coupon> {
        self.coupons
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Coupon", id))
    }

    pub async fn get(&self, principal: &Principal, id: &str) -> ServiceResult<Coupon> {
        let coupon = self.load(id).await?;
        authorize(principal, Action::Read, &Resource::coupon(coupon.scope()))?;
        Ok(coupon)
    }

    /// Coupons matching `filter` that the caller may read.
    ///
    /// An unrestricted listing by anyone but a superadmin is narrowed to
    /// what their tenant can reach.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &ScopeFilter,
    ) -> ServiceResult<Vec<Coupon>> {
        let filter = match (filter, principal.is_superadmin(), &principal.tenant_id) {
            (ScopeFilter::All, false, Some(tenant_id)) => ScopeFilter::Reachable(tenant_id.clone()),
            (ScopeFilter::All, false, None) => ScopeFilter::Global,
            (other, _, _) => other.clone(),
        };

        let mut coupons = self.coupons.list(&filter).await?;
        coupons.retain(|c| {
            aegis_core::can_perform(principal, Action::Read, &Resource::coupon(c.scope()))
        });
        Ok(coupons)
    }

    pub async fn create(&self, principal: &Principal, draft: CouponDraft) -> ServiceResult<Coupon> {
        let coupon = draft.into_coupon(&principal.id, Utc::now());
        authorize(principal, Action::Create, &Resource::coupon(coupon.scope()))?;

        let company_tenant = self.resolve_scope(&coupon).await?;
        validate_coupon(&coupon, company_tenant.as_deref())?;
        self.ensure_code_free(&coupon).await?;

        let created = self.coupons.insert(&coupon).await?;
        info!(
            coupon_id = %created.id,
            code = %created.code,
            tenant_id = ?created.tenant_id,
            principal_id = %principal.id,
            "Coupon created"
        );
        Ok(created)
    }

    /// Applies an administrative edit.
    ///
    /// Moving a coupon to another scope needs update rights on both the
    /// old and the new scope. Uses granted while the edit is in flight are
    /// kept; an explicit `current_uses` is only written if no redemption
    /// happened since the coupon was loaded, else `Conflict`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        patch: &CouponPatch,
    ) -> ServiceResult<Coupon> {
        let before = self.load(id).await?;
        authorize(principal, Action::Update, &Resource::coupon(before.scope()))?;

        let after = patch.apply(&before, Utc::now());
        if after.scope() != before.scope() {
            authorize(principal, Action::Update, &Resource::coupon(after.scope()))?;
        }

        let company_tenant = self.resolve_scope(&after).await?;
        validate_coupon_edit(&before, &after, company_tenant.as_deref())?;
        self.ensure_code_free(&after).await?;

        let expected_uses = patch.current_uses.map(|_| before.current_uses);
        let updated = self.coupons.update(&after, expected_uses).await?;
        info!(coupon_id = %updated.id, principal_id = %principal.id, "Coupon updated");
        Ok(updated)
    }

    pub async fn delete(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        let coupon = self.load(id).await?;
        authorize(principal, Action::Delete, &Resource::coupon(coupon.scope()))?;

        self.coupons.delete(id).await?;
        info!(coupon_id = %id, code = %coupon.code, principal_id = %principal.id, "Coupon deleted");
        Ok(())
    }

    pub async fn effective_status(
        &self,
        principal: &Principal,
        id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<EffectiveStatus> {
        let coupon = self.get(principal, id).await?;
        Ok(effective_status(&coupon, now))
    }

    /// Redeems one use of a coupon against a purchase.
    pub async fn redeem(
        &self,
        principal: &Principal,
        id: &str,
        request: &RedemptionRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Redemption> {
        let coupon = self.load(id).await?;
        authorize(principal, Action::Redeem, &Resource::coupon(coupon.scope()))?;

        let position = request
            .location
            .clone()
            .unwrap_or_else(|| principal.scope());
        if !principal.is_superadmin() && !principal.scope().is_visible_from(&position) {
            warn!(principal_id = %principal.id, coupon_id = %id, "Redemption outside own position");
            return Err(ServiceError::denied(
                "purchase location is outside the caller's tenant or company",
            ));
        }

        check_redemption_scope(&coupon, &position)?;
        let outcome = redeem_purchase(&coupon, &request.purchase, now)?;

        let stored = match self.coupons.conditional_increment_use(id).await {
            Ok(stored) => stored,
            Err(StoreError::UseLimitReached { .. }) => {
                warn!(coupon_id = %id, code = %coupon.code, "Lost race for last coupon use");
                return Err(ServiceError::UseLimitReached { code: coupon.code });
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            coupon_id = %stored.id,
            code = %stored.code,
            discount = %outcome.discount,
            current_uses = stored.current_uses,
            principal_id = %principal.id,
            "Coupon redeemed"
        );

        Ok(Redemption {
            coupon: stored,
            discount: outcome.discount,
        })
    }

    /// Checks the coupon's tenant exists and returns the owning tenant of
    /// its company, if it names one.
    async fn resolve_scope(&self, coupon: &Coupon) -> ServiceResult<Option<String>> {
        if let Some(tenant_id) = &coupon.tenant_id {
            if self.directory.get_tenant(tenant_id).await?.is_none() {
                return Err(ValidationError::InvalidFormat {
                    field: "tenant_id".to_string(),
                    reason: format!("tenant {tenant_id} does not exist"),
                }
                .into());
            }
        }

        match &coupon.company_id {
            Some(company_id) => Ok(self
                .directory
                .get_company(company_id)
                .await?
                .map(|c| c.tenant_id)),
            None => Ok(None),
        }
    }

    async fn ensure_code_free(&self, coupon: &Coupon) -> ServiceResult<()> {
        match self.coupons.find_by_code(&coupon.code, &coupon.scope()).await? {
            Some(existing) if existing.id != coupon.id => Err(ServiceError::Conflict(format!(
                "code '{}' is already used in this scope",
                coupon.code
            ))),
            _ => Ok(()),
        }
    }
}
