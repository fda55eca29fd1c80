//! # Access Policy
//!
//! Maps a caller's role and position to what they may do with a scoped
//! resource.
//!
//! ## Policy Table
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────────────┐
//! │ Role         │ Allowed                                                │
//! ├──────────────┼────────────────────────────────────────────────────────┤
//! │ superadmin   │ every action, every scope                              │
//! │ owner        │ every action inside own tenant                         │
//! │              │ tenants: read/update own tenant only                   │
//! │              │ global resources: read/redeem only                     │
//! │ user         │ read/redeem on global, own-tenant-wide, own-company    │
//! │              │ resources; nothing else                                │
//! └──────────────┴────────────────────────────────────────────────────────┘
//! ```
//!
//! The policy is recomputed on every call from the `Principal` passed in.
//! There is no cached session state.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Role & Principal
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Owner,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Superadmin => "superadmin",
            Role::Owner => "owner",
            Role::User => "user",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "owner" => Ok(Role::Owner),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An authenticated caller.
///
/// Produced by the identity provider and passed explicitly into every
/// service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<String>,
    pub company_id: Option<String>,
}

impl Principal {
    /// The tenant/company the principal belongs to.
    pub fn scope(&self) -> Scope {
        Scope {
            tenant_id: self.tenant_id.clone(),
            company_id: self.company_id.clone(),
        }
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }
}

// =============================================================================
// Scope
// =============================================================================

/// A tenant/company pair, or a subset of it.
///
/// An empty scope is global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scope {
    pub tenant_id: Option<String>,
    pub company_id: Option<String>,
}

impl Scope {
    pub fn global() -> Self {
        Scope::default()
    }

    pub fn tenant(tenant_id: &str) -> Self {
        Scope {
            tenant_id: Some(tenant_id.to_string()),
            company_id: None,
        }
    }

    pub fn company(tenant_id: &str, company_id: &str) -> Self {
        Scope {
            tenant_id: Some(tenant_id.to_string()),
            company_id: Some(company_id.to_string()),
        }
    }

    pub fn is_global(&self) -> bool {
        self.tenant_id.is_none() && self.company_id.is_none()
    }

    /// Whether a resource with this scope is usable from `position`.
    ///
    /// Global resources are usable everywhere. A tenant-wide resource is
    /// usable anywhere inside that tenant. A company resource only inside
    /// that company.
    pub fn is_visible_from(&self, position: &Scope) -> bool {
        if let Some(tenant) = &self.tenant_id {
            if position.tenant_id.as_ref() != Some(tenant) {
                return false;
            }
        }
        if let Some(company) = &self.company_id {
            if position.company_id.as_ref() != Some(company) {
                return false;
            }
        }
        true
    }

    /// Whether this scope lies inside `tenant_id`.
    pub fn is_within_tenant(&self, tenant_id: &str) -> bool {
        self.tenant_id.as_deref() == Some(tenant_id)
    }
}

// =============================================================================
// Actions & Resources
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Apply a coupon to a purchase.
    Redeem,
}

impl Action {
    /// Whether the action leaves stored data untouched (from the caller's
    /// point of view, redemption only consumes a use).
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::Read | Action::Redeem)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Redeem => "redeem",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tenant,
    Company,
    Coupon,
    Notification,
}

/// The target of an action: what it is and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub scope: Scope,
}

impl Resource {
    pub fn new(kind: ResourceKind, scope: Scope) -> Self {
        Resource { kind, scope }
    }

    pub fn tenant(tenant_id: &str) -> Self {
        Resource::new(ResourceKind::Tenant, Scope::tenant(tenant_id))
    }

    pub fn coupon(scope: Scope) -> Self {
        Resource::new(ResourceKind::Coupon, scope)
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Decides whether `principal` may perform `action` on `resource`.
///
/// ```rust
/// use aegis_core::access::{can_perform, Action, Principal, Resource, Role};
///
/// let user = Principal {
///     id: "u1".into(),
///     email: "user@example.com".into(),
///     display_name: None,
///     role: Role::User,
///     tenant_id: Some("t1".into()),
///     company_id: Some("c1".into()),
/// };
/// assert!(!can_perform(&user, Action::Delete, &Resource::tenant("t1")));
/// ```
pub fn can_perform(principal: &Principal, action: Action, resource: &Resource) -> bool {
    match principal.role {
        Role::Superadmin => true,
        Role::Owner => owner_can(principal, action, resource),
        Role::User => user_can(principal, action, resource),
    }
}

fn owner_can(principal: &Principal, action: Action, resource: &Resource) -> bool {
    let Some(own_tenant) = principal.tenant_id.as_deref() else {
        return false;
    };

    if resource.scope.is_global() {
        return action.is_read_only() && resource.kind != ResourceKind::Tenant;
    }

    if !resource.scope.is_within_tenant(own_tenant) {
        return false;
    }

    match resource.kind {
        // Owners manage inside their tenant but cannot create or remove it.
        ResourceKind::Tenant => matches!(action, Action::Read | Action::Update),
        ResourceKind::Company | ResourceKind::Coupon | ResourceKind::Notification => true,
    }
}

fn user_can(principal: &Principal, action: Action, resource: &Resource) -> bool {
    if !action.is_read_only() {
        return false;
    }
    if action == Action::Redeem && resource.kind != ResourceKind::Coupon {
        return false;
    }
    if principal.tenant_id.is_none() {
        return resource.scope.is_global() && resource.kind != ResourceKind::Tenant;
    }

    match resource.kind {
        ResourceKind::Tenant => resource.scope.tenant_id == principal.tenant_id,
        _ => resource.scope.is_visible_from(&principal.scope()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_user_cannot_delete_tenant() {
        let user = principal(Role::User, Some("t1"), Some("c1"));
        assert!(!can_perform(&user, Action::Delete, &Resource::tenant("t1")));
    }

    #[test]
    fn test_superadmin_can_do_anything() {
        let admin = principal(Role::Superadmin, None, None);
        assert!(can_perform(&admin, Action::Delete, &Resource::tenant("anything")));
        assert!(can_perform(
            &admin,
            Action::Create,
            &Resource::coupon(Scope::company("t9", "c9"))
        ));
        assert!(can_perform(&admin, Action::Update, &Resource::coupon(Scope::global())));
    }

    #[test]
    fn test_owner_limited_to_own_tenant() {
        let owner = principal(Role::Owner, Some("t1"), None);

        for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
            assert!(can_perform(&owner, action, &Resource::coupon(Scope::tenant("t1"))));
            assert!(can_perform(
                &owner,
                action,
                &Resource::new(ResourceKind::Company, Scope::company("t1", "c2"))
            ));
            assert!(!can_perform(&owner, action, &Resource::coupon(Scope::tenant("t2"))));
        }
    }

    #[test]
    fn test_owner_on_tenant_records() {
        let owner = principal(Role::Owner, Some("t1"), None);

        assert!(can_perform(&owner, Action::Read, &Resource::tenant("t1")));
        assert!(can_perform(&owner, Action::Update, &Resource::tenant("t1")));
        assert!(!can_perform(&owner, Action::Delete, &Resource::tenant("t1")));
        assert!(!can_perform(&owner, Action::Read, &Resource::tenant("t2")));
    }

    #[test]
    fn test_owner_on_global_coupons() {
        let owner = principal(Role::Owner, Some("t1"), None);
        let global = Resource::coupon(Scope::global());

        assert!(can_perform(&owner, Action::Read, &global));
        assert!(can_perform(&owner, Action::Redeem, &global));
        assert!(!can_perform(&owner, Action::Update, &global));
        assert!(!can_perform(&owner, Action::Delete, &global));
    }

    #[test]
    fn test_owner_without_tenant_is_denied() {
        let owner = principal(Role::Owner, None, None);
        assert!(!can_perform(&owner, Action::Read, &Resource::coupon(Scope::global())));
    }

    #[test]
    fn test_user_read_only_in_own_company() {
        let user = principal(Role::User, Some("t1"), Some("c1"));

        assert!(can_perform(&user, Action::Read, &Resource::coupon(Scope::company("t1", "c1"))));
        assert!(can_perform(&user, Action::Read, &Resource::coupon(Scope::tenant("t1"))));
        assert!(can_perform(&user, Action::Read, &Resource::coupon(Scope::global())));
        assert!(can_perform(&user, Action::Redeem, &Resource::coupon(Scope::tenant("t1"))));

        assert!(!can_perform(&user, Action::Read, &Resource::coupon(Scope::company("t1", "c2"))));
        assert!(!can_perform(&user, Action::Read, &Resource::coupon(Scope::tenant("t2"))));

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(!can_perform(&user, action, &Resource::coupon(Scope::company("t1", "c1"))));
            assert!(!can_perform(
                &user,
                action,
                &Resource::new(ResourceKind::Company, Scope::company("t1", "c1"))
            ));
        }
    }

    #[test]
    fn test_user_cannot_redeem_non_coupons() {
        let user = principal(Role::User, Some("t1"), Some("c1"));
        assert!(!can_perform(&user, Action::Redeem, &Resource::tenant("t1")));
    }

    #[test]
    fn test_scope_visibility() {
        let position = Scope::company("t1", "c1");
        assert!(Scope::global().is_visible_from(&position));
        assert!(Scope::tenant("t1").is_visible_from(&position));
        assert!(Scope::company("t1", "c1").is_visible_from(&position));
        assert!(!Scope::company("t1", "c2").is_visible_from(&position));
        assert!(!Scope::tenant("t1").is_visible_from(&Scope::global()));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Owner".parse::<Role>(), Ok(Role::Owner));
        assert!("guest".parse::<Role>().is_err());
    }
}
