//! Policy enforcement shared by the services.

use tracing::warn;

use aegis_core::{can_perform, Action, Principal, Resource};

use crate::error::{ServiceError, ServiceResult};

/// Runs the access policy and turns a refusal into `ScopeDenied`.
pub(crate) fn authorize(
    principal: &Principal,
    action: Action,
    resource: &Resource,
) -> ServiceResult<()> {
    if can_perform(principal, action, resource) {
        return Ok(());
    }

    warn!(
        principal_id = %principal.id,
        role = %principal.role,
        %action,
        kind = ?resource.kind,
        "Access denied"
    );
    Err(ServiceError::denied(format!(
        "{} may not {} this {:?}",
        principal.role, action, resource.kind
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::{Role, Scope};

    #[test]
    fn test_refusal_is_scope_denied() {
        let user = Principal {
            id: "u1".into(),
            email: "user@example.com".into(),
            display_name: None,
            role: Role::User,
            tenant_id: Some("t1".into()),
            company_id: None,
        };

        authorize(&user, Action::Read, &Resource::coupon(Scope::global())).unwrap();

        let err = authorize(&user, Action::Delete, &Resource::tenant("t1")).unwrap_err();
        assert!(matches!(err, ServiceError::ScopeDenied { .. }));
        assert_eq!(err.to_string(), "Access denied: user may not delete this Tenant");
    }
}
