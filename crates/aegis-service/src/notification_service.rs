//! # Notification Service
//!
//! Per-user inbox. Users read and acknowledge their own notifications;
//! superadmins may read anyone's. Creating one is an administrative act
//! (superadmin, or owner within their tenant).

use chrono::Utc;
use tracing::info;

use aegis_core::validation::validate_notification;
use aegis_core::{Action, Notification, NotificationDraft, Principal, Resource, ResourceKind};

use crate::error::{ServiceError, ServiceResult};
use crate::guard::authorize;
use crate::store::DynNotificationStore;

#[derive(Clone)]
pub struct NotificationService {
    store: DynNotificationStore,
}

impl NotificationService {
    pub fn new(store: DynNotificationStore) -> Self {
        NotificationService { store }
    }

    fn ensure_inbox_access(principal: &Principal, user_id: &str) -> ServiceResult<()> {
        if principal.is_superadmin() || principal.id == user_id {
            Ok(())
        } else {
            Err(ServiceError::denied("notifications belong to another user"))
        }
    }

    /// Notifications addressed to `user_id`, newest first.
    pub async fn list_for_user(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> ServiceResult<Vec<Notification>> {
        Self::ensure_inbox_access(principal, user_id)?;
        Ok(self.store.list_for_user(user_id).await?)
    }

    pub async fn unread_count(&self, principal: &Principal, user_id: &str) -> ServiceResult<i64> {
        Self::ensure_inbox_access(principal, user_id)?;
        Ok(self.store.unread_count(user_id).await?)
    }

    /// Marks one of the caller's own notifications read.
    pub async fn mark_read(&self, principal: &Principal, id: &str) -> ServiceResult<Notification> {
        let notification = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", id))?;

        if notification.user_id != principal.id {
            return Err(ServiceError::denied(
                "only the recipient may mark a notification read",
            ));
        }

        Ok(self.store.mark_read(id).await?)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        draft: NotificationDraft,
    ) -> ServiceResult<Notification> {
        authorize(
            principal,
            Action::Create,
            &Resource::new(ResourceKind::Notification, principal.scope()),
        )?;
        validate_notification(&draft)?;

        let notification = self
            .store
            .insert(&draft.into_notification(Utc::now()))
            .await?;
        info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = ?notification.kind,
            "Notification created"
        );
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aegis_core::{NotificationKind, Role};

    use crate::error::ErrorCode;
    use crate::memory::InMemoryStore;

    fn principal(id: &str, role: Role) -> Principal {
        Principal {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            display_name: None,
            role,
            tenant_id: Some("tenant-1".to_string()),
            company_id: None,
        }
    }

    fn draft(user_id: &str, title: &str) -> NotificationDraft {
        NotificationDraft {
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: "Quota raised to 750 GB".to_string(),
            kind: None,
        }
    }

    #[tokio::test]
    async fn test_owner_notifies_and_user_reads() {
        let svc = NotificationService::new(Arc::new(InMemoryStore::new()));
        let owner = principal("owner-1", Role::Owner);
        let user = principal("user-1", Role::User);

        let created = svc.create(&owner, draft("user-1", "Tenant updated")).await.unwrap();
        assert_eq!(created.kind, NotificationKind::Info);
        assert!(!created.read);

        assert_eq!(svc.unread_count(&user, "user-1").await.unwrap(), 1);
        let read = svc.mark_read(&user, &created.id).await.unwrap();
        assert!(read.read);
        assert_eq!(svc.unread_count(&user, "user-1").await.unwrap(), 0);
        assert_eq!(svc.list_for_user(&user, "user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_users_cannot_create() {
        let svc = NotificationService::new(Arc::new(InMemoryStore::new()));
        let user = principal("user-1", Role::User);

        let err = svc.create(&user, draft("user-2", "Hello")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
    }

    #[tokio::test]
    async fn test_inbox_is_private() {
        let svc = NotificationService::new(Arc::new(InMemoryStore::new()));
        let owner = principal("owner-1", Role::Owner);
        let admin = principal("admin-1", Role::Superadmin);
        let user = principal("user-1", Role::User);

        let created = svc.create(&owner, draft("user-2", "Welcome")).await.unwrap();

        let err = svc.list_for_user(&user, "user-2").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
        let err = svc.mark_read(&user, &created.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);

        // Superadmins may read, but not acknowledge on someone's behalf.
        assert_eq!(svc.list_for_user(&admin, "user-2").await.unwrap().len(), 1);
        let err = svc.mark_read(&admin, &created.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScopeDenied);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let svc = NotificationService::new(Arc::new(InMemoryStore::new()));
        let owner = principal("owner-1", Role::Owner);

        let err = svc.create(&owner, draft("user-1", "   ")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = svc
            .mark_read(&owner, "missing")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
