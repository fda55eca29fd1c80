//! # Notification Repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aegis_core::types::{Notification, NotificationKind};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, read, created_at";

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    title: String,
    message: String,
    kind: NotificationKind,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: row.kind,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Notification>> {
        let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1");

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Notification::from))
    }

    /// Notifications addressed to `user_id`, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = ?1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    pub async fn unread_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn insert(&self, notification: &Notification) -> DbResult<Notification> {
        debug!(user_id = %notification.user_id, "Inserting notification");

        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, title, message, kind, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(notification.clone())
    }

    /// Marks one notification read. Marking twice is not an error.
    pub async fn mark_read(&self, id: &str) -> DbResult<Notification> {
        debug!(id = %id, "Marking notification read");

        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Notification", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::database;
    use aegis_core::types::NotificationDraft;

    fn draft(user_id: &str, title: &str) -> Notification {
        NotificationDraft {
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: "Your tenant was updated".to_string(),
            kind: Some(NotificationKind::Success),
        }
        .into_notification(Utc::now())
    }

    #[tokio::test]
    async fn test_unread_count_and_mark_read() {
        let db = database().await;
        let repo = db.notifications();

        let first = repo.insert(&draft("u1", "Tenant updated")).await.unwrap();
        repo.insert(&draft("u1", "Company added")).await.unwrap();
        repo.insert(&draft("u2", "Welcome")).await.unwrap();

        assert_eq!(repo.unread_count("u1").await.unwrap(), 2);
        assert_eq!(repo.list_for_user("u1").await.unwrap().len(), 2);

        let read = repo.mark_read(&first.id).await.unwrap();
        assert!(read.read);
        assert_eq!(read.kind, NotificationKind::Success);
        assert_eq!(repo.unread_count("u1").await.unwrap(), 1);

        // Idempotent.
        repo.mark_read(&first.id).await.unwrap();
        assert_eq!(repo.unread_count("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_missing() {
        let db = database().await;
        let err = db.notifications().mark_read("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
