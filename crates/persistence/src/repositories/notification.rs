//! Notification repository.
//!
//! Every query is scoped by `member_id`; one member can never read or mark
//! another member's notifications.

use chrono::{DateTime, Utc};
use domain::models::notification::NewNotification;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{NotificationEntity, NotificationKindDb};
use crate::metrics::QueryTimer;

/// Inserts a notification on an open connection or transaction.
pub(crate) async fn insert_on(
    conn: &mut PgConnection,
    notification: &NewNotification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications (member_id, title, message, kind, post_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&notification.member_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(NotificationKindDb::from(notification.kind))
    .bind(notification.post_id)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("create_notification");
        let mut conn = self.pool.acquire().await?;
        let result = insert_on(&mut *conn, notification).await;
        timer.record();
        result
    }

    /// Newest first. `before` is the `(created_at, id)` of the last row seen.
    /// Fetches `limit + 1` rows so the caller can tell if more exist.
    pub async fn list(
        &self,
        member_id: &str,
        before: Option<(DateTime<Utc>, Uuid)>,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications");
        let (before_at, before_id) = before.unzip();
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT id, member_id, title, message, kind, read, post_id, created_at
            FROM notifications
            WHERE member_id = $1
              AND ($2::timestamptz IS NULL OR (created_at, id) < ($2, $3))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(member_id)
        .bind(before_at)
        .bind(before_id)
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn unread_count(&self, member_id: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_notifications");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE member_id = $1 AND read = false",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks one notification read. Returns false if it is not the member's.
    pub async fn mark_read(&self, id: Uuid, member_id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_read");
        let result = sqlx::query("UPDATE notifications SET read = true WHERE id = $1 AND member_id = $2")
            .bind(id)
            .bind(member_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Marks all of the member's unread notifications read.
    pub async fn mark_all_read(&self, member_id: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_all_notifications_read");
        let result = sqlx::query(
            "UPDATE notifications SET read = true WHERE member_id = $1 AND read = false",
        )
        .bind(member_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
