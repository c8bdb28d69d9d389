//! Member settings repository.

use sqlx::PgPool;

use crate::entities::MemberSettingsEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, member_id: &str) -> Result<Option<MemberSettingsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_settings");
        let result = sqlx::query_as::<_, MemberSettingsEntity>(
            "SELECT member_id, email_notifications, updated_at FROM member_settings WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether the member accepts emails. Members without a row accept them.
    pub async fn email_opt_in(&self, member_id: &str) -> Result<bool, sqlx::Error> {
        Ok(self
            .find(member_id)
            .await?
            .map_or(true, |s| s.email_notifications))
    }

    pub async fn upsert(
        &self,
        member_id: &str,
        email_notifications: bool,
    ) -> Result<MemberSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_member_settings");
        let result = sqlx::query_as::<_, MemberSettingsEntity>(
            r#"
            INSERT INTO member_settings (member_id, email_notifications, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (member_id) DO UPDATE
            SET email_notifications = EXCLUDED.email_notifications, updated_at = NOW()
            RETURNING member_id, email_notifications, updated_at
            "#,
        )
        .bind(member_id)
        .bind(email_notifications)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
