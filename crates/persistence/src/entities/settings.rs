//! Member settings entity.

use chrono::{DateTime, Utc};
use domain::models::settings::MemberSettings;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MemberSettingsEntity {
    pub member_id: String,
    pub email_notifications: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberSettingsEntity> for MemberSettings {
    fn from(e: MemberSettingsEntity) -> Self {
        Self {
            member_id: e.member_id,
            email_notifications: e.email_notifications,
            updated_at: e.updated_at,
        }
    }
}
