//! Per-member preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSettings {
    pub member_id: String,
    /// Whether the member receives transactional emails.
    pub email_notifications: bool,
    pub updated_at: DateTime<Utc>,
}

impl MemberSettings {
    /// Settings used for members that never saved any.
    pub fn defaults_for(member_id: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            email_notifications: true,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    pub email_notifications: Option<bool>,
}
