//! Administrator bootstrap.
//!
//! Administrators are members whose stored role is `admin`. The configured
//! bootstrap emails are promoted at startup (for existing records) and at
//! sign-in (for records created later).

use persistence::repositories::MemberRepository;
use tracing::info;

use crate::config::AdminConfig;

/// Promotes existing members whose email is in the bootstrap list.
pub async fn bootstrap_admins(
    members: &MemberRepository,
    config: &AdminConfig,
) -> Result<u64, sqlx::Error> {
    let emails: Vec<String> = config
        .bootstrap_emails
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    if emails.is_empty() {
        return Ok(0);
    }

    let promoted = members.promote_by_emails(&emails).await?;
    if promoted > 0 {
        info!(promoted = promoted, "Promoted bootstrap administrators");
    }
    Ok(promoted)
}
