//! Administrator review models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::member::MemberStatus;

/// Largest number of members accepted in one bulk decision.
pub const MAX_BULK_MEMBERS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    /// Status a pending member moves to.
    pub fn target_status(&self) -> MemberStatus {
        match self {
            ReviewDecision::Approve => MemberStatus::Approved,
            ReviewDecision::Reject => MemberStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDecisionRequest {
    #[validate(length(min = 1, max = 200, message = "Select between 1 and 200 members"))]
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOutcomeKind {
    Processed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub member_id: String,
    pub outcome: BulkOutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDecisionResponse {
    pub processed: usize,
    pub skipped: usize,
    pub results: Vec<BulkOutcome>,
}

impl BulkDecisionResponse {
    pub fn push_processed(&mut self, member_id: &str) {
        self.processed += 1;
        self.results.push(BulkOutcome {
            member_id: member_id.to_string(),
            outcome: BulkOutcomeKind::Processed,
            reason: None,
        });
    }

    pub fn push_skipped(&mut self, member_id: &str, reason: impl Into<String>) {
        self.skipped += 1;
        self.results.push(BulkOutcome {
            member_id: member_id.to_string(),
            outcome: BulkOutcomeKind::Skipped,
            reason: Some(reason.into()),
        });
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminMemberQuery {
    #[serde(default)]
    pub status: Option<MemberStatus>,
}
