//! Connection request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            _ => Err(format!("Invalid connection status: {}", s)),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed connection request. Acceptance makes the pair connected both ways.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub from_member_id: String,
    pub from_name: String,
    pub from_email: String,
    pub to_member_id: String,
    pub to_name: String,
    pub to_email: String,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn involves(&self, member_id: &str) -> bool {
        self.from_member_id == member_id || self.to_member_id == member_id
    }

    /// Id of the member on the other end, if `member_id` is a participant.
    pub fn other_party(&self, member_id: &str) -> Option<&str> {
        if self.from_member_id == member_id {
            Some(&self.to_member_id)
        } else if self.to_member_id == member_id {
            Some(&self.from_member_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendConnectionRequest {
    #[validate(length(min = 1, max = 128, message = "Target member id is required"))]
    pub target_member_id: String,
}

/// Relationship between the caller and another member, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    None,
    Outgoing,
    Incoming,
    Connected,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusResponse {
    pub state: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Connection {
        let now = Utc::now();
        Connection {
            id: Uuid::new_v4(),
            from_member_id: "a".into(),
            from_name: "Ann".into(),
            from_email: "ann@example.com".into(),
            to_member_id: "b".into(),
            to_name: "Bob".into(),
            to_email: "bob@example.com".into(),
            status: ConnectionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_other_party() {
        let conn = sample();
        assert_eq!(conn.other_party("a"), Some("b"));
        assert_eq!(conn.other_party("b"), Some("a"));
        assert_eq!(conn.other_party("c"), None);
        assert!(conn.involves("b"));
        assert!(!conn.involves("c"));
    }

    #[test]
    fn test_status_round_trip_names() {
        assert_eq!(ConnectionStatus::from_str("ACCEPTED").unwrap(), ConnectionStatus::Accepted);
        assert!(ConnectionStatus::from_str("blocked").is_err());
        assert_eq!(ConnectionStatus::Rejected.to_string(), "rejected");
    }
}
