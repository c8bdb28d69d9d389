//! Connection request rules.
//!
//! Each unordered pair of members has at most one connection record:
//! `none -> pending -> accepted | rejected`.

use crate::errors::WorkflowError;
use crate::models::connection::{Connection, ConnectionState, ConnectionStatus};
use crate::models::member::Member;

/// Checks that `requester` may send a request to `target`.
///
/// `existing` is any record for the pair, in either direction and any status.
pub fn check_new_request(
    requester: &Member,
    target: &Member,
    existing: Option<&Connection>,
) -> Result<(), WorkflowError> {
    if requester.id == target.id {
        return Err(WorkflowError::Invalid(
            "You cannot connect with yourself".to_string(),
        ));
    }
    if !requester.is_approved() {
        return Err(WorkflowError::Forbidden(
            "Only approved members can send connection requests".to_string(),
        ));
    }
    if !target.is_approved() {
        return Err(WorkflowError::NotFound("Member not found".to_string()));
    }
    if let Some(conn) = existing {
        return Err(WorkflowError::Conflict(format!(
            "A connection request already exists between these members (status: {})",
            conn.status
        )));
    }
    Ok(())
}

/// Only the target of a pending request may accept or reject it.
pub fn check_response(conn: &Connection, responder_id: &str) -> Result<(), WorkflowError> {
    if conn.to_member_id != responder_id {
        return Err(WorkflowError::Forbidden(
            "Only the recipient can respond to a connection request".to_string(),
        ));
    }
    if conn.status != ConnectionStatus::Pending {
        return Err(WorkflowError::Conflict(format!(
            "Connection request is already {}",
            conn.status
        )));
    }
    Ok(())
}

/// True if the record is an accepted connection between `a` and `b`, in either direction.
pub fn connects(conn: &Connection, a: &str, b: &str) -> bool {
    conn.status == ConnectionStatus::Accepted
        && ((conn.from_member_id == a && conn.to_member_id == b)
            || (conn.from_member_id == b && conn.to_member_id == a))
}

/// Describes the pair's record from the viewer's side.
pub fn state_for(conn: Option<&Connection>, viewer_id: &str) -> ConnectionState {
    match conn {
        None => ConnectionState::None,
        Some(c) => match c.status {
            ConnectionStatus::Accepted => ConnectionState::Connected,
            ConnectionStatus::Rejected => ConnectionState::Rejected,
            ConnectionStatus::Pending if c.from_member_id == viewer_id => ConnectionState::Outgoing,
            ConnectionStatus::Pending => ConnectionState::Incoming,
        },
    }
}
