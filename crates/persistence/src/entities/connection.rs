//! Connection entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::connection::{Connection, ConnectionStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for connection_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "connection_status", rename_all = "lowercase")]
pub enum ConnectionStatusDb {
    Pending,
    Accepted,
    Rejected,
}

impl From<ConnectionStatusDb> for ConnectionStatus {
    fn from(db: ConnectionStatusDb) -> Self {
        match db {
            ConnectionStatusDb::Pending => ConnectionStatus::Pending,
            ConnectionStatusDb::Accepted => ConnectionStatus::Accepted,
            ConnectionStatusDb::Rejected => ConnectionStatus::Rejected,
        }
    }
}

impl From<ConnectionStatus> for ConnectionStatusDb {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Pending => ConnectionStatusDb::Pending,
            ConnectionStatus::Accepted => ConnectionStatusDb::Accepted,
            ConnectionStatus::Rejected => ConnectionStatusDb::Rejected,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ConnectionEntity {
    pub id: Uuid,
    pub from_member_id: String,
    pub from_name: String,
    pub from_email: String,
    pub to_member_id: String,
    pub to_name: String,
    pub to_email: String,
    pub status: ConnectionStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConnectionEntity> for Connection {
    fn from(e: ConnectionEntity) -> Self {
        Self {
            id: e.id,
            from_member_id: e.from_member_id,
            from_name: e.from_name,
            from_email: e.from_email,
            to_member_id: e.to_member_id,
            to_name: e.to_name,
            to_email: e.to_email,
            status: e.status.into(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
