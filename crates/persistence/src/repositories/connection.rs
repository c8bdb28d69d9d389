//! Connection repository.

use domain::models::connection::{Connection, ConnectionStatus};
use domain::models::member::Member;
use domain::services::notification::{connection_accepted, connection_requested};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::with_retry;
use crate::entities::{ConnectionEntity, ConnectionStatusDb};
use crate::metrics::QueryTimer;
use crate::repositories::notification::insert_on;

const CONNECTION_COLUMNS: &str = "id, from_member_id, from_name, from_email, \
     to_member_id, to_name, to_email, status, created_at, updated_at";

#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_connection_by_id");
        let sql = format!("SELECT {} FROM connections WHERE id = $1", CONNECTION_COLUMNS);
        let result = sqlx::query_as::<_, ConnectionEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// The record for the unordered pair `(a, b)`, in any direction and status.
    pub async fn find_between(&self, a: &str, b: &str) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_connection_between");
        let sql = format!(
            "SELECT {} FROM connections \
             WHERE (from_member_id = $1 AND to_member_id = $2) \
                OR (from_member_id = $2 AND to_member_id = $1)",
            CONNECTION_COLUMNS
        );
        let result = sqlx::query_as::<_, ConnectionEntity>(&sql)
            .bind(a)
            .bind(b)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Creates a pending request and notifies the target in one transaction.
    ///
    /// A second request for the same pair, in either direction, fails with a
    /// unique violation on the pair index.
    pub async fn create_request(&self, from: &Member, to: &Member) -> Result<ConnectionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_connection_request");
        let result = with_retry("create_connection_request", || self.create_request_once(from, to)).await;
        timer.record();
        result
    }

    async fn create_request_once(&self, from: &Member, to: &Member) -> Result<ConnectionEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO connections (from_member_id, from_name, from_email, to_member_id, to_name, to_email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        );
        let entity = sqlx::query_as::<_, ConnectionEntity>(&sql)
            .bind(&from.id)
            .bind(from.display_name())
            .bind(from.email())
            .bind(&to.id)
            .bind(to.display_name())
            .bind(to.email())
            .fetch_one(&mut *tx)
            .await?;

        let conn: Connection = entity.clone().into();
        insert_on(&mut *tx, &connection_requested(&conn)).await?;

        tx.commit().await?;
        Ok(entity)
    }

    /// Accepts or rejects a pending request addressed to `responder_id`.
    ///
    /// Acceptance notifies the sender in the same transaction. Returns `None`
    /// if the request is not pending or not addressed to the responder.
    pub async fn respond(
        &self,
        id: Uuid,
        responder_id: &str,
        status: ConnectionStatus,
    ) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("respond_connection_request");
        let result = with_retry("respond_connection_request", || {
            self.respond_once(id, responder_id, status)
        })
        .await;
        timer.record();
        result
    }

    async fn respond_once(
        &self,
        id: Uuid,
        responder_id: &str,
        status: ConnectionStatus,
    ) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE connections
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND to_member_id = $2 AND status = 'pending'
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        );
        let updated = sqlx::query_as::<_, ConnectionEntity>(&sql)
            .bind(id)
            .bind(responder_id)
            .bind(ConnectionStatusDb::from(status))
            .fetch_optional(&mut *tx)
            .await?;

        let Some(entity) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        if status == ConnectionStatus::Accepted {
            let conn: Connection = entity.clone().into();
            insert_on(&mut *tx, &connection_accepted(&conn)).await?;
        }

        tx.commit().await?;
        Ok(Some(entity))
    }

    /// Pending and accepted records where the member is either side.
    pub async fn list_for_member(&self, member_id: &str) -> Result<Vec<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_member_connections");
        let sql = format!(
            "SELECT {} FROM connections \
             WHERE (from_member_id = $1 OR to_member_id = $1) \
               AND status IN ('pending', 'accepted') \
             ORDER BY updated_at DESC, id",
            CONNECTION_COLUMNS
        );
        let result = sqlx::query_as::<_, ConnectionEntity>(&sql)
            .bind(member_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// True if an accepted record exists for the unordered pair.
    pub async fn is_connected(&self, a: &str, b: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_connected");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM connections
                WHERE status = 'accepted'
                  AND ((from_member_id = $1 AND to_member_id = $2)
                    OR (from_member_id = $2 AND to_member_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ids of members with an accepted connection to `member_id`.
    pub async fn connected_member_ids(&self, member_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("connected_member_ids");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT CASE WHEN from_member_id = $1 THEN to_member_id ELSE from_member_id END
            FROM connections
            WHERE status = 'accepted' AND (from_member_id = $1 OR to_member_id = $1)
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
