//! Forum repository: posts, comments and post fan-out.

use chrono::{DateTime, Utc};
use domain::models::notification::NewNotification;
use domain::services::notification::forum_post_text;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::with_retry;
use crate::entities::{ForumCommentEntity, ForumPostEntity};
use crate::metrics::QueryTimer;
use crate::repositories::notification::insert_on;

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.body, p.links, p.author_id,
           COALESCE(NULLIF(m.full_name, ''), m.email) AS author_name,
           (SELECT COUNT(*) FROM forum_comments c WHERE c.post_id = p.id) AS comment_count,
           p.created_at, p.updated_at
    FROM forum_posts p
    JOIN members m ON m.id = p.author_id
"#;

/// A post to insert.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub links: &'a [String],
    pub author_id: &'a str,
    pub author_name: &'a str,
}

#[derive(Clone)]
pub struct ForumRepository {
    pool: PgPool,
}

impl ForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a post and, in the same transaction, one `forum`
    /// notification per approved member other than the author.
    ///
    /// Returns the post and the number of notifications written.
    pub async fn create_post_with_fanout(
        &self,
        post: &NewPost<'_>,
    ) -> Result<(ForumPostEntity, u64), sqlx::Error> {
        let timer = QueryTimer::new("create_post_with_fanout");
        let result = with_retry("create_post_with_fanout", || self.create_post_once(post)).await;
        timer.record();
        result
    }

    async fn create_post_once(&self, post: &NewPost<'_>) -> Result<(ForumPostEntity, u64), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO forum_posts (title, body, links, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post.title)
        .bind(post.body)
        .bind(post.links)
        .bind(post.author_id)
        .fetch_one(&mut *tx)
        .await?;

        let (title, message) = forum_post_text(post.title, post.author_name);
        let notified = sqlx::query(
            r#"
            INSERT INTO notifications (member_id, title, message, kind, post_id)
            SELECT m.id, $1, $2, 'forum', $3
            FROM members m
            WHERE m.status = 'approved' AND m.id <> $4
            "#,
        )
        .bind(title)
        .bind(message)
        .bind(id)
        .bind(post.author_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sql = format!("{} WHERE p.id = $1", POST_SELECT);
        let created = sqlx::query_as::<_, ForumPostEntity>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((created, notified))
    }

    /// Newest first, keyset-paginated on `(created_at, id)`. Fetches `limit + 1`.
    pub async fn list_posts(
        &self,
        before: Option<(DateTime<Utc>, Uuid)>,
        limit: i64,
    ) -> Result<Vec<ForumPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_forum_posts");
        let (before_at, before_id) = before.unzip();
        let sql = format!(
            "{} WHERE ($1::timestamptz IS NULL OR (p.created_at, p.id) < ($1, $2)) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $3",
            POST_SELECT
        );
        let result = sqlx::query_as::<_, ForumPostEntity>(&sql)
            .bind(before_at)
            .bind(before_id)
            .bind(limit + 1)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_post(&self, id: Uuid) -> Result<Option<ForumPostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_forum_post");
        let sql = format!("{} WHERE p.id = $1", POST_SELECT);
        let result = sqlx::query_as::<_, ForumPostEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Deletes a post; its comments go with it.
    pub async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_forum_post");
        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Comments on a post, oldest first.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<ForumCommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_forum_comments");
        let result = sqlx::query_as::<_, ForumCommentEntity>(
            r#"
            SELECT c.id, c.post_id, c.author_id,
                   COALESCE(NULLIF(m.full_name, ''), m.email) AS author_name,
                   c.body, c.created_at
            FROM forum_comments c
            JOIN members m ON m.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_comment(&self, id: Uuid) -> Result<Option<ForumCommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_forum_comment");
        let result = sqlx::query_as::<_, ForumCommentEntity>(
            r#"
            SELECT c.id, c.post_id, c.author_id,
                   COALESCE(NULLIF(m.full_name, ''), m.email) AS author_name,
                   c.body, c.created_at
            FROM forum_comments c
            JOIN members m ON m.id = c.author_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Adds a comment and, if given, the post author's notification.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: &str,
        body: &str,
        notify: Option<&NewNotification>,
    ) -> Result<ForumCommentEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_forum_comment");
        let result = with_retry("add_forum_comment", || {
            self.add_comment_once(post_id, author_id, body, notify)
        })
        .await;
        timer.record();
        result
    }

    async fn add_comment_once(
        &self,
        post_id: Uuid,
        author_id: &str,
        body: &str,
        notify: Option<&NewNotification>,
    ) -> Result<ForumCommentEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, ForumCommentEntity>(
            r#"
            WITH inserted AS (
                INSERT INTO forum_comments (post_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, body, created_at
            )
            SELECT i.id, i.post_id, i.author_id,
                   COALESCE(NULLIF(m.full_name, ''), m.email) AS author_name,
                   i.body, i.created_at
            FROM inserted i
            JOIN members m ON m.id = i.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(notification) = notify {
            insert_on(&mut *tx, notification).await?;
        }

        tx.commit().await?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_forum_comment");
        let result = sqlx::query("DELETE FROM forum_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
