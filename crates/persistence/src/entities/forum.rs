//! Forum and notification entities.

use chrono::{DateTime, Utc};
use domain::models::forum::{ForumComment, ForumPost};
use domain::models::notification::{Notification, NotificationKind};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ForumPostEntity {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub links: Vec<String>,
    pub author_id: String,
    pub author_name: String,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ForumPostEntity> for ForumPost {
    fn from(e: ForumPostEntity) -> Self {
        Self {
            id: e.id,
            title: e.title,
            body: e.body,
            links: e.links,
            author_id: e.author_id,
            author_name: e.author_name,
            comment_count: e.comment_count,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ForumCommentEntity {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<ForumCommentEntity> for ForumComment {
    fn from(e: ForumCommentEntity) -> Self {
        Self {
            id: e.id,
            post_id: e.post_id,
            author_id: e.author_id,
            author_name: e.author_name,
            body: e.body,
            created_at: e.created_at,
        }
    }
}

/// Database enum for notification_kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
pub enum NotificationKindDb {
    Forum,
    Comment,
    System,
    Connection,
}

impl From<NotificationKindDb> for NotificationKind {
    fn from(db: NotificationKindDb) -> Self {
        match db {
            NotificationKindDb::Forum => NotificationKind::Forum,
            NotificationKindDb::Comment => NotificationKind::Comment,
            NotificationKindDb::System => NotificationKind::System,
            NotificationKindDb::Connection => NotificationKind::Connection,
        }
    }
}

impl From<NotificationKind> for NotificationKindDb {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Forum => NotificationKindDb::Forum,
            NotificationKind::Comment => NotificationKindDb::Comment,
            NotificationKind::System => NotificationKindDb::System,
            NotificationKind::Connection => NotificationKindDb::Connection,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub member_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKindDb,
    pub read: bool,
    pub post_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(e: NotificationEntity) -> Self {
        Self {
            id: e.id,
            member_id: e.member_id,
            title: e.title,
            message: e.message,
            kind: e.kind.into(),
            read: e.read,
            post_id: e.post_id,
            created_at: e.created_at,
        }
    }
}
