//! Forum post and comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::WorkflowError;

/// Maximum number of external links attached to a post.
pub const MAX_POST_LINKS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: ForumPost,
    pub comments: Vec<ForumComment>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 20000, message = "Body must be 1-20000 characters"))]
    pub body: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl CreatePostRequest {
    /// Rejects blank text and anything but http(s) links. Blank links are ignored.
    pub fn check(&self) -> Result<(), WorkflowError> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(WorkflowError::Invalid(
                "Please fill in both title and content".to_string(),
            ));
        }
        if self.links.len() > MAX_POST_LINKS {
            return Err(WorkflowError::Invalid(format!(
                "At most {} links are allowed",
                MAX_POST_LINKS
            )));
        }
        for link in self.links.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            let valid = (link.starts_with("https://") || link.starts_with("http://"))
                && link.len() <= 500
                && !link.contains(char::is_whitespace);
            if !valid {
                return Err(WorkflowError::Invalid(format!("Invalid link: {}", link)));
            }
        }
        Ok(())
    }

    /// Trimmed links with blanks dropped.
    pub fn cleaned_links(&self) -> Vec<String> {
        self.links
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub body: String,
}

/// Query parameters for cursor-paginated feeds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}
