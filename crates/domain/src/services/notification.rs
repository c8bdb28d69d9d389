//! Notification templates and the outbound mail abstraction.
//!
//! In-app notifications are rows in storage; this module only decides their
//! wording. Emails go through [`MemberMailer`], which is fire-and-forget:
//! a failed send is reported, never propagated.

use crate::models::admin::ReviewDecision;
use crate::models::connection::Connection;
use crate::models::forum::ForumPost;
use crate::models::notification::{NewNotification, NotificationKind};

/// Notification for the target of a new connection request.
pub fn connection_requested(conn: &Connection) -> NewNotification {
    NewNotification {
        member_id: conn.to_member_id.clone(),
        title: "New connection request".to_string(),
        message: format!("{} wants to connect with you", conn.from_name),
        kind: NotificationKind::Connection,
        post_id: None,
    }
}

/// Notification for the sender once their request is accepted.
pub fn connection_accepted(conn: &Connection) -> NewNotification {
    NewNotification {
        member_id: conn.from_member_id.clone(),
        title: "Connection accepted".to_string(),
        message: format!("{} accepted your connection request", conn.to_name),
        kind: NotificationKind::Connection,
        post_id: None,
    }
}

/// Title and message fanned out to every approved member for a new post.
pub fn forum_post_text(post_title: &str, author_name: &str) -> (String, String) {
    (
        "New forum post".to_string(),
        format!("{} posted: {}", author_name, post_title),
    )
}

/// Notification for a post author when someone else comments.
pub fn comment_added(post: &ForumPost, commenter_name: &str) -> NewNotification {
    NewNotification {
        member_id: post.author_id.clone(),
        title: "New comment".to_string(),
        message: format!("{} commented on \"{}\"", commenter_name, post.title),
        kind: NotificationKind::Comment,
        post_id: Some(post.id),
    }
}

/// System notification sent to a member after an administrator review.
pub fn review_decided(member_id: &str, decision: ReviewDecision) -> NewNotification {
    let (title, message) = match decision {
        ReviewDecision::Approve => (
            "Profile approved",
            "Your profile has been approved. You can now browse the directory and forum.",
        ),
        ReviewDecision::Reject => (
            "Profile rejected",
            "Your profile was not approved. Please update it and resubmit.",
        ),
    };
    NewNotification {
        member_id: member_id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        kind: NotificationKind::System,
        post_id: None,
    }
}

/// An email addressed to one member.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Confirmation sent after a course registration.
    pub fn course_registration(to_email: &str, to_name: &str, course_name: &str) -> Self {
        let to_name = if to_name.trim().is_empty() {
            "Participant"
        } else {
            to_name
        };
        Self {
            to_email: to_email.to_string(),
            to_name: to_name.to_string(),
            subject: format!("Registration confirmed: {}", course_name),
            body: format!(
                "Hello {},\n\nYou are registered for {}. We will be in touch with the schedule.\n",
                to_name, course_name
            ),
        }
    }

    /// Outcome of an administrator review.
    pub fn review_decision(to_email: &str, to_name: &str, decision: ReviewDecision, link: &str) -> Self {
        let (subject, line) = match decision {
            ReviewDecision::Approve => (
                "Your membership profile was approved",
                "Your profile has been approved. You now have access to the member directory and forum.",
            ),
            ReviewDecision::Reject => (
                "Your membership profile needs changes",
                "Your profile was not approved. Please update your details and submit it again.",
            ),
        };
        Self {
            to_email: to_email.to_string(),
            to_name: to_name.to_string(),
            subject: subject.to_string(),
            body: format!("Hello {},\n\n{}\n\n{}\n", to_name, line, link),
        }
    }
}

/// Result of a mail send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MailResult {
    Sent,
    /// The member opted out of emails.
    Skipped,
    /// Sending failed; the state change it reports stands.
    Failed(String),
}

/// Outbound email delivery.
#[async_trait::async_trait]
pub trait MemberMailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> MailResult;
}

/// Mailer that only logs. Used in development and tests.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    pub simulate_failure: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl MemberMailer for MockMailer {
    async fn send(&self, message: MailMessage) -> MailResult {
        if self.simulate_failure {
            tracing::warn!(to = %message.to_email, "Mock mailer simulating failure");
            return MailResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            to = %message.to_email,
            subject = %message.subject,
            "Mock: Would send email"
        );
        MailResult::Sent
    }
}

/// Sends unless the member opted out. Never fails the caller.
pub async fn deliver(mailer: &dyn MemberMailer, message: MailMessage, opted_in: bool) -> MailResult {
    if !opted_in {
        tracing::debug!(to = %message.to_email, "Member opted out of email, skipping");
        return MailResult::Skipped;
    }
    let result = mailer.send(message).await;
    if let MailResult::Failed(reason) = &result {
        tracing::warn!(error = %reason, "Email delivery failed");
    }
    result
}
