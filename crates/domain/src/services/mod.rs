//! Domain services for the Member Portal.
//!
//! Services contain workflow rules that operate on domain models.

pub mod connections;
pub mod directory;
pub mod export;
pub mod lifecycle;
pub mod notification;

pub use lifecycle::{LifecyclePolicy, EDIT_LOCK_DAYS};
pub use notification::{MailMessage, MailResult, MemberMailer, MockMailer};
