//! Domain models for the Member Portal.

pub mod admin;
pub mod connection;
pub mod course;
pub mod forum;
pub mod industry;
pub mod member;
pub mod notification;
pub mod settings;

pub use admin::{BulkDecisionRequest, BulkDecisionResponse, ReviewDecision};
pub use connection::{Connection, ConnectionState, ConnectionStatus};
pub use course::{Course, CourseWithEnrollment};
pub use forum::{ForumComment, ForumPost, PostWithComments};
pub use industry::Industry;
pub use member::{
    DirectoryEntry, EmploymentStatus, Member, MemberRole, MemberStatus, NewMember,
    UpdateProfileRequest,
};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use settings::MemberSettings;
