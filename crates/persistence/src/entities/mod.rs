//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod connection;
pub mod course;
pub mod forum;
pub mod member;
pub mod settings;

pub use connection::{ConnectionEntity, ConnectionStatusDb};
pub use course::{CourseEnrollmentEntity, CourseEntity, IndustryEntity};
pub use forum::{ForumCommentEntity, ForumPostEntity, NotificationEntity, NotificationKindDb};
pub use member::{EmploymentStatusDb, MemberEntity, MemberRoleDb, MemberStatusDb};
pub use settings::MemberSettingsEntity;
