//! Repository implementations for database operations.

pub mod connection;
pub mod course;
pub mod forum;
pub mod industry;
pub mod member;
pub mod notification;
pub mod settings;

pub use connection::ConnectionRepository;
pub use course::CourseRepository;
pub use forum::{ForumRepository, NewPost};
pub use industry::IndustryRepository;
pub use member::MemberRepository;
pub use notification::NotificationRepository;
pub use settings::SettingsRepository;
