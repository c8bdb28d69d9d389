//! External service integrations.

pub mod admin_bootstrap;
pub mod cookies;
pub mod email;
pub mod identity;
pub mod images;

pub use cookies::SessionCookie;
pub use email::EmailService;
pub use identity::{GoogleIdentityProvider, IdentityProvider, StaticIdentityProvider};
pub use images::{ImageStore, LocalImageStore};
