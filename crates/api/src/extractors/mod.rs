//! Custom Axum extractors.

pub mod json;
pub mod session;

pub use json::ValidJson;
pub use session::{AdminMember, ApprovedMember};
