//! Domain layer for the Member Portal backend.
//!
//! This crate contains:
//! - Domain models (Member, Course, Connection, ForumPost, Notification, Industry)
//! - Workflow rules (profile lifecycle, connection requests, notification fan-out)
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;

pub use errors::{Requirement, WorkflowError};
