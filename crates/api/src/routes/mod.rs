//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod connections;
pub mod courses;
pub mod directory;
pub mod forum;
pub mod health;
pub mod industries;
pub mod members;
pub mod notifications;
