//! Persistence layer for the Member Portal backend.
//!
//! This crate contains:
//! - Database connection management and transaction retry
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
