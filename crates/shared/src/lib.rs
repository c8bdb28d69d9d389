//! Shared utilities and common types for the Member Portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content hashing for uploaded files
//! - Signed session tokens
//! - Cursor pagination
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod validation;
