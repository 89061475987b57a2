//! Shared utilities and common types for the registration backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT validation for actor tokens
//! - Cursor pagination for registration listings
//! - Common validation and sanitising helpers

pub mod jwt;
pub mod pagination;
pub mod validation;
