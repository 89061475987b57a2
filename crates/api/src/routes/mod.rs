//! HTTP route handlers.

pub mod blocks;
pub mod health;
pub mod manage;
pub mod register;
pub mod registrations;
pub mod settings;
