//! Request-level services shared by route handlers.

pub mod hosts;
