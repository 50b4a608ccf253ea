//! HTTP handlers.

pub mod home;
pub mod system;
