//! Request handlers.

pub mod audit;
pub mod auth;
pub mod health;
pub mod mc;
pub mod users;
