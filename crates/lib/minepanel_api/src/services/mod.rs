//! Business logic behind the handlers.

pub mod audit;
pub mod auth;
pub mod plugin;
pub mod users;
