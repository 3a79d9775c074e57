//! High-level tree service and its configuration.
//!
//! This module maps requests onto [`crate::storage::TreeStore`] calls and
//! shapes the results; the HTTP layer only adds routing and JSON.

mod api;
mod config;

pub use api::{ServiceError, ServiceResult, TreeService};
pub use config::{
    parse_bind, parse_database_url, AllowedOrigins, ConfigError, Environment, ServiceConfig,
    DEFAULT_BIND_ADDR, DEFAULT_DATABASE_URL,
};
