//! service-core: shared infrastructure for the relay services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
