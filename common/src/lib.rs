//! Shared building blocks for the warehouse fetcher services.
//!
//! Holds configuration loading, the error type, the response envelope,
//! request middleware, data models and the SQL/CSV helpers used by
//! `query-service` and `ai-service`.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
