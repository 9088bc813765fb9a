//! Utility functions and helpers.

pub mod csv_export;
pub mod date_range;
pub mod sql_builder;
pub mod sql_validator;

// Re-export commonly used types
pub use csv_export::{csv_file_name, to_csv};
pub use date_range::DateBounds;
pub use sql_validator::SqlValidator;
