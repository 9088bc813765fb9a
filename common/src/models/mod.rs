//! Shared data models for all microservices.

pub mod advisor;
pub mod catalog;
pub mod environment;
pub mod query;

// Re-export commonly used types
pub use advisor::{SqlFixRequest, SqlFixResponse};
pub use catalog::{ColumnList, ColumnQuery, FormOptions, ObjectQuery, ObjectRef, ObjectType, SchemaQuery};
pub use environment::{Environment, EnvironmentItem};
pub use query::{
    ColumnInfo, DateFilter, FetchRequest, FetchResponse, PreviewResponse, QueryResult,
    RetrievalMode,
};
