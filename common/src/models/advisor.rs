//! SQL-fix advisor models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for asking the advisor about a failed query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SqlFixRequest {
    /// Error text returned by the warehouse.
    #[validate(length(min = 1, message = "Error text is required"))]
    pub error: String,

    /// The SQL that failed, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// Advisory fix returned by the advisor. Never applied automatically.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SqlFixResponse {
    /// Suggested fix text.
    pub suggestion: String,
    /// Model that produced the suggestion.
    pub model: String,
}
