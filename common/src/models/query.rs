//! Query models: retrieval modes, results and fetch responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::catalog::ObjectRef;

/// Row cap applied to object previews.
pub const PREVIEW_ROW_LIMIT: u32 = 100;

/// Row cap of the lookup that reads an object's column headers.
pub const COLUMN_PROBE_LIMIT: u32 = 1;

/// Number of rows rendered in the result table.
pub const DISPLAY_ROWS: usize = 20;

/// Date filter of a date range query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DateFilter {
    /// Inclusive custom range.
    Custom { start: NaiveDate, end: NaiveDate },
    /// Month-to-date for a month of a fiscal year.
    Mtd { month: u32, fiscal_year: i32 },
    /// Year-to-date for a fiscal year (April to March).
    Ytd { fiscal_year: i32 },
}

/// How the data is retrieved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Free-form SQL typed by the user.
    Sql { sql: String },
    /// Template query bounded on a date column.
    DateRange {
        date_column: String,
        filter: DateFilter,
    },
}

/// Request body for fetching data.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FetchRequest {
    /// Selected environment, schema and object.
    #[serde(flatten)]
    #[validate(nested)]
    pub target: ObjectRef,

    /// Retrieval mode.
    #[serde(flatten)]
    pub mode: RetrievalMode,
}

/// Result of a query execution, fully materialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QueryResult {
    /// Column information, in result order.
    pub columns: Vec<ColumnInfo>,

    /// Row data (each row is a vector of JSON values).
    pub rows: Vec<Vec<serde_json::Value>>,

    /// Query execution time in milliseconds.
    #[serde(default)]
    pub execution_time_ms: u64,
}

/// Column information in query result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Warehouse type name (e.g. "INT4", "VARCHAR").
    pub data_type: String,
}

impl QueryResult {
    /// Number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[Vec<serde_json::Value>] {
        &self.rows[..self.rows.len().min(n)]
    }
}

/// Preview of a table or view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreviewResponse {
    /// Result columns.
    pub columns: Vec<ColumnInfo>,
    /// First rows of the preview.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Rows fetched by the capped preview query.
    pub row_count: usize,
    /// Starting text for the ad-hoc SQL editor.
    pub default_sql: String,
}

/// Outcome of a successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetchResponse {
    /// SQL that was executed.
    pub sql: String,
    /// Result columns.
    pub columns: Vec<ColumnInfo>,
    /// First rows of the result.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Total number of rows returned.
    pub row_count: usize,
    /// Query execution time in milliseconds.
    pub execution_time_ms: u64,
    /// Download file name; present only when the result is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_file_name: Option<String>,
}
