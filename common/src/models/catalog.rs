//! Catalog browsing models: schemas, tables/views and their columns.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Kind of warehouse object the user browses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Base table, listed from `information_schema.tables`.
    #[default]
    #[serde(alias = "Table")]
    Table,
    /// View, listed from `information_schema.views`.
    #[serde(alias = "View")]
    View,
}

impl ObjectType {
    /// The `information_schema` relation that lists objects of this type.
    pub fn catalog_relation(&self) -> &'static str {
        match self {
            ObjectType::Table => "information_schema.tables",
            ObjectType::View => "information_schema.views",
        }
    }

    /// Label shown by the form.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectType::Table => "Table",
            ObjectType::View => "View",
        }
    }
}

/// Query string for listing schemas.
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SchemaQuery {
    /// Environment name.
    #[validate(length(min = 1, message = "Environment is required"))]
    pub environment: String,
}

/// Query string for listing tables or views in a schema.
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ObjectQuery {
    /// Environment name.
    #[validate(length(min = 1, message = "Environment is required"))]
    pub environment: String,
    /// Schema name.
    #[validate(length(min = 1, message = "Schema is required"))]
    pub schema: String,
    /// Object type (`table` or `view`, default `table`).
    #[serde(default)]
    pub object_type: ObjectType,
}

/// Query string for listing an object's columns.
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ColumnQuery {
    /// Environment name.
    #[validate(length(min = 1, message = "Environment is required"))]
    pub environment: String,
    /// Schema name.
    #[validate(length(min = 1, message = "Schema is required"))]
    pub schema: String,
    /// Table or view name.
    #[validate(length(min = 1, message = "Object is required"))]
    pub object: String,
}

/// A table or view in a given environment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ObjectRef {
    /// Environment name.
    #[validate(length(min = 1, message = "Environment is required"))]
    pub environment: String,
    /// Schema name.
    #[validate(length(min = 1, message = "Schema is required"))]
    pub schema: String,
    /// Table or view name.
    #[validate(length(min = 1, message = "Object is required"))]
    pub object: String,
}

impl From<ColumnQuery> for ObjectRef {
    fn from(q: ColumnQuery) -> Self {
        Self {
            environment: q.environment,
            schema: q.schema,
            object: q.object,
        }
    }
}

/// Columns of a table or view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColumnList {
    /// All column names in ordinal order.
    pub columns: Vec<String>,
    /// Columns usable by date range mode.
    pub date_columns: Vec<String>,
}

impl ColumnList {
    /// Splits out the date-like columns: those whose name contains "date",
    /// case-insensitively.
    pub fn new(columns: Vec<String>) -> Self {
        let date_columns = columns
            .iter()
            .filter(|c| c.to_lowercase().contains("date"))
            .cloned()
            .collect();
        Self {
            columns,
            date_columns,
        }
    }
}

/// One month choice for month-to-date filters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthOption {
    /// Month number, 1-12.
    pub number: u32,
    /// Short label ("Jan").
    pub label: String,
}

/// Static choices the form renders before any warehouse call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormOptions {
    /// Environment names.
    pub environments: Vec<String>,
    /// Object type labels.
    pub object_types: Vec<String>,
    /// Retrieval modes (`sql`, `date_range`).
    pub retrieval_modes: Vec<String>,
    /// Date filter types (`custom`, `mtd`, `ytd`).
    pub date_types: Vec<String>,
    /// Month choices.
    pub months: Vec<MonthOption>,
    /// Selectable fiscal years.
    pub fiscal_years: Vec<i32>,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl FormOptions {
    /// Builds the option set for the given environments and fiscal years.
    pub fn new(environments: Vec<String>, fiscal_years: impl IntoIterator<Item = i32>) -> Self {
        Self {
            environments,
            object_types: [ObjectType::Table, ObjectType::View]
                .iter()
                .map(|t| t.label().to_string())
                .collect(),
            retrieval_modes: vec!["sql".into(), "date_range".into()],
            date_types: vec!["custom".into(), "mtd".into(), "ytd".into()],
            months: MONTH_LABELS
                .iter()
                .zip(1..)
                .map(|(label, number)| MonthOption {
                    number,
                    label: label.to_string(),
                })
                .collect(),
            fiscal_years: fiscal_years.into_iter().collect(),
        }
    }
}
