//! SQL templates for catalog lookups and data retrieval.
//!
//! User input never reaches the SQL text as raw interpolation: identifiers
//! are quoted, catalog filters are bind parameters (`$1`, `$2`) and dates are
//! typed values rendered as `DATE` literals.

use chrono::NaiveDate;

use crate::models::catalog::ObjectType;
use crate::utils::date_range::DateBounds;

/// Lists every schema that owns at least one table or view.
pub const LIST_SCHEMAS_SQL: &str = "SELECT DISTINCT CAST(table_schema AS VARCHAR) AS table_schema \
     FROM information_schema.tables ORDER BY 1";

/// Lists tables or views in schema `$1`.
pub fn list_objects(object_type: ObjectType) -> String {
    format!(
        "SELECT CAST(table_name AS VARCHAR) AS table_name FROM {} \
         WHERE table_schema = $1 ORDER BY 1",
        object_type.catalog_relation()
    )
}

/// Quotes an identifier, doubling embedded double quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"schema"."object"`.
pub fn qualified_name(schema: &str, object: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(object))
}

/// Capped `SELECT *` over an object, used for previews, for reading column
/// headers and as the default text of the ad-hoc SQL editor.
pub fn select_limited(schema: &str, object: &str, limit: u32) -> String {
    format!("SELECT * FROM {} LIMIT {};", qualified_name(schema, object), limit)
}

/// `SELECT *` bounded on a date column.
pub fn select_date_range(schema: &str, object: &str, column: &str, bounds: &DateBounds) -> String {
    let table = qualified_name(schema, object);
    let column = quote_ident(column);
    if bounds.end_inclusive {
        format!(
            "SELECT * FROM {} WHERE {} BETWEEN {} AND {};",
            table,
            column,
            date_literal(bounds.start),
            date_literal(bounds.end)
        )
    } else {
        format!(
            "SELECT * FROM {} WHERE {} >= {} AND {} < {};",
            table,
            column,
            date_literal(bounds.start),
            column,
            date_literal(bounds.end)
        )
    }
}

fn date_literal(date: NaiveDate) -> String {
    format!("DATE '{}'", date.format("%Y-%m-%d"))
}
