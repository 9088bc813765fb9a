//! CSV export of query results.

use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::models::query::QueryResult;

/// Download file name for an object's export.
pub fn csv_file_name(schema: &str, object: &str) -> String {
    format!("{}_{}.csv", schema, object)
}

/// Serializes a result as CSV: a header of column names, then one record per
/// row. `NULL` becomes an empty field.
pub fn to_csv(result: &QueryResult) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(result.columns.iter().map(|c| c.name.as_str()))
        .map_err(csv_error)?;
    for row in &result.rows {
        writer
            .write_record(row.iter().map(cell_text))
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV write failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::ColumnInfo;
    use serde_json::json;

    fn column(name: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            data_type: "TEXT".into(),
        }
    }

    #[test]
    fn test_csv_file_name() {
        assert_eq!(csv_file_name("sales", "orders"), "sales_orders.csv");
    }

    #[test]
    fn test_to_csv_quotes_and_nulls() {
        let result = QueryResult {
            columns: vec![column("id"), column("note"), column("paid")],
            rows: vec![
                vec![json!(1), json!("plain"), json!(true)],
                vec![json!(2), json!("has, comma"), Value::Null],
            ],
            execution_time_ms: 3,
        };

        let text = String::from_utf8(to_csv(&result).unwrap()).unwrap();
        assert_eq!(text, "id,note,paid\n1,plain,true\n2,\"has, comma\",\n");
    }
}
