//! 数据获取服务模块
//!
//! Each operation opens one warehouse connection, runs its lookup or query
//! and closes the connection before returning, on success and on failure.

use std::ops::RangeInclusive;
use std::sync::Arc;

use common::config::EnvironmentRegistry;
use common::errors::{AppError, AppResult};
use common::models::catalog::{ColumnList, FormOptions, ObjectRef, ObjectType};
use common::models::environment::{Environment, EnvironmentItem};
use common::models::query::{
    FetchRequest, FetchResponse, PreviewResponse, QueryResult, RetrievalMode, COLUMN_PROBE_LIMIT,
    DISPLAY_ROWS, PREVIEW_ROW_LIMIT,
};
use common::utils::sql_builder::{self, LIST_SCHEMAS_SQL};
use common::utils::{csv_file_name, to_csv, DateBounds, SqlValidator};

use crate::advisor::SqlAdvisor;
use crate::state::AppState;
use crate::warehouse::{Warehouse, WarehouseSession};

/// CSV payload ready for download.
#[derive(Debug)]
pub struct CsvExport {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// 数据获取服务
pub struct FetchService {
    environments: Arc<EnvironmentRegistry>,
    warehouse: Arc<dyn Warehouse>,
    advisor: Arc<dyn SqlAdvisor>,
    fiscal_years: RangeInclusive<i32>,
}

impl FetchService {
    /// 创建新的数据获取服务实例
    pub fn new(state: &AppState) -> Self {
        Self {
            environments: state.environments.clone(),
            warehouse: state.warehouse.clone(),
            advisor: state.advisor.clone(),
            fiscal_years: state.config.fiscal_years(),
        }
    }

    /// Static form choices.
    pub fn options(&self) -> FormOptions {
        FormOptions::new(self.environments.names(), self.fiscal_years.clone())
    }

    /// Configured environments without credentials.
    pub fn environments(&self) -> Vec<EnvironmentItem> {
        self.environments.all().iter().map(EnvironmentItem::from).collect()
    }

    /// 列出 schema
    pub async fn schemas(&self, environment: &str) -> AppResult<Vec<String>> {
        let mut session = self.open(environment).await?;
        let result = session.fetch_strings(LIST_SCHEMAS_SQL, &[]).await;
        session.close().await;
        result
    }

    /// 列出 schema 下的表或视图
    pub async fn objects(
        &self,
        environment: &str,
        schema: &str,
        object_type: ObjectType,
    ) -> AppResult<Vec<String>> {
        let sql = sql_builder::list_objects(object_type);
        let mut session = self.open(environment).await?;
        let result = session.fetch_strings(&sql, &[schema]).await;
        session.close().await;
        result
    }

    /// 列出对象的列及其中的日期列
    pub async fn columns(&self, target: &ObjectRef) -> AppResult<ColumnList> {
        let mut session = self.open(&target.environment).await?;
        let result = Self::column_list(session.as_mut(), target).await;
        session.close().await;
        result
    }

    /// 预览对象的前若干行
    pub async fn preview(&self, target: &ObjectRef) -> AppResult<PreviewResponse> {
        let default_sql = sql_builder::select_limited(&target.schema, &target.object, PREVIEW_ROW_LIMIT);

        let mut session = self.open(&target.environment).await?;
        let outcome = session.query(&default_sql).await;
        session.close().await;

        let result = outcome.map_err(|e| match e {
            AppError::DatabaseQuery(message) => AppError::SqlExecution {
                message: format!("Error fetching preview: {}", message),
                suggestion: None,
            },
            other => other,
        })?;

        Ok(PreviewResponse {
            columns: result.columns.clone(),
            rows: result.head(DISPLAY_ROWS).to_vec(),
            row_count: result.row_count(),
            default_sql,
        })
    }

    /// 执行所选检索模式并返回预览
    pub async fn fetch(&self, req: &FetchRequest) -> AppResult<FetchResponse> {
        let (sql, result) = self.run(req).await?;

        let csv_file_name =
            (!result.is_empty()).then(|| csv_file_name(&req.target.schema, &req.target.object));

        Ok(FetchResponse {
            sql,
            columns: result.columns.clone(),
            rows: result.head(DISPLAY_ROWS).to_vec(),
            row_count: result.row_count(),
            execution_time_ms: result.execution_time_ms,
            csv_file_name,
        })
    }

    /// 执行所选检索模式并导出 CSV；结果为空时不提供下载
    pub async fn export_csv(&self, req: &FetchRequest) -> AppResult<CsvExport> {
        let (_, result) = self.run(req).await?;
        if result.is_empty() {
            return Err(AppError::EmptyResult);
        }

        Ok(CsvExport {
            file_name: csv_file_name(&req.target.schema, &req.target.object),
            content: to_csv(&result)?,
        })
    }

    /// Runs the request's retrieval mode, returning the executed SQL and its result.
    async fn run(&self, req: &FetchRequest) -> AppResult<(String, QueryResult)> {
        match &req.mode {
            RetrievalMode::Sql { sql } => self.run_sql(&req.target, sql).await,
            RetrievalMode::DateRange {
                date_column,
                filter,
            } => {
                let bounds = filter.bounds(&self.fiscal_years)?;
                let mut session = self.open(&req.target.environment).await?;
                let outcome =
                    Self::run_date_range(session.as_mut(), &req.target, date_column, &bounds).await;
                session.close().await;
                outcome
            }
        }
    }

    /// Date range template over a verified date-like column. Execution
    /// errors are reported without consulting the advisor.
    async fn run_date_range(
        session: &mut dyn WarehouseSession,
        target: &ObjectRef,
        date_column: &str,
        bounds: &DateBounds,
    ) -> AppResult<(String, QueryResult)> {
        let columns = Self::column_list(session, target).await?;
        if columns.date_columns.is_empty() {
            return Err(AppError::NoDateColumns(format!(
                "{}.{}",
                target.schema, target.object
            )));
        }
        if !columns.date_columns.iter().any(|c| c == date_column) {
            return Err(AppError::Validation(format!(
                "'{}' is not a date column of {}.{}",
                date_column, target.schema, target.object
            )));
        }

        let sql = sql_builder::select_date_range(&target.schema, &target.object, date_column, bounds);
        match session.query(&sql).await {
            Ok(result) => Ok((sql, result)),
            Err(AppError::DatabaseQuery(message)) => Err(AppError::SqlExecution {
                message,
                suggestion: None,
            }),
            Err(other) => Err(other),
        }
    }

    /// Free-form SQL; failures are sent to the advisor for a suggested fix.
    async fn run_sql(&self, target: &ObjectRef, sql: &str) -> AppResult<(String, QueryResult)> {
        SqlValidator::validate(sql)?;
        if !SqlValidator::is_select(sql) {
            tracing::warn!(environment = %target.environment, "执行非 SELECT 语句");
        }

        let mut session = self.open(&target.environment).await?;
        let outcome = session.query(sql).await;
        session.close().await;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    environment = %target.environment,
                    rows = result.row_count(),
                    elapsed_ms = result.execution_time_ms,
                    "SQL 执行完成"
                );
                Ok((sql.to_string(), result))
            }
            Err(AppError::DatabaseQuery(message)) => {
                let suggestion = self.advise(sql, &message).await;
                Err(AppError::SqlExecution {
                    message,
                    suggestion,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Asks the advisor for a fix. Advisor failures never replace the SQL error.
    async fn advise(&self, sql: &str, error: &str) -> Option<String> {
        match self.advisor.suggest_fix(sql, error).await {
            Ok(suggestion) => Some(suggestion),
            Err(e) => {
                tracing::warn!(error = %e, "获取 SQL 修复建议失败");
                None
            }
        }
    }

    /// Reads column headers from a one-row select rather than the catalog, so
    /// late-binding views are covered as well.
    async fn column_list(
        session: &mut dyn WarehouseSession,
        target: &ObjectRef,
    ) -> AppResult<ColumnList> {
        let sql = sql_builder::select_limited(&target.schema, &target.object, COLUMN_PROBE_LIMIT);
        let result = session.query(&sql).await.map_err(|e| match e {
            AppError::DatabaseQuery(message) => AppError::SqlExecution {
                message: format!(
                    "Error reading columns of {}.{}: {}",
                    target.schema, target.object, message
                ),
                suggestion: None,
            },
            other => other,
        })?;
        Ok(ColumnList::new(
            result.columns.into_iter().map(|c| c.name).collect(),
        ))
    }

    fn environment(&self, name: &str) -> AppResult<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| AppError::EnvironmentNotFound(name.to_string()))
    }

    async fn open(&self, environment: &str) -> AppResult<Box<dyn WarehouseSession>> {
        let env = self.environment(environment)?;
        self.warehouse.connect(env).await
    }
}
