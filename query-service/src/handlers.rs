//! Handler模块

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::middleware::RequestId;
use common::models::catalog::{ColumnList, ColumnQuery, FormOptions, ObjectQuery, ObjectRef, SchemaQuery};
use common::models::environment::EnvironmentItem;
use common::models::query::{FetchRequest, FetchResponse, PreviewResponse};
use common::response::ApiResponse;
use crate::service::FetchService;
use crate::state::AppState;

const SERVICE_NAME: &str = "query-service";

/// 表单选项（环境、月份、财年等）
#[utoipa::path(
    get,
    path = "/api/options",
    tag = "form",
    responses(
        (status = 200, description = "表单选项", body = ApiResponse<FormOptions>)
    )
)]
pub async fn form_options(State(state): State<AppState>) -> Json<ApiResponse<FormOptions>> {
    let data = FetchService::new(&state).options();
    Json(ApiResponse::ok_with_service(data, SERVICE_NAME))
}

/// 列出已配置的数据仓库环境
#[utoipa::path(
    get,
    path = "/api/environments",
    tag = "form",
    responses(
        (status = 200, description = "环境列表", body = ApiResponse<Vec<EnvironmentItem>>)
    )
)]
pub async fn list_environments(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<EnvironmentItem>>> {
    let data = FetchService::new(&state).environments();
    Json(ApiResponse::ok_with_service(data, SERVICE_NAME))
}

/// 列出环境中的 schema
#[utoipa::path(
    get,
    path = "/api/schemas",
    tag = "catalog",
    params(SchemaQuery),
    responses(
        (status = 200, description = "schema 列表", body = ApiResponse<Vec<String>>),
        (status = 404, description = "环境未找到")
    )
)]
pub async fn list_schemas(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<SchemaQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    query.validate()?;
    let data = FetchService::new(&state).schemas(&query.environment).await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

/// 列出 schema 下的表或视图
#[utoipa::path(
    get,
    path = "/api/objects",
    tag = "catalog",
    params(ObjectQuery),
    responses(
        (status = 200, description = "表或视图列表", body = ApiResponse<Vec<String>>),
        (status = 404, description = "环境未找到")
    )
)]
pub async fn list_objects(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ObjectQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    query.validate()?;
    let data = FetchService::new(&state)
        .objects(&query.environment, &query.schema, query.object_type)
        .await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

/// 列出对象的列及日期列
#[utoipa::path(
    get,
    path = "/api/columns",
    tag = "catalog",
    params(ColumnQuery),
    responses(
        (status = 200, description = "列信息", body = ApiResponse<ColumnList>),
        (status = 404, description = "环境未找到")
    )
)]
pub async fn list_columns(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ColumnQuery>,
) -> Result<Json<ApiResponse<ColumnList>>, AppError> {
    query.validate()?;
    let target = ObjectRef::from(query);
    let data = FetchService::new(&state).columns(&target).await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

/// 预览表或视图
#[utoipa::path(
    post,
    path = "/api/preview",
    tag = "query",
    request_body = ObjectRef,
    responses(
        (status = 200, description = "预览结果", body = ApiResponse<PreviewResponse>),
        (status = 422, description = "预览查询失败")
    )
)]
pub async fn preview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<ObjectRef>,
) -> Result<Json<ApiResponse<PreviewResponse>>, AppError> {
    req.validate()?;
    let data = FetchService::new(&state).preview(&req).await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

/// 按所选模式获取数据
#[utoipa::path(
    post,
    path = "/api/fetch",
    tag = "query",
    request_body = FetchRequest,
    responses(
        (status = 200, description = "查询执行成功", body = ApiResponse<FetchResponse>),
        (status = 400, description = "SQL 无效或校验错误"),
        (status = 422, description = "SQL 执行失败（附修复建议）或对象无日期列")
    )
)]
pub async fn fetch_data(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<ApiResponse<FetchResponse>>, AppError> {
    req.validate()?;
    let data = FetchService::new(&state).fetch(&req).await?;
    let elapsed = data.execution_time_ms;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME)
            .with_request_id(request_id.as_str())
            .with_duration(elapsed),
    ))
}

/// 按所选模式获取数据并下载 CSV
#[utoipa::path(
    post,
    path = "/api/fetch/csv",
    tag = "query",
    request_body = FetchRequest,
    responses(
        (status = 200, description = "CSV 文件", content_type = "text/csv", body = String),
        (status = 404, description = "结果为空，无可下载内容")
    )
)]
pub async fn download_csv(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Response, AppError> {
    req.validate()?;
    let export = FetchService::new(&state).export_csv(&req).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.file_name.replace(['"', '\\'], "_")
    ))
    .map_err(|e| AppError::Internal(format!("invalid file name: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
