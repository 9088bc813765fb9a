//! 数据仓库查询服务
//!
//! 为数据获取表单提供后端能力，包括：
//! - 环境、schema、表/视图的浏览
//! - 对象预览
//! - 自由 SQL 与日期区间（自定义 / MTD / YTD）查询
//! - CSV 导出
//! - SQL 执行失败时获取 AI 修复建议

mod advisor;
mod handlers;
mod routes;
mod service;
mod state;
mod warehouse;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "query-service";
const DEFAULT_PORT: u16 = 8082;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "查询服务 API",
        version = "0.1.0",
        description = "数据仓库查询与导出微服务"
    ),
    paths(
        handlers::form_options,
        handlers::list_environments,
        handlers::list_schemas,
        handlers::list_objects,
        handlers::list_columns,
        handlers::preview,
        handlers::fetch_data,
        handlers::download_csv,
        handlers::health_check,
    ),
    components(schemas(
        common::models::FormOptions,
        common::models::EnvironmentItem,
        common::models::ObjectType,
        common::models::ObjectRef,
        common::models::ColumnList,
        common::models::FetchRequest,
        common::models::RetrievalMode,
        common::models::DateFilter,
        common::models::FetchResponse,
        common::models::PreviewResponse,
        common::models::ColumnInfo,
        handlers::HealthResponse,
    )),
    tags(
        (name = "form", description = "表单选项端点"),
        (name = "catalog", description = "目录浏览端点"),
        (name = "query", description = "查询执行与导出端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let mut config = AppConfig::load_with_service(SERVICE_NAME);
    config.port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    // 创建应用状态
    let state = AppState::new(config.clone())?;
    info!(
        environments = ?state.environments.names(),
        "已加载数据仓库环境"
    );

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
