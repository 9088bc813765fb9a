//! Handler模块

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::middleware::RequestId;
use common::models::advisor::{SqlFixRequest, SqlFixResponse};
use common::response::ApiResponse;
use crate::service::SqlFixService;
use crate::state::AppState;

const SERVICE_NAME: &str = "ai-service";

/// 获取 SQL 错误修复建议
#[utoipa::path(
    post,
    path = "/api/ai/sql-fix",
    tag = "ai",
    request_body = SqlFixRequest,
    responses(
        (status = 200, description = "修复建议", body = ApiResponse<SqlFixResponse>),
        (status = 400, description = "校验错误"),
        (status = 502, description = "大模型服务不可用")
    )
)]
pub async fn suggest_sql_fix(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<SqlFixRequest>,
) -> Result<Json<ApiResponse<SqlFixResponse>>, AppError> {
    req.validate()?;
    let service = SqlFixService::new(state.llm.clone(), state.http_client.clone());
    let data = service.suggest(&req).await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
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
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.llm.api_key.is_some(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Whether an API key for the chat-completion provider is set.
    pub llm_configured: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware, Router,
    };
    use common::config::{AppConfig, LlmConfig};
    use common::middleware::request_id_middleware;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::routes::router;
    use crate::state::AppState;

    fn app(base_url: &str) -> Router {
        let state = AppState::new(
            AppConfig::default(),
            LlmConfig {
                api_key: Some("sk-test".into()),
                base_url: base_url.to_string(),
                model: "gpt-4".into(),
            },
        )
        .unwrap();
        router()
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(state)
    }

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ai/sql-fix")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_sql_fix_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Quote the column name." } }]
            })))
            .mount(&server)
            .await;

        let mut request = post(json!({ "error": "syntax error at or near \"user\"" }));
        request
            .headers_mut()
            .insert("x-request-id", "fix-7".parse().unwrap());
        let response = app(&server.uri())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["suggestion"], "Quote the column name.");
        assert_eq!(body["meta"]["service"], "ai-service");
        assert_eq!(body["meta"]["request_id"], "fix-7");
    }

    #[tokio::test]
    async fn test_blank_error_is_rejected() {
        let response = app("http://127.0.0.1:9")
            .oneshot(post(json!({ "error": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(post(json!({ "error": "boom", "sql": "SELECT" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE");
    }
}
