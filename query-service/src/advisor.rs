//! SQL-fix advisor client.
//!
//! Forwards failed free-form queries to `ai-service` and returns its advisory
//! text.

use async_trait::async_trait;

use common::errors::{AppError, AppResult};
use common::models::advisor::{SqlFixRequest, SqlFixResponse};
use common::response::ApiResponse;

/// Source of advisory fixes for failed SQL.
#[async_trait]
pub trait SqlAdvisor: Send + Sync {
    /// Asks for a suggested fix for `sql` failing with `error`.
    async fn suggest_fix(&self, sql: &str, error: &str) -> AppResult<String>;
}

/// Advisor backed by the `ai-service` HTTP API.
pub struct AiServiceAdvisor {
    ai_service_url: String,
    http_client: reqwest::Client,
}

impl AiServiceAdvisor {
    pub fn new(ai_service_url: String, http_client: reqwest::Client) -> Self {
        Self {
            ai_service_url,
            http_client,
        }
    }
}

#[async_trait]
impl SqlAdvisor for AiServiceAdvisor {
    async fn suggest_fix(&self, sql: &str, error: &str) -> AppResult<String> {
        let url = format!("{}/api/ai/sql-fix", self.ai_service_url.trim_end_matches('/'));
        let body = SqlFixRequest {
            error: error.to_string(),
            sql: Some(sql.to_string()),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("无法连接到 AI 服务: {}", e)))?;

        let status = response.status();
        let envelope: ApiResponse<SqlFixResponse> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("AI 服务返回无效响应 ({}): {}", status, e)))?;

        envelope
            .into_data()
            .map(|fix| fix.suggestion)
            .map_err(|e| AppError::ExternalService(format!("{}: {}", e.code, e.message)))
    }
}
