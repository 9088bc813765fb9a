//! SQL 修复建议服务模块
//!
//! Talks to an OpenAI-compatible chat-completion endpoint. The reply is
//! advisory text only.

use serde::{Deserialize, Serialize};

use common::config::LlmConfig;
use common::errors::{AppError, AppResult};
use common::models::advisor::{SqlFixRequest, SqlFixResponse};

const SYSTEM_PROMPT: &str = "You are an SQL expert helping users debug queries.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// SQL 修复建议服务
pub struct SqlFixService {
    llm: LlmConfig,
    http_client: reqwest::Client,
}

impl SqlFixService {
    /// 创建新的修复建议服务实例
    pub fn new(llm: LlmConfig, http_client: reqwest::Client) -> Self {
        Self { llm, http_client }
    }

    /// 请求大模型给出 SQL 修复建议
    pub async fn suggest(&self, req: &SqlFixRequest) -> AppResult<SqlFixResponse> {
        let api_key = self
            .llm
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalService("OPENAI_API_KEY is not configured".into()))?;

        let body = ChatCompletionRequest {
            model: &self.llm.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(req),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.llm.base_url.trim_end_matches('/'));
        tracing::debug!(model = %self.llm.model, "请求 SQL 修复建议");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("无法连接到大模型服务: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "大模型服务返回 {}: {}",
                status,
                truncate(&text, 500)
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("大模型服务返回无效响应: {}", e)))?;

        let suggestion = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::ExternalService("大模型未返回任何建议".into()))?;

        Ok(SqlFixResponse {
            suggestion,
            model: self.llm.model.clone(),
        })
    }
}

fn user_prompt(req: &SqlFixRequest) -> String {
    match req.sql.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(sql) => format!(
            "Fix the following SQL error: {}\n\nQuery:\n{}",
            req.error, sql
        ),
        None => format!("Fix the following SQL error: {}", req.error),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm(base_url: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(String::from),
            base_url: base_url.to_string(),
            model: "gpt-4".to_string(),
        }
    }

    fn request() -> SqlFixRequest {
        SqlFixRequest {
            error: "relation \"sales.order\" does not exist".into(),
            sql: Some("SELECT * FROM sales.order".into()),
        }
    }

    #[test]
    fn test_user_prompt_includes_sql_when_present() {
        let prompt = user_prompt(&request());
        assert!(prompt.starts_with("Fix the following SQL error: relation"));
        assert!(prompt.ends_with("SELECT * FROM sales.order"));

        let bare = user_prompt(&SqlFixRequest {
            error: "boom".into(),
            sql: None,
        });
        assert_eq!(bare, "Fix the following SQL error: boom");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("错误信息", 2), "错误");
        assert_eq!(truncate("short", 10), "short");
    }

    #[tokio::test]
    async fn test_suggest_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "gpt-4" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Use sales.orders." } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = SqlFixService::new(llm(&server.uri(), Some("sk-test")), reqwest::Client::new());
        let fix = service.suggest(&request()).await.unwrap();

        assert_eq!(fix.suggestion, "Use sales.orders.");
        assert_eq!(fix.model, "gpt-4");

        let received = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(sent["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let service = SqlFixService::new(llm(&server.uri(), Some("sk-test")), reqwest::Client::new());
        let err = service.suggest(&request()).await.unwrap_err();

        match err {
            AppError::ExternalService(msg) => assert!(msg.contains("rate limited")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let service = SqlFixService::new(llm(&server.uri(), Some("sk-test")), reqwest::Client::new());
        assert!(matches!(
            service.suggest(&request()).await,
            Err(AppError::ExternalService(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let service = SqlFixService::new(llm("http://127.0.0.1:9", None), reqwest::Client::new());
        assert!(matches!(
            service.suggest(&request()).await,
            Err(AppError::ExternalService(_))
        ));
    }
}
