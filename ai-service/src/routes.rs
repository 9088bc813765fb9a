//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/sql-fix", post(handlers::suggest_sql_fix))
        .route("/api/health", get(handlers::health_check))
}
