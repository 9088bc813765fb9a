//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/options", get(handlers::form_options))
        .route("/api/environments", get(handlers::list_environments))
        .route("/api/schemas", get(handlers::list_schemas))
        .route("/api/objects", get(handlers::list_objects))
        .route("/api/columns", get(handlers::list_columns))
        .route("/api/preview", post(handlers::preview))
        .route("/api/fetch", post(handlers::fetch_data))
        .route("/api/fetch/csv", post(handlers::download_csv))
        .route("/api/health", get(handlers::health_check))
}
