use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cache::NewsCache;
use crate::filter::{filter_by_categories, parse_categories};

pub struct AppState {
    pub cache: Arc<NewsCache>,
    pub serve_stale_on_error: bool,
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

#[derive(Deserialize)]
pub struct NewsQuery {
    pub categories: Option<String>,
}

// Route handlers
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = match state.cache.get_current_news().await {
        Ok(items) => items,
        Err(e) => match state.cache.stale_items() {
            Some(stale) if state.serve_stale_on_error => {
                warn!("Serving stale news after refresh failure: {}", e);
                stale
            }
            _ => return Err(e.into()),
        },
    };

    let categories = parse_categories(query.categories.as_deref());
    Ok(Json(filter_by_categories(&items, &categories)))
}

pub async fn save_preferences(Json(preferences): Json<Value>) -> impl IntoResponse {
    info!("Received preferences: {}", preferences);
    Json(json!({ "success": true }))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
