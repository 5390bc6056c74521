use std::sync::Arc;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::branding::AppliedTheme;
use crate::AppState;

/// GET /api/theme - the applied theme for the active tenant
pub async fn get_theme(State(state): State<Arc<AppState>>) -> Json<AppliedTheme> {
    Json(state.theme.snapshot().await)
}

/// GET /api/theme.css - the theme variables as a stylesheet
pub async fn get_theme_css(State(state): State<Arc<AppState>>) -> Response {
    let css = state.theme.render_css().await;
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response()
}
