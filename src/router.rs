use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>, frontend_dir: &str) -> Router {
    Router::new()
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        // User routes
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users", post(handlers::users::create_user))
        .route("/api/users/:id", get(handlers::users::get_user))
        .route("/api/users/:id", put(handlers::users::update_user))
        .route("/api/users/:id", delete(handlers::users::delete_user))
        // Tenant catalog routes
        .route("/api/tenants", get(handlers::tenants::list_tenants))
        .route("/api/tenants/by-slug/:slug", get(handlers::tenants::get_tenant_by_slug))
        .route("/api/tenants/:id", get(handlers::tenants::get_tenant))
        // Session routes
        .route("/api/session", get(handlers::session::get_session))
        .route("/api/session/switch", post(handlers::session::switch_tenant))
        .route("/api/session/refresh", post(handlers::session::refresh_session))
        .route("/api/session/settings", patch(handlers::session::update_settings))
        .route("/api/session/branding", patch(handlers::session::update_branding))
        // Tenant data routes
        .route("/api/tenants/:id/data", get(handlers::tenant_data::list_keys))
        .route("/api/tenants/:id/data", delete(handlers::tenant_data::clear_data))
        .route("/api/tenants/:id/data-export", get(handlers::tenant_data::export_data))
        .route("/api/tenants/:id/storage-stats", get(handlers::tenant_data::storage_stats))
        .route("/api/tenants/:id/data/:key", get(handlers::tenant_data::get_value))
        .route("/api/tenants/:id/data/:key", put(handlers::tenant_data::put_value))
        .route("/api/tenants/:id/data/:key", delete(handlers::tenant_data::delete_value))
        // Theme routes
        .route("/api/theme", get(handlers::theme::get_theme))
        .route("/api/theme.css", get(handlers::theme::get_theme_css))
        // Health check
        .route("/api/health", get(handlers::healthcheck))
        // Static files (frontend)
        .nest_service("/assets", ServeDir::new(format!("{}/assets", frontend_dir)))
        .fallback_service(ServeDir::new(frontend_dir).fallback(
            tower_http::services::ServeFile::new(format!("{}/index.html", frontend_dir)),
        ))
        // Add state and middleware
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
