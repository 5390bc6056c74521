use std::sync::Arc;
use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::handlers::ApiError;
use crate::models::{SwitchTenantRequest, TenantBranding, TenantBrandingPatch, TenantSettings, TenantSettingsPatch};
use crate::tenancy::SessionSnapshot;
use crate::utils::{is_valid_hex_color, is_valid_time_hhmm};
use crate::AppState;

/// GET /api/session
pub async fn get_session(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// POST /api/session/switch
pub async fn switch_tenant(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwitchTenantRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    if req.tenant_id.is_empty() {
        return Err(ApiError::bad_request("tenant_id is required"));
    }
    state.session.switch_tenant(&req.tenant_id).await?;
    Ok(Json(state.session.snapshot().await))
}

/// POST /api/session/refresh
pub async fn refresh_session(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.session.refresh().await?;
    Ok(Json(state.session.snapshot().await))
}

/// PATCH /api/session/settings
pub async fn update_settings(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<TenantSettingsPatch>,
) -> Result<Json<TenantSettings>, ApiError> {
    if let Some(hours) = &patch.working_hours {
        if !is_valid_time_hhmm(&hours.start) || !is_valid_time_hhmm(&hours.end) {
            return Err(ApiError::bad_request("working hours must be HH:MM times"));
        }
    }
    let settings = state.session.update_settings(&patch).await?;
    Ok(Json(settings))
}

/// PATCH /api/session/branding
pub async fn update_branding(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<TenantBrandingPatch>,
) -> Result<Json<TenantBranding>, ApiError> {
    for color in patch.colors() {
        if !is_valid_hex_color(color) {
            return Err(ApiError::bad_request(format!("Invalid hex color: {}", color)));
        }
    }
    let branding = state.session.update_branding(&patch).await?;
    Ok(Json(branding))
}
