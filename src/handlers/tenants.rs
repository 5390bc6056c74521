use std::sync::Arc;
use axum::{extract::{Path, State}, Json};
use crate::{auth::AuthUser, models::Tenant, handlers::ApiError, AppState};

/// GET /api/tenants - the full tenant catalog
pub async fn list_tenants(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    let tenants = state.store.list_tenants().await?;
    Ok(Json(tenants))
}

/// GET /api/tenants/by-slug/:slug
pub async fn get_tenant_by_slug(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state.store.get_tenant_by_slug(&slug).await?
        .ok_or_else(|| ApiError::not_found("Tenant"))?;
    Ok(Json(tenant))
}

/// GET /api/tenants/:id
pub async fn get_tenant(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state.store.get_tenant(&id).await?
        .ok_or_else(|| ApiError::not_found("Tenant"))?;
    Ok(Json(tenant))
}
