use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::collections::HashMap;

use crate::auth::AuthUser;
use crate::handlers::ApiError;
use crate::models::{tenant_status, Tenant, TenantStorageStats};
use crate::AppState;

/// Resolve the tenant and reject requests against tenants that must not
/// serve data: suspended (locked), inactive (forbidden), or trial tenants
/// whose trial has lapsed (plan limit). An `X-Tenant-ID` header, when
/// present, must match the path tenant.
async fn ensure_tenant_access(
    state: &AppState,
    headers: &HeaderMap,
    tenant_id: &str,
) -> Result<Tenant, ApiError> {
    if let Some(header) = headers.get("x-tenant-id") {
        let header = header.to_str().unwrap_or_default();
        if header != tenant_id {
            return Err(ApiError::bad_request(
                "X-Tenant-ID header does not match the requested tenant",
            ));
        }
    }

    let tenant = state
        .store
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant"))?;

    match tenant.status.as_str() {
        tenant_status::SUSPENDED => {
            return Err(ApiError::locked(format!("Tenant {} is suspended", tenant.id)));
        }
        tenant_status::INACTIVE => {
            return Err(ApiError::forbidden(format!("Tenant {} is inactive", tenant.id)));
        }
        tenant_status::TRIAL => {
            if let Some(ends_at) = tenant.trial_ends_at {
                if ends_at < chrono::Utc::now() {
                    return Err(ApiError::plan_limit(format!(
                        "Trial for tenant {} has expired",
                        tenant.id
                    )));
                }
            }
        }
        _ => {}
    }

    Ok(tenant)
}

/// GET /api/tenants/:id/data/:key
pub async fn get_value(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((tenant_id, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    let value = state
        .store
        .get_tenant_data(&tenant_id, &key)
        .await?
        .ok_or_else(|| ApiError::not_found("Key"))?;
    Ok(Json(value))
}

/// PUT /api/tenants/:id/data/:key
pub async fn put_value(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((tenant_id, key)): Path<(String, String)>,
    headers: HeaderMap,
    Json(value): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    if key.is_empty() {
        return Err(ApiError::bad_request("key is required"));
    }
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    state.store.set_tenant_data(&tenant_id, &key, &value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/tenants/:id/data/:key
pub async fn delete_value(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((tenant_id, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    state.store.remove_tenant_data(&tenant_id, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tenants/:id/data
pub async fn list_keys(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    let keys = state.store.list_tenant_keys(&tenant_id).await?;
    Ok(Json(keys))
}

/// DELETE /api/tenants/:id/data
pub async fn clear_data(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    if state.store.has_tenant_data(&tenant_id).await? {
        let removed = state.store.clear_tenant_data(&tenant_id).await?;
        tracing::info!("Cleared {} stored keys for tenant {}", removed, tenant_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tenants/:id/data-export
pub async fn export_data(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HashMap<String, serde_json::Value>>, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    let export = state.store.export_tenant_data(&tenant_id).await?;
    Ok(Json(export))
}

/// GET /api/tenants/:id/storage-stats
pub async fn storage_stats(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TenantStorageStats>, ApiError> {
    ensure_tenant_access(&state, &headers, &tenant_id).await?;
    let stats = state.store.tenant_storage_stats(&tenant_id).await?;
    Ok(Json(stats))
}
