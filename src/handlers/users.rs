use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json};
use crate::{auth::AuthUser, models::*, handlers::{ApiError, created}, AppState};

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

async fn check_tenant_ids(state: &AppState, tenant_ids: &[String]) -> Result<(), ApiError> {
    for id in tenant_ids {
        if state.store.get_tenant(id).await?.is_none() {
            return Err(ApiError::bad_request(format!("Unknown tenant: {}", id)));
        }
    }
    Ok(())
}

pub async fn list_users(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.store.get_user(&id).await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}

pub async fn create_user(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }
    if !user_role::is_valid(&req.role) {
        return Err(ApiError::bad_request(format!("Invalid role: {}", req.role)));
    }
    check_tenant_ids(&state, &req.tenant_ids).await?;
    if state.store.get_user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::conflict("A user with this username already exists"));
    }
    let hash = bcrypt::hash(&req.password, BCRYPT_COST)
        .map_err(|_| ApiError::internal("password hashing error"))?;
    let user = state.store.create_user(&req, &hash).await?;
    Ok(created(user))
}

pub async fn update_user(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    if req.username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if !user_role::is_valid(&req.role) {
        return Err(ApiError::bad_request(format!("Invalid role: {}", req.role)));
    }
    check_tenant_ids(&state, &req.tenant_ids).await?;
    // Check for username uniqueness (excluding self)
    if let Some(existing) = state.store.get_user_by_username(&req.username).await? {
        if existing.id != id {
            return Err(ApiError::conflict("A user with this username already exists"));
        }
    }
    let hash = match &req.password {
        Some(password) if !password.is_empty() => Some(
            bcrypt::hash(password, BCRYPT_COST)
                .map_err(|_| ApiError::internal("password hashing error"))?,
        ),
        _ => None,
    };
    let user = state.store.update_user(&id, &req, hash.as_deref()).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Prevent self-deletion
    if auth.claims.sub == id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }
    state.store.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
