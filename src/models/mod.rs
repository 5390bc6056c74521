mod tenant;

pub use tenant::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical user role values
pub mod user_role {
    pub const ADMINISTRATOR: &str = "administrator";
    pub const SUPERVISOR: &str = "supervisor";
    pub const OPERATOR: &str = "operator";

    pub const ALL: &[&str] = &[ADMINISTRATOR, SUPERVISOR, OPERATOR];

    pub fn is_valid(role: &str) -> bool {
        ALL.contains(&role)
    }
}

/// User represents an authenticated dashboard user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    /// Tenant ids this user may select; empty means access to the whole catalog
    pub tenant_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// LoginRequest for authenticating a user
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub tenant_ids: Vec<String>,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// CreateUserRequest for creating new users
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_user_role")]
    pub role: String,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
}

/// UpdateUserRequest for updating users; password is changed only when set
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_user_role")]
    pub role: String,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_user_role() -> String {
    user_role::OPERATOR.to_string()
}

/// SwitchTenantRequest selects a new active tenant for the session
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchTenantRequest {
    pub tenant_id: String,
}
