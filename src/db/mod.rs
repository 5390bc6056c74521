pub(crate) mod row_helpers;
pub mod seeds;
mod tenant_data;
mod tenants;
mod users;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::collections::HashMap;

use crate::models::*;

/// Typed error for "resource not found" — enables reliable downcast
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for a tenant-data write that would exceed the tenant's plan
/// storage budget. Maps to the plan-limit-reached API category.
#[derive(Debug)]
pub struct QuotaExceededError {
    pub tenant_id: String,
    pub needed_bytes: i64,
    pub budget_bytes: i64,
}

impl QuotaExceededError {
    pub fn new(tenant_id: &str, needed_bytes: i64, budget_bytes: i64) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            needed_bytes,
            budget_bytes,
        }
    }
}

impl std::fmt::Display for QuotaExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage quota exceeded for tenant {}: {} bytes needed, {} allowed",
            self.tenant_id, self.needed_bytes, self.budget_bytes
        )
    }
}

impl std::error::Error for QuotaExceededError {}

const BYTES_PER_GB: i64 = 1024 * 1024 * 1024;

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with configurable pool size
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_pool_size(db_path, 5).await
    }

    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory store for tests. A single pinned connection: SQLite
    /// in-memory databases vanish with the connection that opened them.
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations and seed the demo catalog
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        self.seed_default_tenants().await?;
        self.seed_default_users().await?;

        Ok(())
    }

    async fn seed_default_tenants(&self) -> Result<()> {
        for tenant in seeds::seed_tenant_records()? {
            tenants::TenantRepo::insert_if_missing(&self.pool, &tenant).await?;
        }
        Ok(())
    }

    async fn seed_default_users(&self) -> Result<()> {
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count.0 > 0 {
            return Ok(());
        }

        for (username, password, email, display_name, role, tenant_ids) in seeds::seed_user_params() {
            let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
                .map_err(|e| anyhow::anyhow!("Failed to hash seed password: {}", e))?;
            let req = CreateUserRequest {
                username: username.to_string(),
                password: String::new(), // hash passed separately
                email: email.to_string(),
                display_name: display_name.to_string(),
                role: role.to_string(),
                tenant_ids: tenant_ids.iter().map(|s| s.to_string()).collect(),
            };
            users::UserRepo::create(&self.pool, &req, &password_hash).await?;
            tracing::info!("Created default user '{}' (role: {})", username, role);
        }

        Ok(())
    }

    // ========== User Operations ==========

    pub async fn list_users(&self) -> Result<Vec<User>> {
        users::UserRepo::list(&self.pool).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        users::UserRepo::get(&self.pool, id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        users::UserRepo::get_by_username(&self.pool, username).await
    }

    pub async fn create_user(&self, req: &CreateUserRequest, password_hash: &str) -> Result<User> {
        users::UserRepo::create(&self.pool, req, password_hash).await
    }

    pub async fn update_user(
        &self,
        id: &str,
        req: &UpdateUserRequest,
        password_hash: Option<&str>,
    ) -> Result<User> {
        users::UserRepo::update(&self.pool, id, req, password_hash).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        users::UserRepo::delete(&self.pool, id).await
    }

    // ========== Tenant Catalog Operations ==========

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        tenants::TenantRepo::list(&self.pool).await
    }

    pub async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>> {
        tenants::TenantRepo::get(&self.pool, id).await
    }

    pub async fn get_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        tenants::TenantRepo::get_by_slug(&self.pool, slug).await
    }

    // ========== Namespaced Tenant Data Operations ==========

    pub async fn get_tenant_data(&self, tenant_id: &str, key: &str) -> Result<Option<serde_json::Value>> {
        tenant_data::TenantDataRepo::get(&self.pool, tenant_id, key).await
    }

    /// Write a value into the tenant's namespace, enforcing the plan storage
    /// budget when the tenant is known to the catalog.
    pub async fn set_tenant_data(
        &self,
        tenant_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        let budget = self
            .get_tenant(tenant_id)
            .await?
            .map(|t| t.limits.max_storage_gb.saturating_mul(BYTES_PER_GB));
        tenant_data::TenantDataRepo::set(&self.pool, tenant_id, key, value, budget).await
    }

    pub async fn remove_tenant_data(&self, tenant_id: &str, key: &str) -> Result<()> {
        tenant_data::TenantDataRepo::remove(&self.pool, tenant_id, key).await
    }

    pub async fn clear_tenant_data(&self, tenant_id: &str) -> Result<u64> {
        tenant_data::TenantDataRepo::clear_all(&self.pool, tenant_id).await
    }

    pub async fn list_tenant_keys(&self, tenant_id: &str) -> Result<Vec<String>> {
        tenant_data::TenantDataRepo::list_keys(&self.pool, tenant_id).await
    }

    pub async fn has_tenant_data(&self, tenant_id: &str) -> Result<bool> {
        Ok(!tenant_data::TenantDataRepo::list_keys(&self.pool, tenant_id)
            .await?
            .is_empty())
    }

    pub async fn export_tenant_data(&self, tenant_id: &str) -> Result<HashMap<String, serde_json::Value>> {
        tenant_data::TenantDataRepo::export(&self.pool, tenant_id).await
    }

    pub async fn tenant_storage_stats(&self, tenant_id: &str) -> Result<TenantStorageStats> {
        tenant_data::TenantDataRepo::stats(&self.pool, tenant_id).await
    }

    // ========== Current Tenant Pointer ==========

    pub async fn get_current_tenant_pointer(&self) -> Result<Option<String>> {
        tenant_data::AppStateRepo::get_current_tenant(&self.pool).await
    }

    pub async fn set_current_tenant_pointer(&self, tenant_id: &str) -> Result<()> {
        tenant_data::AppStateRepo::set_current_tenant(&self.pool, tenant_id).await
    }

    pub async fn clear_current_tenant_pointer(&self) -> Result<()> {
        tenant_data::AppStateRepo::clear_current_tenant(&self.pool).await
    }
}
