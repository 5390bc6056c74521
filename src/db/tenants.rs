use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use super::row_helpers::none_if_empty;
use crate::models::*;

fn map_tenant_row(row: &SqliteRow) -> Result<Tenant> {
    let id: String = row.get("id");
    let branding: String = row.get("branding");
    let settings: String = row.get("settings");
    let limits: String = row.get("limits");

    let status: String = row.get("status");
    if !tenant_status::is_valid(&status) {
        tracing::warn!("Tenant {} has unrecognized status '{}'", id, status);
    }
    let plan_type: String = row.get("plan_type");
    if !tenant_plan::is_valid(&plan_type) {
        tracing::warn!("Tenant {} has unrecognized plan '{}'", id, plan_type);
    }

    Ok(Tenant {
        branding: serde_json::from_str(&branding)
            .with_context(|| format!("Malformed branding document for tenant {}", id))?,
        settings: serde_json::from_str(&settings)
            .with_context(|| format!("Malformed settings document for tenant {}", id))?,
        limits: serde_json::from_str(&limits)
            .with_context(|| format!("Malformed limits document for tenant {}", id))?,
        id,
        name: row.get("name"),
        slug: row.get("slug"),
        display_name: row.get("display_name"),
        description: none_if_empty(row.get("description")),
        status,
        plan_type,
        trial_ends_at: row.get("trial_ends_at"),
        created_at: row.get("created_at"),
        contact_email: none_if_empty(row.get("contact_email")),
        contact_phone: none_if_empty(row.get("contact_phone")),
        address: none_if_empty(row.get("address")),
    })
}

/// Tenant catalog operations. The catalog is seed-defined and read-only at
/// runtime; settings/branding patches never touch these rows.
pub struct TenantRepo;

impl TenantRepo {
    /// List the catalog in id order. "First available" fallbacks depend on
    /// this ordering, so it must not follow created_at (the demo catalog's
    /// oldest tenant is not its first).
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY id")
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_tenant_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_tenant_row).transpose()
    }

    pub async fn get_by_slug(pool: &Pool<Sqlite>, slug: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_tenant_row).transpose()
    }

    /// Insert a catalog entry if no tenant with that id exists yet.
    /// Used by the seed routine; existing rows are left untouched so
    /// operator edits to the catalog survive restarts.
    pub async fn insert_if_missing(pool: &Pool<Sqlite>, tenant: &Tenant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, display_name, description, status, plan_type,
                                 branding, settings, limits, contact_email, contact_phone, address,
                                 trial_ends_at, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM tenants WHERE id = ?)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.display_name)
        .bind(tenant.description.as_deref().unwrap_or(""))
        .bind(&tenant.status)
        .bind(&tenant.plan_type)
        .bind(serde_json::to_string(&tenant.branding)?)
        .bind(serde_json::to_string(&tenant.settings)?)
        .bind(serde_json::to_string(&tenant.limits)?)
        .bind(tenant.contact_email.as_deref().unwrap_or(""))
        .bind(tenant.contact_phone.as_deref().unwrap_or(""))
        .bind(tenant.address.as_deref().unwrap_or(""))
        .bind(tenant.trial_ends_at)
        .bind(tenant.created_at)
        .bind(&tenant.id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Store;

    #[tokio::test]
    async fn test_catalog_lists_in_id_order() {
        let store = Store::in_memory().await.unwrap();

        let ids: Vec<String> = store
            .list_tenants()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        // tenant-004 is the oldest record; id order must still win
        assert_eq!(ids, ["tenant-001", "tenant-002", "tenant-003", "tenant-004"]);
    }
}
