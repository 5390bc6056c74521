use anyhow::Result;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;

use super::QuotaExceededError;
use crate::models::TenantStorageStats;

/// Namespaced per-tenant key/value storage. Isolation comes from the
/// (tenant_id, key) composite primary key: operations under one tenant id
/// can never read or write another tenant's rows.
pub struct TenantDataRepo;

impl TenantDataRepo {
    /// Read a value. A stored document that no longer parses is treated as
    /// absent (logged, not surfaced) so a corrupt override can never wedge
    /// the caller.
    pub async fn get(
        pool: &Pool<Sqlite>,
        tenant_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM tenant_data WHERE tenant_id = ? AND key = ?")
                .bind(tenant_id)
                .bind(key)
                .fetch_optional(pool)
                .await?;

        match row {
            Some((raw,)) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!(
                        "Discarding malformed stored value for {}:{}: {}",
                        tenant_id,
                        key,
                        e
                    );
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Upsert a value. When a byte budget is given the write is rejected with
    /// a typed QuotaExceededError once the tenant's total stored size would
    /// exceed it.
    pub async fn set(
        pool: &Pool<Sqlite>,
        tenant_id: &str,
        key: &str,
        value: &serde_json::Value,
        budget_bytes: Option<i64>,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;

        if let Some(budget) = budget_bytes {
            let used: (i64,) = sqlx::query_as(
                "SELECT COALESCE(SUM(LENGTH(value)), 0) FROM tenant_data WHERE tenant_id = ?",
            )
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;
            let replaced: (i64,) = sqlx::query_as(
                "SELECT COALESCE(LENGTH(value), 0) FROM tenant_data WHERE tenant_id = ? AND key = ?",
            )
            .bind(tenant_id)
            .bind(key)
            .fetch_optional(pool)
            .await?
            .unwrap_or((0,));

            let projected = used.0 - replaced.0 + raw.len() as i64;
            if projected > budget {
                return Err(QuotaExceededError::new(tenant_id, projected, budget).into());
            }
        }

        sqlx::query(
            r#"
            INSERT INTO tenant_data (tenant_id, key, value, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT (tenant_id, key)
            DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(tenant_id)
        .bind(key)
        .bind(&raw)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn remove(pool: &Pool<Sqlite>, tenant_id: &str, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM tenant_data WHERE tenant_id = ? AND key = ?")
            .bind(tenant_id)
            .bind(key)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove every key in this tenant's namespace. Other tenants and the
    /// global current-tenant pointer are untouched.
    pub async fn clear_all(pool: &Pool<Sqlite>, tenant_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tenant_data WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_keys(pool: &Pool<Sqlite>, tenant_id: &str) -> Result<Vec<String>> {
        let keys: Vec<String> =
            sqlx::query_scalar("SELECT key FROM tenant_data WHERE tenant_id = ? ORDER BY key")
                .bind(tenant_id)
                .fetch_all(pool)
                .await?;
        Ok(keys)
    }

    pub async fn export(
        pool: &Pool<Sqlite>,
        tenant_id: &str,
    ) -> Result<HashMap<String, serde_json::Value>> {
        let rows = sqlx::query("SELECT key, value FROM tenant_data WHERE tenant_id = ?")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

        let mut data = HashMap::new();
        for row in &rows {
            let key: String = row.get("key");
            let raw: String = row.get("value");
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    data.insert(key, value);
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed value {}:{} in export: {}", tenant_id, key, e);
                }
            }
        }
        Ok(data)
    }

    pub async fn stats(pool: &Pool<Sqlite>, tenant_id: &str) -> Result<TenantStorageStats> {
        let (item_count, size_bytes): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(value)), 0) FROM tenant_data WHERE tenant_id = ?",
        )
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

        Ok(TenantStorageStats {
            item_count,
            size_bytes,
            keys: Self::list_keys(pool, tenant_id).await?,
        })
    }
}

/// The single global "last active tenant" pointer. Lives in the one-row
/// app_state table, outside every tenant namespace, so clear_all can never
/// remove it.
pub struct AppStateRepo;

impl AppStateRepo {
    pub async fn get_current_tenant(pool: &Pool<Sqlite>) -> Result<Option<String>> {
        let row: (Option<String>,) =
            sqlx::query_as("SELECT current_tenant_id FROM app_state WHERE id = 1")
                .fetch_one(pool)
                .await?;
        Ok(row.0.filter(|s| !s.is_empty()))
    }

    pub async fn set_current_tenant(pool: &Pool<Sqlite>, tenant_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE app_state SET current_tenant_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = 1",
        )
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn clear_current_tenant(pool: &Pool<Sqlite>) -> Result<()> {
        sqlx::query(
            "UPDATE app_state SET current_tenant_id = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = 1",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{QuotaExceededError, Store};
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let value = json!({"theme": "dark", "pinned": ["M-001", "M-002"], "count": 3});

        store.set_tenant_data("tenant-001", "prefs", &value).await.unwrap();
        let read = store.get_tenant_data("tenant-001", "prefs").await.unwrap();
        assert_eq!(read, Some(value));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let store = Store::in_memory().await.unwrap();
        let read = store.get_tenant_data("tenant-001", "nothing-here").await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let store = Store::in_memory().await.unwrap();

        store
            .set_tenant_data("tenant-001", "settings", &json!({"currency": "COP"}))
            .await
            .unwrap();
        store
            .set_tenant_data("tenant-002", "settings", &json!({"currency": "MXN"}))
            .await
            .unwrap();

        let a = store.get_tenant_data("tenant-001", "settings").await.unwrap();
        assert_eq!(a, Some(json!({"currency": "COP"})));
    }

    #[tokio::test]
    async fn test_clear_all_spares_other_tenants_and_pointer() {
        let store = Store::in_memory().await.unwrap();

        store.set_tenant_data("tenant-001", "a", &json!(1)).await.unwrap();
        store.set_tenant_data("tenant-001", "b", &json!(2)).await.unwrap();
        store.set_tenant_data("tenant-002", "a", &json!(3)).await.unwrap();
        store.set_current_tenant_pointer("tenant-002").await.unwrap();

        let removed = store.clear_tenant_data("tenant-001").await.unwrap();
        assert_eq!(removed, 2);

        assert!(store.list_tenant_keys("tenant-001").await.unwrap().is_empty());
        assert_eq!(
            store.get_tenant_data("tenant-002", "a").await.unwrap(),
            Some(json!(3))
        );
        assert_eq!(
            store.get_current_tenant_pointer().await.unwrap(),
            Some("tenant-002".to_string())
        );
    }

    #[tokio::test]
    async fn test_malformed_value_reads_as_absent() {
        let store = Store::in_memory().await.unwrap();

        sqlx::query("INSERT INTO tenant_data (tenant_id, key, value) VALUES (?, ?, ?)")
            .bind("tenant-001")
            .bind("broken")
            .bind("{not json")
            .execute(store.pool())
            .await
            .unwrap();

        let read = store.get_tenant_data("tenant-001", "broken").await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn test_quota_rejects_oversized_write() {
        let store = Store::in_memory().await.unwrap();
        // tenant-000 is seeded by the test fixture with a zero-GB storage budget
        crate::db::seeds::insert_zero_quota_tenant(&store).await.unwrap();

        let err = store
            .set_tenant_data("tenant-000", "settings", &serde_json::json!({"k": "v"}))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<QuotaExceededError>().is_some());

        // the rejected write must leave nothing behind
        assert!(store.list_tenant_keys("tenant-000").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pointer_lifecycle() {
        let store = Store::in_memory().await.unwrap();

        assert_eq!(store.get_current_tenant_pointer().await.unwrap(), None);
        store.set_current_tenant_pointer("tenant-003").await.unwrap();
        assert_eq!(
            store.get_current_tenant_pointer().await.unwrap(),
            Some("tenant-003".to_string())
        );
        store.clear_current_tenant_pointer().await.unwrap();
        assert_eq!(store.get_current_tenant_pointer().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stats_and_export() {
        let store = Store::in_memory().await.unwrap();

        store.set_tenant_data("tenant-001", "branding", &json!({"primary_color": "#111111"})).await.unwrap();
        store.set_tenant_data("tenant-001", "settings", &json!({"currency": "USD"})).await.unwrap();

        let stats = store.tenant_storage_stats("tenant-001").await.unwrap();
        assert_eq!(stats.item_count, 2);
        assert!(stats.size_bytes > 0);
        assert_eq!(stats.keys, vec!["branding".to_string(), "settings".to_string()]);

        let export = store.export_tenant_data("tenant-001").await.unwrap();
        assert_eq!(export.len(), 2);
        assert_eq!(export["settings"], json!({"currency": "USD"}));
    }
}
