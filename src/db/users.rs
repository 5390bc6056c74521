use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::models::*;

fn map_user_row(row: &SqliteRow) -> User {
    let tenant_ids: String = row.get("tenant_ids");
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        tenant_ids: serde_json::from_str(&tenant_ids).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User database operations
pub struct UserRepo;

impl UserRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY username")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_user_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn get_by_username(pool: &Pool<Sqlite>, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        req: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, display_name, password_hash, role, tenant_ids, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.username)
        .bind(&req.email)
        .bind(&req.display_name)
        .bind(password_hash)
        .bind(&req.role)
        .bind(serde_json::to_string(&req.tenant_ids)?)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, &id)
            .await?
            .context("User not found after creation")
    }

    pub async fn update(
        pool: &Pool<Sqlite>,
        id: &str,
        req: &UpdateUserRequest,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let now = Utc::now();
        let result = if let Some(hash) = password_hash {
            sqlx::query(
                r#"
                UPDATE users SET username = ?, email = ?, display_name = ?, role = ?,
                                 tenant_ids = ?, password_hash = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&req.username)
            .bind(&req.email)
            .bind(&req.display_name)
            .bind(&req.role)
            .bind(serde_json::to_string(&req.tenant_ids)?)
            .bind(hash)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE users SET username = ?, email = ?, display_name = ?, role = ?,
                                 tenant_ids = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&req.username)
            .bind(&req.email)
            .bind(&req.display_name)
            .bind(&req.role)
            .bind(serde_json::to_string(&req.tenant_ids)?)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("User", id).into());
        }

        Self::get(pool, id)
            .await?
            .context("User not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("User", id).into());
        }
        Ok(())
    }
}
