//! # Tenant Repository
//!
//! `companies_count` is not a column: it is computed on every read so it
//! can never drift from the companies table.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aegis_core::types::{RecordStatus, Tenant};

const TENANT_SELECT: &str = r#"
    SELECT
        t.id,
        t.name,
        t.description,
        t.data_quota_gb,
        t.status,
        (SELECT COUNT(*) FROM companies c WHERE c.tenant_id = t.id) AS companies_count,
        t.created_at,
        t.updated_at
    FROM tenants t
"#;

#[derive(Debug, FromRow)]
struct TenantRow {
    id: String,
    name: String,
    description: Option<String>,
    data_quota_gb: i64,
    status: RecordStatus,
    companies_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            description: row.description,
            data_quota_gb: row.data_quota_gb,
            status: row.status,
            companies_count: row.companies_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
}

impl TenantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TenantRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Tenant>> {
        let sql = format!("{TENANT_SELECT} WHERE t.id = ?1");

        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Tenant::from))
    }

    /// Lists all tenants sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Tenant>> {
        let sql = format!("{TENANT_SELECT} ORDER BY t.name");

        let rows = sqlx::query_as::<_, TenantRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    pub async fn insert(&self, tenant: &Tenant) -> DbResult<Tenant> {
        debug!(name = %tenant.name, "Inserting tenant");

        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, name, description, data_quota_gb, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.description)
        .bind(tenant.data_quota_gb)
        .bind(tenant.status)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Tenant {
            companies_count: 0,
            ..tenant.clone()
        })
    }

    pub async fn update(&self, tenant: &Tenant) -> DbResult<Tenant> {
        debug!(id = %tenant.id, "Updating tenant");

        let result = sqlx::query(
            r#"
            UPDATE tenants SET
                name = ?2,
                description = ?3,
                data_quota_gb = ?4,
                status = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.description)
        .bind(tenant.data_quota_gb)
        .bind(tenant.status)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", &tenant.id));
        }

        self.get(&tenant.id)
            .await?
            .ok_or_else(|| DbError::not_found("Tenant", &tenant.id))
    }

    /// Deletes a tenant.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - the tenant still owns companies
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting tenant");

        let result = sqlx::query("DELETE FROM tenants WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", id));
        }

        Ok(())
    }
}
