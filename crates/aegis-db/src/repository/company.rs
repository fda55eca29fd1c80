//! # Company Repository
//!
//! Companies always belong to a tenant; the foreign key rejects orphans.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aegis_core::types::{Company, CompanySize, RecordStatus};

const COMPANY_COLUMNS: &str = "id, tenant_id, name, description, status, industry, size, \
     website, address, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: String,
    tenant_id: String,
    name: String,
    description: Option<String>,
    status: RecordStatus,
    industry: Option<String>,
    size: Option<CompanySize>,
    website: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            status: row.status,
            industry: row.industry,
            size: row.size,
            website: row.website,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1");

        let row = sqlx::query_as::<_, CompanyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Company::from))
    }

    /// Lists companies, optionally only those of one tenant, sorted by name.
    pub async fn list(&self, tenant_id: Option<&str>) -> DbResult<Vec<Company>> {
        let rows = match tenant_id {
            Some(tenant_id) => {
                let sql = format!(
                    "SELECT {COMPANY_COLUMNS} FROM companies WHERE tenant_id = ?1 ORDER BY name"
                );
                sqlx::query_as::<_, CompanyRow>(&sql)
                    .bind(tenant_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name");
                sqlx::query_as::<_, CompanyRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Company::from).collect())
    }

    pub async fn insert(&self, company: &Company) -> DbResult<Company> {
        debug!(name = %company.name, tenant_id = %company.tenant_id, "Inserting company");

        sqlx::query(
            r#"
            INSERT INTO companies (
                id, tenant_id, name, description, status,
                industry, size, website, address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&company.id)
        .bind(&company.tenant_id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.status)
        .bind(&company.industry)
        .bind(company.size)
        .bind(&company.website)
        .bind(&company.address)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(company.clone())
    }

    /// Updates a company. The owning tenant is never rewritten.
    pub async fn update(&self, company: &Company) -> DbResult<Company> {
        debug!(id = %company.id, "Updating company");

        let result = sqlx::query(
            r#"
            UPDATE companies SET
                name = ?2,
                description = ?3,
                status = ?4,
                industry = ?5,
                size = ?6,
                website = ?7,
                address = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.status)
        .bind(&company.industry)
        .bind(company.size)
        .bind(&company.website)
        .bind(&company.address)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Company", &company.id));
        }

        Ok(company.clone())
    }

    /// Deletes a company. Coupons scoped to it go with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting company");

        let result = sqlx::query("DELETE FROM companies WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Company", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{company, database, tenant};
    use aegis_core::types::{CompanyDraft, Coupon, DiscountType};
    use chrono::Utc;

    #[tokio::test]
    async fn test_list_by_tenant() {
        let db = database().await;
        let acme = tenant(&db, "Acme Corporation").await;
        let tech = tenant(&db, "Tech Innovations").await;
        company(&db, &acme.id, "Tech Solutions Inc").await;
        company(&db, &acme.id, "Green Energy Co").await;
        company(&db, &tech.id, "Cloud Nine").await;

        assert_eq!(db.companies().list(None).await.unwrap().len(), 3);

        let names: Vec<String> = db
            .companies()
            .list(Some(acme.id.as_str()))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Green Energy Co", "Tech Solutions Inc"]);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_tenant() {
        let db = database().await;
        let orphan = CompanyDraft {
            tenant_id: "no-such-tenant".to_string(),
            name: "Orphan Ltd".to_string(),
            ..Default::default()
        }
        .into_company(Utc::now());

        let err = db.companies().insert(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_size_and_website() {
        let db = database().await;
        let acme = tenant(&db, "Acme Corporation").await;
        let mut solutions = company(&db, &acme.id, "Tech Solutions Inc").await;

        solutions.size = Some(CompanySize::Enterprise);
        solutions.website = Some("https://techsolutions.example".to_string());
        db.companies().update(&solutions).await.unwrap();

        let loaded = db.companies().get(&solutions.id).await.unwrap().unwrap();
        assert_eq!(loaded.size, Some(CompanySize::Enterprise));
        assert_eq!(loaded.website.as_deref(), Some("https://techsolutions.example"));
    }

    #[tokio::test]
    async fn test_delete_cascades_company_coupons() {
        let db = database().await;
        let acme = tenant(&db, "Acme Corporation").await;
        let solutions = company(&db, &acme.id, "Tech Solutions Inc").await;

        let coupon = Coupon::new("SOLUTIONS10", DiscountType::Percentage, 1000, "admin")
            .with_scope(Some(acme.id.as_str()), Some(solutions.id.as_str()));
        db.coupons().insert(&coupon).await.unwrap();

        db.companies().delete(&solutions.id).await.unwrap();
        assert!(db.coupons().get(&coupon.id).await.unwrap().is_none());
    }
}
