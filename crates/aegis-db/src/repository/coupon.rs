//! # Coupon Repository
//!
//! Database operations for coupons.
//!
//! ## Guarded Usage Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two checkouts redeem the last use of WELCOME20 at the same time        │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write                                           │
//! │     SELECT current_uses → 99 ; UPDATE SET current_uses = 100            │
//! │     (both succeed, 101 redemptions of a 100-use coupon)                 │
//! │                                                                         │
//! │  ✅ CORRECT: one guarded UPDATE                                        │
//! │     UPDATE coupons SET current_uses = current_uses + 1                  │
//! │     WHERE id = ? AND (max_uses IS NULL OR current_uses < max_uses)      │
//! │                                                                         │
//! │     first writer:  1 row  → redeemed                                   │
//! │     second writer: 0 rows → UseLimitReached                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aegis_core::access::Scope;
use aegis_core::types::{Coupon, CouponStatus, DiscountType};

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, \
     start_date, end_date, max_uses, current_uses, status, tenant_id, company_id, \
     min_purchase_cents, max_discount_cents, applicable_products, applicable_categories, \
     created_at, created_by, updated_at";

// =============================================================================
// Scope Filter
// =============================================================================

/// Which coupons a listing should return, by scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Every coupon.
    All,
    /// Coupons with no tenant and no company.
    Global,
    /// Coupons inside a tenant: tenant-wide and company-scoped.
    Tenant(String),
    /// Global coupons plus everything inside the tenant.
    Reachable(String),
    /// Coupons whose scope is exactly this one.
    Exact(Scope),
}

impl ScopeFilter {
    /// In-process evaluation of the filter, for stores that don't speak SQL.
    pub fn matches(&self, scope: &Scope) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Global => scope.is_global(),
            ScopeFilter::Tenant(tenant_id) => scope.is_within_tenant(tenant_id),
            ScopeFilter::Reachable(tenant_id) => {
                scope.tenant_id.is_none() || scope.is_within_tenant(tenant_id)
            }
            ScopeFilter::Exact(exact) => scope == exact,
        }
    }

    fn where_clause(&self) -> (&'static str, Vec<Option<String>>) {
        match self {
            ScopeFilter::All => ("", Vec::new()),
            ScopeFilter::Global => ("WHERE tenant_id IS NULL AND company_id IS NULL", Vec::new()),
            ScopeFilter::Tenant(tenant_id) => ("WHERE tenant_id = ?1", vec![Some(tenant_id.clone())]),
            ScopeFilter::Reachable(tenant_id) => (
                "WHERE tenant_id IS NULL OR tenant_id = ?1",
                vec![Some(tenant_id.clone())],
            ),
            ScopeFilter::Exact(scope) => (
                "WHERE tenant_id IS ?1 AND company_id IS ?2",
                vec![scope.tenant_id.clone(), scope.company_id.clone()],
            ),
        }
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct CouponRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    max_uses: Option<i64>,
    current_uses: i64,
    status: CouponStatus,
    tenant_id: Option<String>,
    company_id: Option<String>,
    min_purchase_cents: Option<i64>,
    max_discount_cents: Option<i64>,
    applicable_products: String,
    applicable_categories: String,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        let applicable_products = serde_json::from_str(&row.applicable_products)
            .map_err(|e| DbError::json("applicable_products", e))?;
        let applicable_categories = serde_json::from_str(&row.applicable_categories)
            .map_err(|e| DbError::json("applicable_categories", e))?;

        Ok(Coupon {
            id: row.id,
            code: row.code,
            description: row.description,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            start_date: row.start_date,
            end_date: row.end_date,
            max_uses: row.max_uses,
            current_uses: row.current_uses,
            status: row.status,
            tenant_id: row.tenant_id,
            company_id: row.company_id,
            min_purchase_cents: row.min_purchase_cents,
            max_discount_cents: row.max_discount_cents,
            applicable_products,
            applicable_categories,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
        })
    }
}

fn encode_list(column: &str, values: &[String]) -> DbResult<String> {
    serde_json::to_string(values).map_err(|e| DbError::json(column, e))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for coupon database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.coupons();
///
/// let coupon = repo.get("uuid-here").await?;
/// let tenant_coupons = repo.list(&ScopeFilter::Tenant(tenant_id)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Gets a coupon by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Coupon))` - Coupon found
    /// * `Ok(None)` - Coupon not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");

        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Lists coupons matching `filter`, newest first.
    pub async fn list(&self, filter: &ScopeFilter) -> DbResult<Vec<Coupon>> {
        let (clause, binds) = filter.where_clause();
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons {clause} ORDER BY created_at DESC, code"
        );

        debug!(?filter, "Listing coupons");

        let mut query = sqlx::query_as::<_, CouponRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Coupon listing returned rows");
        rows.into_iter().map(Coupon::try_from).collect()
    }

    /// Finds the coupon using `code` in exactly `scope`, ignoring letter case.
    pub async fn find_by_code_in_scope(&self, code: &str, scope: &Scope) -> DbResult<Option<Coupon>> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons \
             WHERE code = ?1 COLLATE NOCASE AND tenant_id IS ?2 AND company_id IS ?3"
        );

        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(code.trim())
            .bind(scope.tenant_id.as_deref())
            .bind(scope.company_id.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Inserts a new coupon.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already used in this scope
    /// * `Err(DbError::ForeignKeyViolation)` - tenant or company missing
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        debug!(code = %coupon.code, "Inserting coupon");

        let products = encode_list("applicable_products", &coupon.applicable_products)?;
        let categories = encode_list("applicable_categories", &coupon.applicable_categories)?;

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value,
                start_date, end_date, max_uses, current_uses, status,
                tenant_id, company_id, min_purchase_cents, max_discount_cents,
                applicable_products, applicable_categories,
                created_at, created_by, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16,
                ?17, ?18, ?19
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.start_date)
        .bind(coupon.end_date)
        .bind(coupon.max_uses)
        .bind(coupon.current_uses)
        .bind(coupon.status)
        .bind(&coupon.tenant_id)
        .bind(&coupon.company_id)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_discount_cents)
        .bind(products)
        .bind(categories)
        .bind(coupon.created_at)
        .bind(&coupon.created_by)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e.into(), &coupon.code))?;

        Ok(coupon.clone())
    }

    /// Writes an administrative edit and returns the coupon as stored.
    ///
    /// `id`, `created_at` and `created_by` are never written. `current_uses`
    /// is only written when `expected_uses` is given, and only while the
    /// stored count still equals it, so an edit never drops a use granted
    /// after the edit was read.
    ///
    /// ## Returns
    /// * `Err(DbError::Stale)` - `expected_uses` no longer matches
    /// * `Err(DbError::CheckViolation)` - `max_uses` is below the stored count
    pub async fn update(&self, coupon: &Coupon, expected_uses: Option<i64>) -> DbResult<Coupon> {
        debug!(id = %coupon.id, ?expected_uses, "Updating coupon");

        let products = encode_list("applicable_products", &coupon.applicable_products)?;
        let categories = encode_list("applicable_categories", &coupon.applicable_categories)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?2,
                description = ?3,
                discount_type = ?4,
                discount_value = ?5,
                start_date = ?6,
                end_date = ?7,
                max_uses = ?8,
                current_uses = CASE WHEN ?18 IS NULL THEN current_uses ELSE ?9 END,
                status = ?10,
                tenant_id = ?11,
                company_id = ?12,
                min_purchase_cents = ?13,
                max_discount_cents = ?14,
                applicable_products = ?15,
                applicable_categories = ?16,
                updated_at = ?17
            WHERE id = ?1
            AND (?18 IS NULL OR current_uses = ?18)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.start_date)
        .bind(coupon.end_date)
        .bind(coupon.max_uses)
        .bind(coupon.current_uses)
        .bind(coupon.status)
        .bind(&coupon.tenant_id)
        .bind(&coupon.company_id)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_discount_cents)
        .bind(products)
        .bind(categories)
        .bind(coupon.updated_at)
        .bind(expected_uses)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_code(e.into(), &coupon.code))?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM coupons WHERE id = ?1")
                .bind(&coupon.id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match exists {
                Some(_) => DbError::Stale {
                    entity: "Coupon".to_string(),
                    id: coupon.id.clone(),
                },
                None => DbError::not_found("Coupon", &coupon.id),
            });
        }

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(&coupon.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Coupon::try_from(row)
    }

    /// Hard-deletes a coupon.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    /// Adds one use, only if that keeps `current_uses <= max_uses`.
    ///
    /// ## Returns
    /// * `Ok(Coupon)` - the coupon as stored after the increment
    /// * `Err(DbError::UseLimitReached)` - the cap was already reached
    /// * `Err(DbError::NotFound)` - no such coupon
    pub async fn conditional_increment_use(&self, id: &str) -> DbResult<Coupon> {
        debug!(id = %id, "Incrementing coupon usage");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET
                current_uses = current_uses + 1,
                updated_at = ?2
            WHERE id = ?1
            AND (max_uses IS NULL OR current_uses < max_uses)
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM coupons WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match exists {
                Some(_) => DbError::UseLimitReached { id: id.to_string() },
                None => DbError::not_found("Coupon", id),
            });
        }

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Coupon::try_from(row)
    }

    /// Counts all coupons (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fills in the offending code on a unique violation.
fn with_code(err: DbError, code: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
