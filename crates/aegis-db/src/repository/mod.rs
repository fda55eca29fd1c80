//! # Repository Module
//!
//! Database repository implementations for Aegis Admin.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CouponService                                                         │
//! │       │                                                                 │
//! │       │  db.coupons().conditional_increment_use(id)                    │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │  ├── get(&self, id)                                                    │
//! │  ├── list(&self, filter)                                               │
//! │  ├── insert(&self, coupon)                                             │
//! │  ├── update(&self, coupon)                                             │
//! │  ├── delete(&self, id)                                                 │
//! │  └── conditional_increment_use(&self, id)                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into private `FromRow` structs and converted into the
//! aegis-core records, so JSON columns and computed columns never leak
//! into the domain types.
//!
//! ## Available Repositories
//!
//! - [`coupon::CouponRepository`] - Coupon CRUD, code lookup, guarded usage increments
//! - [`tenant::TenantRepository`] - Tenant CRUD with company counts
//! - [`company::CompanyRepository`] - Company CRUD
//! - [`notification::NotificationRepository`] - Per-user notifications

pub mod company;
pub mod coupon;
pub mod notification;
pub mod tenant;

#[cfg(test)]
pub(crate) mod test_support {
    use aegis_core::types::{Company, CompanyDraft, Tenant, TenantDraft};
    use chrono::Utc;

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn tenant(db: &Database, name: &str) -> Tenant {
        let tenant = TenantDraft {
            name: name.to_string(),
            description: None,
            data_quota_gb: 500,
        }
        .into_tenant(Utc::now());
        db.tenants().insert(&tenant).await.unwrap()
    }

    pub async fn company(db: &Database, tenant_id: &str, name: &str) -> Company {
        let company = CompanyDraft {
            tenant_id: tenant_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
        .into_company(Utc::now());
        db.companies().insert(&company).await.unwrap()
    }
}
