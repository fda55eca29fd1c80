//! # Seed Data Loader
//!
//! Fills a SQLite database with demo tenants, companies, coupons and
//! notifications for dashboard development.
//!
//! ## Usage
//! ```bash
//! # Use AEGIS_DATABASE_PATH (default ./aegis.db)
//! cargo run -p aegis-service --bin seed
//!
//! # Specify database path
//! cargo run -p aegis-service --bin seed -- --db ./data/aegis.db
//! ```
//!
//! ## Demo Data
//! - Tenants: Acme Corporation (500 GB), Tech Innovations (1000 GB)
//! - Companies: Tech Solutions Inc, Green Energy Co (Acme), Innovation Labs
//! - Coupons:
//!   - WELCOME20: 20% tenant-wide at Acme, 45 of 100 uses
//!   - SUMMER50: 50% at Tech Solutions Inc, $100 minimum, 120 of 200 uses
//!   - FIXED25: $25 at Tech Innovations, window ended in 2023 (derived expired)
//!   - FREESHIP: $5 global, unlimited

use std::env;

use chrono::{NaiveDate, Utc};
use tracing::info;

use aegis_core::coupon::effective_status;
use aegis_core::money::Money;
use aegis_core::{
    Company, CompanyDraft, CompanySize, Coupon, DiscountType, NotificationDraft, NotificationKind,
    Tenant, TenantDraft,
};
use aegis_db::{Database, DbConfig};
use aegis_service::telemetry::init_tracing;
use aegis_service::AdminConfig;

const SEED_USER: &str = "admin";

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::load()?;
    init_tracing(&config.log_filter);

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_config = config.db_config();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config = DbConfig::new(&args[i + 1]).max_connections(config.db_max_connections);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Aegis Admin Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $AEGIS_DATABASE_PATH or ./aegis.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Aegis Admin Seed Data Loader");
    println!("==============================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.coupons().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} coupons", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Tenants
    let acme = insert_tenant(&db, "Acme Corporation", "Global manufacturing company", 500).await?;
    let innovations =
        insert_tenant(&db, "Tech Innovations", "Software development firm", 1000).await?;

    // Companies
    let tech_solutions = insert_company(
        &db,
        CompanyDraft {
            tenant_id: acme.id.clone(),
            name: "Tech Solutions Inc".into(),
            description: Some("IT consulting and services".into()),
            industry: Some("Technology".into()),
            size: Some(CompanySize::Medium),
            website: Some("https://techsolutions.example".into()),
            address: None,
        },
    )
    .await?;
    insert_company(
        &db,
        CompanyDraft {
            tenant_id: acme.id.clone(),
            name: "Green Energy Co".into(),
            industry: Some("Energy".into()),
            size: Some(CompanySize::Large),
            ..Default::default()
        },
    )
    .await?;
    insert_company(
        &db,
        CompanyDraft {
            tenant_id: innovations.id.clone(),
            name: "Innovation Labs".into(),
            industry: Some("Research".into()),
            size: Some(CompanySize::Small),
            ..Default::default()
        },
    )
    .await?;
    println!("✓ Created 2 tenants and 3 companies");

    // Coupons
    let mut welcome = Coupon::new("WELCOME20", DiscountType::Percentage, 2000, SEED_USER)
        .with_scope(Some(acme.id.as_str()), None)
        .with_max_uses(100);
    welcome.description = Some("Welcome discount for new users".into());
    welcome.current_uses = 45;

    let mut summer = Coupon::new("SUMMER50", DiscountType::Percentage, 5000, SEED_USER)
        .with_scope(Some(acme.id.as_str()), Some(tech_solutions.id.as_str()))
        .with_max_uses(200)
        .with_min_purchase(Money::from_major(100));
    summer.description = Some("Summer sale discount".into());
    summer.current_uses = 120;

    let mut fixed = Coupon::new("FIXED25", DiscountType::Fixed, 2500, SEED_USER)
        .with_scope(Some(innovations.id.as_str()), None)
        .with_window(date(2023, 4, 15), date(2023, 7, 15));
    fixed.description = Some("Fixed amount discount".into());
    fixed.current_uses = 30;

    let mut shipping = Coupon::new("FREESHIP", DiscountType::Fixed, 500, SEED_USER);
    shipping.description = Some("Shipping credit, any tenant".into());

    for coupon in [welcome, summer, fixed, shipping] {
        let stored = db.coupons().insert(&coupon).await?;
        println!(
            "  {:<10} {:<8} {}",
            stored.code,
            effective_status(&stored, now).to_string(),
            stored.description.as_deref().unwrap_or("")
        );
    }
    println!("✓ Created {} coupons", db.coupons().count().await?);

    // Notifications
    for (title, message, kind) in [
        (
            "Tenant created",
            "Acme Corporation was added to the platform",
            NotificationKind::Success,
        ),
        (
            "Quota warning",
            "Tech Innovations is using 85% of its data quota",
            NotificationKind::Warning,
        ),
    ] {
        let notification = NotificationDraft {
            user_id: SEED_USER.into(),
            title: title.into(),
            message: message.into(),
            kind: Some(kind),
        }
        .into_notification(now);
        db.notifications().insert(&notification).await?;
    }
    println!("✓ Created 2 notifications for '{}'", SEED_USER);

    info!(tenant_id = %acme.id, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

async fn insert_tenant(
    db: &Database,
    name: &str,
    description: &str,
    quota_gb: i64,
) -> Result<Tenant, Box<dyn std::error::Error>> {
    let tenant = TenantDraft {
        name: name.into(),
        description: Some(description.into()),
        data_quota_gb: quota_gb,
    }
    .into_tenant(Utc::now());

    Ok(db.tenants().insert(&tenant).await?)
}

async fn insert_company(
    db: &Database,
    draft: CompanyDraft,
) -> Result<Company, Box<dyn std::error::Error>> {
    let company = draft.into_company(Utc::now());
    Ok(db.companies().insert(&company).await?)
}
