//! # Seed Data Generator
//!
//! Populates the database with tier catalogs and demo entities for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed catalogs + demo data (default path ./vela_dev.db)
//! cargo run -p vela-db --bin seed
//!
//! # Specify database path
//! cargo run -p vela-db --bin seed -- --db ./data/vela.db
//!
//! # Catalogs only, no demo entities
//! cargo run -p vela-db --bin seed -- --no-demo
//! ```
//!
//! ## Seeded Catalogs
//! - Vendor: Starter / Growth / Pro / Elite
//! - Driver: Bronze / Silver / Gold
//!
//! Demo data adds a vendor and a driver with enough completion history to
//! land above the base tier, plus an initial credit grant and an open
//! delivery job.

use std::env;
use tracing_subscriber::EnvFilter;
use vela_core::{EntityKind, TierDefinition};
use vela_db::{Database, DbConfig};

/// Vendor tier ladder. Thresholds are cumulative: every tier's floors are
/// at or above the previous tier's.
fn vendor_catalog() -> Vec<TierDefinition> {
    vec![
        TierDefinition {
            name: "Starter".to_string(),
            level: 1,
            min_orders: 0,
            min_rating_hundredths: 0,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps: 1800,
            payout_days: 14,
            monthly_credit_grant: 0,
            product_limit: Some(25),
            promotion_limit: Some(1),
            visibility_boost: 1,
        },
        TierDefinition {
            name: "Growth".to_string(),
            level: 2,
            min_orders: 50,
            min_rating_hundredths: 420,
            min_fulfillment_bps: 9000,
            min_revenue_cents: 100_000,
            commission_bps: 1500,
            payout_days: 7,
            monthly_credit_grant: 50,
            product_limit: Some(100),
            promotion_limit: Some(5),
            visibility_boost: 2,
        },
        TierDefinition {
            name: "Pro".to_string(),
            level: 3,
            min_orders: 250,
            min_rating_hundredths: 440,
            min_fulfillment_bps: 9500,
            min_revenue_cents: 1_000_000,
            commission_bps: 1200,
            payout_days: 3,
            monthly_credit_grant: 200,
            product_limit: Some(500),
            promotion_limit: Some(20),
            visibility_boost: 3,
        },
        TierDefinition {
            name: "Elite".to_string(),
            level: 4,
            min_orders: 1000,
            min_rating_hundredths: 460,
            min_fulfillment_bps: 9700,
            min_revenue_cents: 10_000_000,
            commission_bps: 1000,
            payout_days: 1,
            monthly_credit_grant: 500,
            product_limit: None,
            promotion_limit: None,
            visibility_boost: 5,
        },
    ]
}

/// Driver tier ladder. Drivers have no product or promotion limits;
/// their benefits are payout speed, grants and job visibility.
fn driver_catalog() -> Vec<TierDefinition> {
    vec![
        TierDefinition {
            name: "Bronze".to_string(),
            level: 1,
            min_orders: 0,
            min_rating_hundredths: 0,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps: 0,
            payout_days: 7,
            monthly_credit_grant: 0,
            product_limit: None,
            promotion_limit: None,
            visibility_boost: 1,
        },
        TierDefinition {
            name: "Silver".to_string(),
            level: 2,
            min_orders: 50,
            min_rating_hundredths: 450,
            min_fulfillment_bps: 9200,
            min_revenue_cents: 0,
            commission_bps: 0,
            payout_days: 3,
            monthly_credit_grant: 25,
            product_limit: None,
            promotion_limit: None,
            visibility_boost: 2,
        },
        TierDefinition {
            name: "Gold".to_string(),
            level: 3,
            min_orders: 300,
            min_rating_hundredths: 475,
            min_fulfillment_bps: 9600,
            min_revenue_cents: 0,
            commission_bps: 0,
            payout_days: 1,
            monthly_credit_grant: 100,
            product_limit: None,
            promotion_limit: None,
            visibility_boost: 3,
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vela_dev.db");
    let mut demo = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--no-demo" => {
                demo = false;
            }
            "--help" | "-h" => {
                println!("Vela Market Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vela_dev.db)");
                println!("      --no-demo      Seed tier catalogs only, skip demo entities");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vela Market Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing catalogs
    let existing = db.tiers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} tier definitions", existing);
        println!("  Re-seeding updates them in place.");
    }

    // Seed tier catalogs
    println!();
    println!("Seeding tier catalogs...");

    let vendors = vendor_catalog();
    let drivers = driver_catalog();
    let vendor_count = vendors.len();
    let driver_count = drivers.len();

    db.tiers().seed_catalog(EntityKind::Vendor, vendors).await?;
    println!("  Vendor: {} tiers (Starter → Elite)", vendor_count);

    db.tiers().seed_catalog(EntityKind::Driver, drivers).await?;
    println!("  Driver: {} tiers (Bronze → Gold)", driver_count);

    if demo {
        println!();
        println!("Seeding demo entities...");
        seed_demo(&db).await?;
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Creates a demo vendor and driver with history, credits and an open job.
async fn seed_demo(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    // Vendor with Growth-level history: 60 orders, ~4.6 average, all
    // fulfilled, $2,400 revenue
    for i in 0..60 {
        let rating = if i % 3 == 0 { 480 } else { 450 };
        db.metrics()
            .record_completion("vnd-demo", EntityKind::Vendor, 4_000, rating, true)
            .await?;
    }

    let catalog = db.tiers().load_catalog(EntityKind::Vendor).await?;
    let metrics = db
        .metrics()
        .get_or_fresh("vnd-demo", EntityKind::Vendor)
        .await?;
    let tier = catalog.evaluate(&metrics);
    println!("  vnd-demo: {} orders, tier {}", metrics.total_orders, tier.name);

    // Initial credit grant matching the tier benefit
    if tier.monthly_credit_grant > 0 {
        db.ledger()
            .grant("vnd-demo", tier.monthly_credit_grant, "monthly_grant")
            .await?;
        let balance = db.ledger().balance("vnd-demo").await?;
        println!("  vnd-demo: granted {} credits (balance {})", tier.monthly_credit_grant, balance);
    }

    // Driver with Silver-level history
    for _ in 0..55 {
        db.metrics()
            .record_completion("drv-demo", EntityKind::Driver, 750, 470, true)
            .await?;
    }
    let driver_catalog = db.tiers().load_catalog(EntityKind::Driver).await?;
    let driver_metrics = db
        .metrics()
        .get_or_fresh("drv-demo", EntityKind::Driver)
        .await?;
    println!(
        "  drv-demo: {} deliveries, tier {}",
        driver_metrics.total_orders,
        driver_catalog.evaluate(&driver_metrics).name
    );

    // One open delivery job to claim
    let job = db.jobs().create("ord-demo-1", 850).await?;
    println!("  job {}: pending, payout {} cents", job.id, job.payout_cents);

    Ok(())
}
