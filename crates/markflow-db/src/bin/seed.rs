//! # Deployment Seeder
//!
//! Provisions a markflow database for development: applies migrations,
//! writes the four allocator settings, and reports counter status.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults into ./markflow_dev.db
//! cargo run -p markflow-db --bin seed -- --gcp1 461234567 --gcp2 469999999
//!
//! # Custom switchover and warning threshold
//! cargo run -p markflow-db --bin seed -- \
//!     --db ./data/markflow.db \
//!     --gcp1 461234567 --gcp2 469999999 \
//!     --limit 9900000 --percent 80
//! ```
//!
//! Safe to re-run: migrations are idempotent, settings are upserted,
//! and the counter row is only ever created, never reset.

use std::env;

use markflow_core::allocator::SsccAllocator;
use markflow_core::SSCC_COUNTER;
use markflow_db::repository::settings::{
    DEFAULT_PRIMARY_LIMIT, DEFAULT_WARNING_PERCENT, KEY_PRIMARY_LIMIT, KEY_PRIMARY_PREFIX,
    KEY_SECONDARY_PREFIX, KEY_WARNING_PERCENT,
};
use markflow_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./markflow_dev.db");
    let mut gcp1: Option<String> = None;
    let mut gcp2: Option<String> = None;
    let mut limit: i64 = DEFAULT_PRIMARY_LIMIT;
    let mut percent: u8 = DEFAULT_WARNING_PERCENT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--gcp1" => {
                if i + 1 < args.len() {
                    gcp1 = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--gcp2" => {
                if i + 1 < args.len() {
                    gcp2 = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--limit" => {
                if i + 1 < args.len() {
                    limit = args[i + 1].parse().unwrap_or(DEFAULT_PRIMARY_LIMIT);
                    i += 1;
                }
            }
            "--percent" => {
                if i + 1 < args.len() {
                    percent = args[i + 1].parse().unwrap_or(DEFAULT_WARNING_PERCENT);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("markflow deployment seeder");
                println!();
                println!("Usage: seed --gcp1 <PREFIX> --gcp2 <PREFIX> [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --gcp1 <PREFIX>   Primary company prefix (required)");
                println!("      --gcp2 <PREFIX>   Secondary company prefix (required)");
                println!("      --limit <N>       Switchover point (default: {DEFAULT_PRIMARY_LIMIT})");
                println!("      --percent <N>     Warning percent (default: {DEFAULT_WARNING_PERCENT})");
                println!("  -d, --db <PATH>       Database file path (default: ./markflow_dev.db)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let (Some(gcp1), Some(gcp2)) = (gcp1, gcp2) else {
        eprintln!("error: --gcp1 and --gcp2 are required (see --help)");
        std::process::exit(2);
    };

    println!("markflow deployment seeder");
    println!("==========================");
    println!("Database: {db_path}");
    println!();

    // Connect; migrations create and seed the counter row
    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let settings = db.settings();
    settings.set(KEY_PRIMARY_PREFIX, &gcp1).await?;
    settings.set(KEY_SECONDARY_PREFIX, &gcp2).await?;
    settings.set(KEY_PRIMARY_LIMIT, &limit.to_string()).await?;
    settings.set(KEY_WARNING_PERCENT, &percent.to_string()).await?;
    println!("✓ Allocator settings written");

    // Validate what we just wrote the same way a host would load it
    let config = settings.load_sscc_config().await?;
    let allocator = SsccAllocator::new(config);

    let current: i64 = sqlx::query_scalar(
        "SELECT current_value FROM system_counters WHERE counter_name = ?1",
    )
    .bind(SSCC_COUNTER)
    .fetch_one(db.pool())
    .await?;

    let next = allocator.policy().select(current + 1).to_string();
    let preview = allocator.preview(current + 1, &next)?;

    println!();
    println!("Counter '{SSCC_COUNTER}' at {current}");
    println!("Next code would be {} (prefix {next})", preview.full);

    Ok(())
}
