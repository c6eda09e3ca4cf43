//! # Seed Data Generator
//!
//! Populates the database with demo discounts around today's date.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by DIGIGOODS_DB_PATH (default ./digigoods.db)
//! cargo run -p digigoods-db --bin seed
//!
//! # Specify database path
//! cargo run -p digigoods-db --bin seed -- --db ./data/digigoods.db
//!
//! # Also generate N bulk codes (PROMO-0001 ...)
//! cargo run -p digigoods-db --bin seed -- --bulk 500
//! ```
//!
//! ## Generated Discounts
//! | Code        | Percent | Uses | Window                      |
//! |-------------|---------|------|-----------------------------|
//! | VALID10     | 10%     | 5    | yesterday .. today + 30     |
//! | EXPIRED20   | 20%     | 3    | today - 30 .. yesterday     |
//! | FUTURE15    | 15%     | 2    | tomorrow .. today + 30      |
//! | NOUSE25     | 25%     | 0    | yesterday .. today + 30     |
//! | LASTONE50   | 50%     | 1    | today .. today              |

use chrono::{Days, Local, NaiveDate};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use digigoods_core::NewDiscount;
use digigoods_db::{Database, StoreConfig};

/// (code, percentage_bps, remaining_uses, valid_from offset, valid_until offset)
const DEMO_DISCOUNTS: &[(&str, u32, i64, i64, i64)] = &[
    ("VALID10", 1000, 5, -1, 30),
    ("EXPIRED20", 2000, 3, -30, -1),
    ("FUTURE15", 1500, 2, 1, 30),
    ("NOUSE25", 2500, 0, -1, 30),
    ("LASTONE50", 5000, 1, 0, 0),
];

/// Percentages cycled through for bulk codes
const BULK_RATES_BPS: &[u32] = &[500, 1000, 1500, 2000];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    digigoods_db::init_tracing();

    let mut config = StoreConfig::load()?;
    let mut bulk: usize = 0;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    config.database_path = PathBuf::from(path);
                    i += 1;
                }
            }
            "--bulk" | "-b" => {
                if let Some(count) = args.get(i + 1) {
                    bulk = count.parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("DigiGoods Discount Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DIGIGOODS_DB_PATH or ./digigoods.db)");
                println!("  -b, --bulk <N>     Also generate N bulk discount codes (default: 0)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), "Seeding discounts");

    let db = Database::new(config.into_db_config()).await?;
    let repo = db.discounts();

    let existing = repo.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} discounts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Local::now().date_naive();

    for &(code, percentage_bps, remaining_uses, from, until) in DEMO_DISCOUNTS {
        let discount = repo
            .insert(NewDiscount {
                code: code.to_string(),
                percentage_bps,
                remaining_uses,
                valid_from: offset(today, from),
                valid_until: offset(today, until),
            })
            .await?;
        println!(
            "✓ {:<10} {:>5.1}%  uses={}  {} .. {}",
            discount.code,
            discount.percentage().percentage(),
            discount.remaining_uses,
            discount.valid_from,
            discount.valid_until
        );
    }

    let start = std::time::Instant::now();
    for n in 1..=bulk {
        let result = repo
            .insert(NewDiscount {
                code: format!("PROMO-{n:04}"),
                percentage_bps: BULK_RATES_BPS[n % BULK_RATES_BPS.len()],
                remaining_uses: (n % 50) as i64 + 1,
                valid_from: today,
                valid_until: offset(today, 90),
            })
            .await;

        if let Err(e) = result {
            eprintln!("Failed to insert PROMO-{n:04}: {e}");
        }
    }
    if bulk > 0 {
        println!("✓ Generated {} bulk codes in {:?}", bulk, start.elapsed());
    }

    println!();
    println!("✓ Seed complete! {} discounts stored.", repo.count().await?);

    db.close().await;
    Ok(())
}

/// Shifts `today` by a signed number of days.
fn offset(today: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        today + Days::new(days as u64)
    } else {
        today - Days::new(days.unsigned_abs())
    }
}
