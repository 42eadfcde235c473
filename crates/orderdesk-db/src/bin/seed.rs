//! # Seed Data Generator
//!
//! Populates a development database with a small catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./orderdesk.db
//! cargo run -p orderdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p orderdesk-db --bin seed -- --db ./data/orderdesk.db
//! ```
//!
//! ## Generated Data
//! - A few items in each currency (rub, usd, eur)
//! - Discounts: one percentage, one fixed, one inactive
//! - Taxes: a standard VAT rate and a reduced rate

use orderdesk_core::{Currency, DiscountKind, Money};
use orderdesk_db::{Database, DbConfig, NewDiscount, NewItem, NewTax};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// (name, description, price, currency)
const ITEMS: &[(&str, &str, &str, Currency)] = &[
    ("Чай улун", "Молочный улун, 100 г", "450.00", Currency::Rub),
    ("Кофе в зёрнах", "Эфиопия, 250 г", "890.00", Currency::Rub),
    ("Кружка", "Керамика, 350 мл", "690.00", Currency::Rub),
    ("Notebook", "A5, dotted, 120 pages", "12.50", Currency::Usd),
    ("Fountain pen", "Steel nib, fine", "34.99", Currency::Usd),
    ("Ink bottle", "Blue-black, 50 ml", "9.995", Currency::Usd),
    ("Desk lamp", "LED, warm white", "49.00", Currency::Eur),
    ("Bookends", "Oak, pair", "27.50", Currency::Eur),
];

/// (name, kind, value, is_active)
const DISCOUNTS: &[(&str, DiscountKind, &str, bool)] = &[
    ("Welcome 10%", DiscountKind::Percentage, "10", true),
    ("Five off", DiscountKind::Fixed, "5.00", true),
    ("Expired promo", DiscountKind::Percentage, "25", false),
];

/// (name, rate, is_active)
const TAXES: &[(&str, &str, bool)] = &[("VAT", "20", true), ("Reduced VAT", "10", true)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./orderdesk.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Orderdesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./orderdesk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Orderdesk Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating items...");
    for (name, description, price, currency) in ITEMS {
        let item = db
            .items()
            .create(NewItem {
                name: name.to_string(),
                description: description.to_string(),
                price: Money::from_str(price)?,
                currency: *currency,
            })
            .await?;
        println!("  {} {}{}", item.name, item.price, item.currency.symbol());
    }

    println!("Creating discounts...");
    for (name, kind, value, is_active) in DISCOUNTS {
        let discount = db
            .discounts()
            .create(NewDiscount {
                name: name.to_string(),
                kind: *kind,
                value: Decimal::from_str(value)?,
                is_active: *is_active,
            })
            .await?;
        println!("  {} ({} {})", discount.name, discount.kind.as_str(), discount.value);
    }

    println!("Creating taxes...");
    for (name, rate, is_active) in TAXES {
        let tax = db
            .taxes()
            .create(NewTax {
                name: name.to_string(),
                rate: Decimal::from_str(rate)?,
                is_active: *is_active,
            })
            .await?;
        println!("  {} ({}%)", tax.name, tax.rate);
    }

    println!();
    println!(
        "✓ Seeded {} items, {} discounts, {} taxes",
        ITEMS.len(),
        DISCOUNTS.len(),
        TAXES.len()
    );

    Ok(())
}
