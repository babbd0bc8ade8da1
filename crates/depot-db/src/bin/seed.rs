//! # Seed Data Generator
//!
//! Populates the database with a demo plumbing catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p depot-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p depot-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p depot-db --bin seed -- --db ./data/depot.db
//!
//! # Also receive one demo invoice through the ledger
//! cargo run -p depot-db --bin seed -- --with-invoice
//! ```
//!
//! Products start with zero stock unless `--with-invoice` is given, in which
//! case the first ten receive stock through a normal ledger transaction so
//! that history and remainders have something to show.

use std::env;

use chrono::Utc;
use depot_core::request::{ReceiptLine, ReceiveInventory};
use depot_core::{Currency, Money, Product, DEFAULT_ACTOR};
use depot_db::{Database, DbConfig};
use uuid::Uuid;

/// Product families for realistic demo data
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "Valves",
        &[
            "Ball valve",
            "Gate valve",
            "Check valve",
            "Butterfly valve",
            "Globe valve",
        ],
    ),
    (
        "Fittings",
        &[
            "Elbow 90°",
            "Elbow 45°",
            "Tee",
            "Reducer",
            "Coupling",
            "Union",
            "End cap",
        ],
    ),
    (
        "Pipes",
        &["PPR pipe", "PVC pipe", "Steel pipe", "Copper pipe"],
    ),
    (
        "Heating",
        &["Radiator valve", "Air vent", "Manifold", "Thermostatic head"],
    ),
];

/// Nominal sizes and the price step each adds (minor units)
const SIZES: &[(&str, i64)] = &[
    ("DN15", 0),
    ("DN20", 1_500),
    ("DN25", 3_500),
    ("DN32", 6_000),
    ("DN40", 9_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./depot.db");
    let mut with_invoice = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-invoice" => with_invoice = true,
            "--help" | "-h" => {
                println!("Depot Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./depot.db)");
                println!("      --with-invoice Receive a demo invoice for the first products");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Depot Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut inserted: Vec<Product> = Vec::new();

    'outer: for (family_idx, (_, names)) in FAMILIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_step)) in SIZES.iter().enumerate() {
                if inserted.len() >= count {
                    break 'outer;
                }

                let product = generate_product(
                    name,
                    size,
                    *price_step,
                    family_idx * 100 + name_idx * 10 + size_idx,
                );

                match db.products().insert(&product).await {
                    Ok(product) => inserted.push(product),
                    Err(e) => eprintln!("Failed to insert {}: {}", product.title, e),
                }
            }
        }
    }

    println!(
        "✓ Generated {} products in {:?}",
        inserted.len(),
        start.elapsed()
    );

    if with_invoice && !inserted.is_empty() {
        let command = demo_invoice(&inserted);
        let invoice = db.ledger().receive_invoice(&command).await?;
        println!(
            "✓ Received invoice {} ({} lines, {} units)",
            invoice.id,
            invoice.items.len(),
            invoice.total_amount()
        );
        println!(
            "  Stock value: {}",
            db.reports().stock_value().await?
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one catalog product; `seed` keeps prices deterministic.
fn generate_product(name: &str, size: &str, price_step: i64, seed: usize) -> Product {
    let now = Utc::now();

    // Base price 50.00 - 449.00 plus the size step
    let base_price = 5_000 + ((seed * 37) % 400) as i64 * 100;

    Product {
        id: Uuid::new_v4().to_string(),
        title: format!("{} {}", name, size),
        description: None,
        price_minor: base_price + price_step,
        stock: 0,
        created_at: now,
        updated_at: now,
    }
}

/// One receipt line per product for the first ten products, cost at 70%.
fn demo_invoice(products: &[Product]) -> ReceiveInventory {
    let lines = products
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, product)| {
            let selling = product.price();
            ReceiptLine {
                product_id: product.id.clone(),
                amount: 5 + i as i64,
                cost_price: Money::from_minor(selling.minor() * 70 / 100),
                selling_price: selling,
                currency: Currency::Uzs,
                added_by: DEFAULT_ACTOR.to_string(),
            }
        })
        .collect();

    ReceiveInventory {
        source: "Seed supplier".to_string(),
        date: Utc::now().date_naive(),
        lines,
    }
}
