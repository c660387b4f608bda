//! # Seed Data Generator
//!
//! Populates the database with shop fixtures for development.
//!
//! ## Usage
//! ```bash
//! # Seed the full fixture list
//! cargo run -p instocker-store --bin seed
//!
//! # Seed a subset
//! cargo run -p instocker-store --bin seed -- --count 10
//!
//! # Specify database path
//! cargo run -p instocker-store --bin seed -- --db ./data/instocker.db
//! ```
//!
//! ## What It Seeds
//! - A small corner-shop catalog (stationery, beverages, snacks, grocery,
//!   household), a couple of items deliberately below the low-stock line
//! - One demo sale recorded through the checkout engine, so the sales
//!   history is never empty in a fresh dev database
//!
//! Logging is quiet unless `RUST_LOG` asks for more (e.g. `RUST_LOG=debug`
//! to watch pool setup and checkout internals).

use std::env;

use instocker_core::{Cart, CartLine, Catalog, Checkout, NewProduct, DEFAULT_LOW_STOCK_THRESHOLD};
use instocker_store::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Shop fixtures: (name, sku, category, price_cents, quantity, threshold).
///
/// Quantities are chosen so `list_low_stock` has something to report.
const SHOP_GOODS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("Blue Ballpoint Pen", "PEN-BLUE", "Stationery", 250, 120, 20),
    ("Black Ballpoint Pen", "PEN-BLACK", "Stationery", 250, 95, 20),
    ("Spiral Notebook A5", "NB-A5", "Stationery", 1200, 40, 10),
    ("Pencil HB", "PCL-HB", "Stationery", 150, 200, 30),
    ("Eraser", "ERS-1", "Stationery", 100, 80, 15),
    ("Cola 330ml", "COLA-330", "Beverages", 199, 144, 24),
    ("Orange Soda 330ml", "ORNG-330", "Beverages", 199, 96, 24),
    ("Mineral Water 500ml", "WTR-500", "Beverages", 99, 240, 48),
    ("Green Tea Box", "TEA-GRN", "Beverages", 549, 18, 6),
    ("Instant Coffee Jar", "COF-INST", "Beverages", 1399, 12, 4),
    ("Salted Chips", "CHIP-SALT", "Snacks", 299, 60, 12),
    ("Chocolate Bar", "CHOC-BAR", "Snacks", 349, 75, 15),
    ("Biscuit Pack", "BISC-1", "Snacks", 199, 90, 18),
    ("Sugar 1kg", "SUG-1KG", "Grocery", 450, 30, 8),
    ("Rice 5kg", "RICE-5KG", "Grocery", 2899, 14, 4),
    ("Cooking Oil 1L", "OIL-1L", "Grocery", 1599, 22, 6),
    ("Salt 800g", "SALT-800", "Grocery", 120, 45, 10),
    ("Dish Soap", "SOAP-DISH", "Household", 399, 3, 5),
    ("Laundry Powder 1kg", "LNDRY-1KG", "Household", 899, 2, 5),
    ("Matches Box", "MATCH-1", "Household", 50, 150, 25),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = SHOP_GOODS.len();
    let mut db_path = String::from("./instocker_dev.db");
    let mut user_id = String::from("demo-user");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(SHOP_GOODS.len());
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Instocker Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to seed (default: all fixtures)");
                println!("  -d, --db <PATH>    Database file path (default: ./instocker_dev.db)");
                println!("  -u, --user <ID>    Owner recorded on seeded rows (default: demo-user)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Instocker Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", user_id);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.catalog().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} active products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Create the catalog
    println!();
    println!("Creating products...");

    let catalog = db.catalog();
    let start = std::time::Instant::now();
    let mut created = Vec::new();

    for (name, sku, category, price_cents, quantity, threshold) in
        SHOP_GOODS.iter().take(count)
    {
        let input = NewProduct {
            name: name.to_string(),
            sku: Some(sku.to_string()),
            category: Some(category.to_string()),
            price_cents: *price_cents,
            quantity: *quantity,
            low_stock_threshold: Some(*threshold),
        };

        match catalog.create(input, &user_id).await {
            Ok(product) => created.push(product),
            Err(e) => {
                eprintln!("Failed to create {}: {}", sku, e);
                continue;
            }
        }
    }

    println!(
        "✓ Created {} products in {:?}",
        created.len(),
        start.elapsed()
    );

    // Record one demo sale through the real checkout path
    if created.len() >= 2 {
        println!();
        println!("Recording a demo sale...");

        let mut cart = Cart::new();
        cart.add_line(CartLine::for_product(&created[0], 2))?;
        cart.add_line(CartLine::for_product(&created[1], 1))?;

        let sale = db.checkout().record_sale(&cart, &user_id).await?;
        println!("{}", serde_json::to_string_pretty(&sale)?);
        println!("✓ Demo sale recorded: total {}", sale.total());
    }

    // Show what the reorder report would say
    println!();
    println!("Low stock check (threshold {}):", DEFAULT_LOW_STOCK_THRESHOLD);
    let low = catalog.list_low_stock(DEFAULT_LOW_STOCK_THRESHOLD).await?;
    if low.is_empty() {
        println!("  Nothing below the line.");
    } else {
        for product in &low {
            let marker = if product.is_low_stock() { "⚠" } else { " " };
            println!(
                "  {} {} ({}): {} left",
                marker, product.name, product.sku, product.quantity
            );
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes structured logging for the seed run.
///
/// Default is warnings only so the progress output stays readable; set
/// `RUST_LOG` to turn the volume up.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
