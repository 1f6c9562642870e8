//! # Seed Data Generator
//!
//! Populates a database with shop products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p mostrador-db --bin seed
//!
//! # Custom amount / path
//! cargo run -p mostrador-db --bin seed -- --count 200 --db ./data/mostrador.db
//! ```

use std::env;

use mostrador_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Markup over cost for seeded retail prices, matching the margin the
/// ingestion path suggests for costed delivery rows.
const SEED_PRICE_MARGIN: f64 = 1.3;

/// Corner-shop staples, (code prefix, names).
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEB",
        &[
            "Agua 1.5L",
            "Coca-Cola 330ml",
            "Fanta Naranja 330ml",
            "Cerveza Estrella 330ml",
            "Zumo de Pina 1L",
            "Cafe Molido 250g",
        ],
    ),
    (
        "SNK",
        &[
            "Patatas Fritas 150g",
            "Aceitunas Rellenas",
            "Pipas Saladas",
            "Chocolate con Leche",
            "Galletas Maria",
            "Chicles Menta",
        ],
    ),
    (
        "ALM",
        &[
            "Arroz Redondo 1kg",
            "Macarrones 500g",
            "Aceite de Oliva 1L",
            "Tomate Frito 400g",
            "Atun en Aceite Pack 3",
            "Lentejas 500g",
        ],
    ),
    (
        "LIM",
        &[
            "Lavavajillas 750ml",
            "Lejia 1L",
            "Papel de Cocina",
            "Bolsas de Basura 20u",
            "Detergente 2L",
            "Bayetas Pack 3",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut db_path = String::from("./mostrador_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mostrador Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./mostrador_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Mostrador Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products.", existing);
        println!("Skipping seed to avoid duplicates; delete the file to regenerate.");
        return Ok(());
    }

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (prefix, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for variant in 0..8usize {
                if generated >= count {
                    break 'outer;
                }

                // Deterministic pseudo-variation from the indexes; good
                // enough for dev data, no RNG needed.
                let seed = category_idx * 1000 + name_idx * 10 + variant;
                let cost = 0.30 + (seed % 37) as f64 * 0.10;
                let price = (cost * SEED_PRICE_MARGIN * 100.0).round() / 100.0;
                let stock = (seed * 7 % 60) as i64;

                let code = format!("{}-{:03}", prefix, name_idx * 10 + variant);
                let display = if variant == 0 {
                    (*name).to_string()
                } else {
                    format!("{} (lote {})", name, variant)
                };

                if let Err(e) = db
                    .products()
                    .upsert_accumulate(&code, &display, cost, price, stock)
                    .await
                {
                    eprintln!("Failed to insert {}: {}", code, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!("Generated {} products in {:?}", generated, elapsed);

    let low = db.dashboard().low_stock().await?;
    println!("Low-stock products after seed: {}", low.len());

    println!();
    println!("Seed complete.");

    Ok(())
}
