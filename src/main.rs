use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use fieldserve::{
    count_rows, get_all_jobs, get_low_stock_items, insert_items, load_items_csv, setup_database,
    JobStatus, MarkupSchedule,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("catalog.csv"));
            run_import(&csv_path)
        }
        Some("stats") => run_stats(),
        Some("quote") => {
            let cost: f64 = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Usage: fieldserve quote <cost>"))?
                .parse()?;
            run_quote(cost)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn db_path() -> PathBuf {
    env::var("FIELDSERVE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("fieldserve.db"))
}

fn print_usage() {
    println!("FieldServe v{}", fieldserve::VERSION);
    println!();
    println!("Usage:");
    println!("  fieldserve import [catalog.csv]   Import supplier catalog into SQLite");
    println!("  fieldserve stats                  Show counts, stock value, jobs by status");
    println!("  fieldserve quote <cost>           Price one cost through the markup schedule");
    println!();
    println!("  Database path defaults to ./fieldserve.db (override with FIELDSERVE_DB)");
}

fn run_import(csv_path: &Path) -> Result<()> {
    println!("🗄️  Catalog Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading catalog...");
    let items = load_items_csv(csv_path)?;
    println!("✓ Loaded {} items from {:?}", items.len(), csv_path);

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path())?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert items
    println!("\n💾 Inserting items...");
    insert_items(&conn, &items)?;

    // 4. Verify count
    let count = count_rows(&conn, "items")?;
    println!("\n✓ Database contains {} items", count);

    Ok(())
}

fn run_stats() -> Result<()> {
    let path = db_path();
    if !path.exists() {
        eprintln!("❌ Database not found at {:?}", path);
        eprintln!("   Run: fieldserve import <catalog.csv>");
        std::process::exit(1);
    }

    let conn = Connection::open(&path)?;
    setup_database(&conn)?;

    println!("📊 FieldServe - Stats");
    println!("━━━━━━━━━━━━━━━━━━━━━");
    println!("Customers: {}", count_rows(&conn, "customers")?);
    println!("Items:     {}", count_rows(&conn, "items")?);
    println!("Jobs:      {}", count_rows(&conn, "jobs")?);
    println!("Invoices:  {}", count_rows(&conn, "invoices")?);

    let low_stock = get_low_stock_items(&conn)?;
    if !low_stock.is_empty() {
        println!("\n⚠️  Low stock ({} items):", low_stock.len());
        for item in &low_stock {
            println!(
                "   {} {} - {} on hand (min {})",
                item.item_code, item.name, item.current_stock, item.minimum_stock
            );
        }
    }

    let jobs = get_all_jobs(&conn)?;
    if !jobs.is_empty() {
        println!("\nJobs by status:");
        for status in [
            JobStatus::Pending,
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            let count = jobs.iter().filter(|j| j.status == status).count();
            if count > 0 {
                println!("   {:12} {}", status.as_str(), count);
            }
        }
    }

    Ok(())
}

fn run_quote(cost: f64) -> Result<()> {
    let schedule = MarkupSchedule::standard();

    println!("💲 Markup quote for cost {:.2}", cost);
    println!("   Sell price: {:.2}", schedule.sell_price(cost));
    println!("   Markup:     {:.0}%", schedule.markup_percentage(cost));

    Ok(())
}
