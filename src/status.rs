// System status display — database size, stored runs, latest run summary.

use anyhow::Result;
use std::path::Path;

use crate::db;
use crate::db::queries;

/// Display system status to the terminal.
pub fn show(db_path: &str) -> Result<()> {
    if !Path::new(db_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `reviewlens init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    let conn = db::open(db_path)?;

    let stats = queries::get_store_stats(&conn)?;
    println!(
        "Stored: {} runs, {} review labels, {} bank themes",
        stats.runs, stats.review_rows, stats.theme_rows
    );

    match queries::get_latest_run(&conn)? {
        Some(run) => {
            println!(
                "Last run: #{} on {} ({} reviews, {} banks, {} uncategorized, method {})",
                run.id,
                run.created_at,
                run.review_count,
                run.bank_count,
                run.uncategorized_count,
                run.method
            );
            println!("  Input: {}", run.input_path);

            let counts = queries::get_primary_theme_counts(&conn, run.id)?;
            let mut current_bank = "";
            for (bank, theme, n) in &counts {
                if bank != current_bank {
                    println!("  {bank}:");
                    current_bank = bank.as_str();
                }
                println!("    {:<36} {:>5}", theme, n);
            }
        }
        None => {
            println!("Last run: never");
            println!("  Run `reviewlens analyze --input <csv>` to analyze a batch");
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
