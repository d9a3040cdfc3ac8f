//! Aggregate catalog statistics.
//!
//! Summarizes what's indexed: record counts, the active/inactive split,
//! trigger and complexity breakdowns, total node count, and how many
//! distinct services the corpus touches. Used by `fdx stats` and the
//! `/api/stats` endpoint.

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::Config;
use crate::db;
use crate::models::CorpusStats;

pub async fn collect_stats(pool: &SqlitePool) -> Result<CorpusStats> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workflows")
        .fetch_one(pool)
        .await?;

    let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workflows WHERE active = 1")
        .fetch_one(pool)
        .await?;

    let total_nodes: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(node_count), 0) FROM workflows")
            .fetch_one(pool)
            .await?;

    let mut triggers = BTreeMap::new();
    let trigger_rows =
        sqlx::query("SELECT trigger_type, COUNT(*) AS n FROM workflows GROUP BY trigger_type")
            .fetch_all(pool)
            .await?;
    for row in &trigger_rows {
        triggers.insert(row.get::<String, _>("trigger_type"), row.get::<i64, _>("n"));
    }

    let mut complexity = BTreeMap::new();
    let complexity_rows =
        sqlx::query("SELECT complexity, COUNT(*) AS n FROM workflows GROUP BY complexity")
            .fetch_all(pool)
            .await?;
    for row in &complexity_rows {
        complexity.insert(row.get::<String, _>("complexity"), row.get::<i64, _>("n"));
    }

    // The integrations column holds JSON arrays of display names; distinct
    // counting has to parse them.
    let mut distinct: BTreeSet<String> = BTreeSet::new();
    let integration_rows = sqlx::query("SELECT integrations FROM workflows")
        .fetch_all(pool)
        .await?;
    for row in &integration_rows {
        let json: String = row.get("integrations");
        if let Ok(names) = serde_json::from_str::<Vec<String>>(&json) {
            distinct.extend(names);
        }
    }

    Ok(CorpusStats {
        total,
        active,
        inactive: total - active,
        triggers,
        complexity,
        total_nodes,
        unique_integrations: distinct.len() as i64,
        last_indexed: chrono::Utc::now().to_rfc3339(),
    })
}

/// Distinct integration display names across the corpus, sorted.
pub async fn distinct_integrations(pool: &SqlitePool) -> Result<Vec<String>> {
    let mut distinct: BTreeSet<String> = BTreeSet::new();
    let rows = sqlx::query("SELECT integrations FROM workflows")
        .fetch_all(pool)
        .await?;
    for row in &rows {
        let json: String = row.get("integrations");
        if let Ok(names) = serde_json::from_str::<Vec<String>>(&json) {
            distinct.extend(names);
        }
    }
    Ok(distinct.into_iter().collect())
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stats = collect_stats(&pool).await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Flowdex — Catalog Stats");
    println!("=======================");
    println!();
    println!("  Database:     {}", config.db.path.display());
    println!("  Size:         {}", format_bytes(db_size));
    println!();
    println!("  Workflows:    {}", stats.total);
    println!(
        "  Active:       {} ({} inactive)",
        stats.active, stats.inactive
    );
    println!("  Total nodes:  {}", stats.total_nodes);
    println!("  Integrations: {} distinct", stats.unique_integrations);

    if !stats.triggers.is_empty() {
        println!();
        println!("  By trigger:");
        for (trigger, n) in &stats.triggers {
            println!("    {:<12} {}", trigger, n);
        }
    }

    if !stats.complexity.is_empty() {
        println!();
        println!("  By complexity:");
        for (tier, n) in &stats.complexity {
            println!("    {:<12} {}", tier, n);
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
