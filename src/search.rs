//! The query engine's search path.
//!
//! Free-text search runs over the FTS5 index and is ranked by relevance;
//! without a query, records come back most-recently-analyzed first. All
//! categorical filters combine with AND semantics, and an unknown filter
//! value simply matches nothing — the query surface is permissive.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::catalog;
use crate::config::Config;
use crate::db;
use crate::models::WorkflowRecord;
use crate::store;

/// Free-text + filtered search with pagination.
///
/// Returns the matching page plus the total match count over the filtered
/// set, computed before `limit`/`offset` are applied.
pub async fn search_workflows(
    pool: &SqlitePool,
    query: Option<&str>,
    trigger_filter: &str,
    complexity_filter: &str,
    active_only: bool,
    limit: i64,
    offset: i64,
) -> Result<(Vec<WorkflowRecord>, i64)> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let (filter_sql, filter_binds) =
        filter_clause(trigger_filter, complexity_filter, active_only);

    let (select_sql, count_sql) = match query {
        Some(_) => (
            format!(
                r#"
                SELECT w.* FROM workflows_fts
                JOIN workflows w ON w.id = workflows_fts.workflow_id
                WHERE workflows_fts MATCH ?{filter_sql}
                ORDER BY workflows_fts.rank, w.id ASC
                LIMIT ? OFFSET ?
                "#
            ),
            format!(
                r#"
                SELECT COUNT(*) FROM workflows_fts
                JOIN workflows w ON w.id = workflows_fts.workflow_id
                WHERE workflows_fts MATCH ?{filter_sql}
                "#
            ),
        ),
        None => (
            format!(
                r#"
                SELECT w.* FROM workflows w
                WHERE 1=1{filter_sql}
                ORDER BY w.analyzed_at DESC, w.id ASC
                LIMIT ? OFFSET ?
                "#
            ),
            format!("SELECT COUNT(*) FROM workflows w WHERE 1=1{filter_sql}"),
        ),
    };

    let mut select = sqlx::query(&select_sql);
    let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(q) = query {
        select = select.bind(q);
        count = count.bind(q);
    }
    for bind in &filter_binds {
        select = select.bind(bind);
        count = count.bind(bind);
    }
    select = select.bind(limit).bind(offset);

    let rows = select.fetch_all(pool).await?;
    let records = rows.iter().map(store::record_from_row).collect();
    let total = count.fetch_one(pool).await?;

    Ok((records, total))
}

/// All records whose integration set intersects the named static category,
/// most recently analyzed first. An unknown category yields an empty result.
pub async fn search_by_category(
    pool: &SqlitePool,
    category: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<WorkflowRecord>, i64)> {
    let Some(services) = catalog::category_services(category) else {
        return Ok((Vec::new(), 0));
    };

    // Integrations are stored as a JSON array of display names, so an exact
    // member test is a LIKE on the quoted name.
    let like_chain = vec!["w.integrations LIKE ?"; services.len()].join(" OR ");
    let select_sql = format!(
        r#"
        SELECT w.* FROM workflows w
        WHERE {like_chain}
        ORDER BY w.analyzed_at DESC, w.id ASC
        LIMIT ? OFFSET ?
        "#
    );
    let count_sql = format!("SELECT COUNT(*) FROM workflows w WHERE {like_chain}");

    let mut select = sqlx::query(&select_sql);
    let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
    for service in services {
        let pattern = format!("%\"{}\"%", service);
        select = select.bind(pattern.clone());
        count = count.bind(pattern);
    }
    select = select.bind(limit).bind(offset);

    let rows = select.fetch_all(pool).await?;
    let records = rows.iter().map(store::record_from_row).collect();
    let total = count.fetch_one(pool).await?;

    Ok((records, total))
}

fn filter_clause(
    trigger_filter: &str,
    complexity_filter: &str,
    active_only: bool,
) -> (String, Vec<String>) {
    let mut sql = String::new();
    let mut binds = Vec::new();

    if trigger_filter != "all" {
        sql.push_str(" AND w.trigger_type = ?");
        binds.push(trigger_filter.to_string());
    }
    if complexity_filter != "all" {
        sql.push_str(" AND w.complexity = ?");
        binds.push(complexity_filter.to_string());
    }
    if active_only {
        sql.push_str(" AND w.active = 1");
    }

    (sql, binds)
}

/// CLI entry point — runs a search and prints the matching page.
pub async fn run_search(
    config: &Config,
    query: &str,
    trigger: &str,
    complexity: &str,
    active_only: bool,
    limit: i64,
    offset: i64,
) -> Result<()> {
    let pool = db::connect(config).await?;

    let (records, total) =
        search_workflows(&pool, Some(query), trigger, complexity, active_only, limit, offset)
            .await?;

    if records.is_empty() {
        println!("No results.");
        pool.close().await;
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        println!(
            "{}. {} [{}/{}] {} nodes",
            offset + i as i64 + 1,
            record.name,
            record.trigger_type,
            record.complexity,
            record.node_count
        );
        if !record.integrations.is_empty() {
            println!("    integrations: {}", record.integrations.join(", "));
        }
        if !record.tags.is_empty() {
            println!("    tags: {}", record.tags.join(", "));
        }
        println!("    file: {}", record.filename);
        println!();
    }
    println!("total: {}", total);

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_yield_empty_clause() {
        let (sql, binds) = filter_clause("all", "all", false);
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_filters_combine_with_and() {
        let (sql, binds) = filter_clause("Webhook", "low", true);
        assert_eq!(
            sql,
            " AND w.trigger_type = ? AND w.complexity = ? AND w.active = 1"
        );
        assert_eq!(binds, vec!["Webhook".to_string(), "low".to_string()]);
    }

    #[test]
    fn test_unknown_filter_values_are_passed_through() {
        // Unknown values flow into the comparison and simply match nothing.
        let (sql, binds) = filter_clause("Bogus", "all", false);
        assert_eq!(sql, " AND w.trigger_type = ?");
        assert_eq!(binds, vec!["Bogus".to_string()]);
    }
}
