//! Direct-API tests for the indexing pass, storage layer, and query engine,
//! run against a real temp-file SQLite database.

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

use flowdex::config::{Config, CorpusConfig, DbConfig, ServerConfig};
use flowdex::{collect_stats, delete_workflow, index_corpus, search_by_category, search_workflows};
use flowdex::{db, get, migrate};

struct TestEnv {
    _tmp: TempDir,
    config: Config,
    pool: sqlx::SqlitePool,
}

async fn setup() -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let corpus_root = tmp.path().join("workflows");
    fs::create_dir_all(&corpus_root).unwrap();

    let config = Config {
        db: DbConfig {
            path: tmp.path().join("data").join("flowdex.sqlite"),
        },
        corpus: CorpusConfig {
            root: corpus_root,
            include_globs: vec!["**/*.json".to_string()],
            exclude_globs: Vec::new(),
        },
        server: ServerConfig::default(),
    };

    let pool = db::connect(&config).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();

    TestEnv {
        _tmp: tmp,
        config,
        pool,
    }
}

fn write_workflow(env: &TestEnv, filename: &str, doc: &Value) {
    fs::write(
        env.config.corpus.root.join(filename),
        serde_json::to_string_pretty(doc).unwrap(),
    )
    .unwrap();
}

fn webhook_workflow(name: &str, active: bool) -> Value {
    json!({
        "name": name,
        "active": active,
        "nodes": [
            {"type": "n8n-nodes-base.webhook", "name": "Entry"},
            {"type": "n8n-nodes-base.slack", "name": "Post"}
        ],
        "connections": {}
    })
}

fn manual_workflow(name: &str, active: bool) -> Value {
    json!({
        "name": name,
        "active": active,
        "nodes": [
            {"type": "n8n-nodes-base.set", "name": "Assign"}
        ],
        "connections": {}
    })
}

// ---- indexing pass ----

#[tokio::test]
async fn test_index_pass_is_idempotent() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    write_workflow(&env, "0002_beta.json", &webhook_workflow("Beta pipeline", true));
    write_workflow(&env, "0003_gamma.json", &manual_workflow("Gamma report", false));

    let first = index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    assert_eq!(first.processed, 3);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.errors, 0);

    let (before, _) = search_workflows(&env.pool, None, "all", "all", false, 10, 0)
        .await
        .unwrap();

    let second = index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.errors, 0);

    let (after, _) = search_workflows(&env.pool, None, "all", "all", false, 10, 0)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&before).unwrap(),
        serde_json::to_value(&after).unwrap()
    );
}

#[tokio::test]
async fn test_force_reindexes_and_keeps_ids_stable() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));

    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    let id_before = get::get_workflow_record(&env.pool, "0001_alpha.json")
        .await
        .unwrap()
        .unwrap()
        .id;

    let report = index_corpus(&env.pool, &env.config.corpus, true).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);

    let id_after = get::get_workflow_record(&env.pool, "0001_alpha.json")
        .await
        .unwrap()
        .unwrap()
        .id;
    assert_eq!(id_before, id_after);
}

#[tokio::test]
async fn test_modified_file_is_reprocessed_and_fts_follows() {
    let env = setup().await;
    write_workflow(&env, "0001_first.json", &webhook_workflow("Aurora pipeline", true));
    write_workflow(&env, "0002_second.json", &webhook_workflow("Beta pipeline", true));

    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    write_workflow(&env, "0001_first.json", &webhook_workflow("Borealis pipeline", true));
    let report = index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);

    let (hits, total) = search_workflows(&env.pool, Some("Borealis"), "all", "all", false, 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].filename, "0001_first.json");
    assert_eq!(hits[0].name, "Borealis pipeline");

    // The stale name must be gone from the text index
    let (_, stale_total) = search_workflows(&env.pool, Some("Aurora"), "all", "all", false, 10, 0)
        .await
        .unwrap();
    assert_eq!(stale_total, 0);
}

#[tokio::test]
async fn test_malformed_files_are_counted_not_fatal() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    fs::write(env.config.corpus.root.join("broken.json"), "{ not json at all").unwrap();
    fs::write(env.config.corpus.root.join("binary.json"), [0xffu8, 0xfe, 0x00, 0x01]).unwrap();

    let report = index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.errors, 2);

    assert!(get::get_workflow_record(&env.pool, "broken.json")
        .await
        .unwrap()
        .is_none());
    assert!(get::get_workflow_record(&env.pool, "binary.json")
        .await
        .unwrap()
        .is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_entries_are_counted_not_fatal() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    // A dangling symlink is unreadable during the walk itself
    std::os::unix::fs::symlink(
        env.config.corpus.root.join("no-such-target.json"),
        env.config.corpus.root.join("dangling.json"),
    )
    .unwrap();

    let report = index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.errors, 1);
}

#[tokio::test]
async fn test_missing_corpus_directory_yields_zero_report() {
    let env = setup().await;
    let mut corpus = env.config.corpus.clone();
    corpus.root = env.config.corpus.root.join("does-not-exist");

    let report = index_corpus(&env.pool, &corpus, false).await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.errors, 0);
}

// ---- query engine ----

#[tokio::test]
async fn test_filter_conjunction_and_pagination_accounting() {
    let env = setup().await;
    for i in 1..=5 {
        write_workflow(
            &env,
            &format!("{:04}_hook.json", i),
            &webhook_workflow(&format!("Hook number {}", i), true),
        );
    }
    write_workflow(&env, "0006_hook_off.json", &webhook_workflow("Hook off six", false));
    write_workflow(&env, "0007_hook_off.json", &webhook_workflow("Hook off seven", false));
    write_workflow(&env, "0008_manual.json", &manual_workflow("Manual eight", true));

    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let mut seen = 0usize;
    let mut offset = 0i64;
    loop {
        let (page, total) =
            search_workflows(&env.pool, None, "Webhook", "all", true, 2, offset)
                .await
                .unwrap();
        assert_eq!(total, 5);
        for record in &page {
            assert_eq!(record.trigger_type, "Webhook");
            assert!(record.active);
        }
        if page.is_empty() {
            break;
        }
        seen += page.len();
        offset += 2;
    }
    assert_eq!(seen, 5);
}

#[tokio::test]
async fn test_unknown_filter_value_matches_nothing() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let (page, total) = search_workflows(&env.pool, None, "Bogus", "all", false, 10, 0)
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_category_search_membership() {
    let env = setup().await;
    write_workflow(
        &env,
        "0001_slack.json",
        &json!({
            "name": "Announce release",
            "active": true,
            "nodes": [{"type": "n8n-nodes-base.slack", "name": "Announce"}],
            "connections": {}
        }),
    );
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let (hits, total) = search_by_category(&env.pool, "messaging", 10, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].filename, "0001_slack.json");
    assert_eq!(hits[0].integrations, vec!["Slack".to_string()]);

    let (_, other_total) = search_by_category(&env.pool, "database", 10, 0).await.unwrap();
    assert_eq!(other_total, 0);

    let (unknown, unknown_total) = search_by_category(&env.pool, "bogus", 10, 0).await.unwrap();
    assert!(unknown.is_empty());
    assert_eq!(unknown_total, 0);
}

#[tokio::test]
async fn test_tag_normalization_on_read_path() {
    let env = setup().await;
    write_workflow(
        &env,
        "0001_tagged.json",
        &json!({
            "name": "Tagged flow",
            "active": true,
            "nodes": [],
            "tags": [{"id": 7}, {"name": "prod"}, "manual"],
            "connections": {}
        }),
    );
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let record = get::get_workflow_record(&env.pool, "0001_tagged.json")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.tags, vec!["7", "prod", "manual"]);
}

#[tokio::test]
async fn test_stats_aggregates() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    write_workflow(&env, "0002_beta.json", &webhook_workflow("Beta pipeline", true));
    write_workflow(&env, "0003_gamma.json", &manual_workflow("Gamma report", false));
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let stats = collect_stats(&env.pool).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 2);
    assert_eq!(stats.inactive, 1);
    assert_eq!(stats.triggers.get("Webhook"), Some(&2));
    assert_eq!(stats.triggers.get("Manual"), Some(&1));
    assert_eq!(stats.complexity.get("low"), Some(&3));
    assert_eq!(stats.total_nodes, 5);
    // Webhook + Slack
    assert_eq!(stats.unique_integrations, 2);
}

#[tokio::test]
async fn test_delete_removes_record_and_index_entry() {
    let env = setup().await;
    write_workflow(&env, "0001_alpha.json", &webhook_workflow("Alpha pipeline", true));
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    assert!(delete_workflow(&env.pool, "0001_alpha.json").await.unwrap());
    assert!(get::get_workflow_record(&env.pool, "0001_alpha.json")
        .await
        .unwrap()
        .is_none());

    let (_, total) = search_workflows(&env.pool, Some("Alpha"), "all", "all", false, 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 0);

    // Deleting again is a no-op
    assert!(!delete_workflow(&env.pool, "0001_alpha.json").await.unwrap());
}

#[tokio::test]
async fn test_detail_retrieval_returns_raw_document() {
    let env = setup().await;
    let doc = webhook_workflow("Alpha pipeline", true);
    write_workflow(&env, "0001_alpha.json", &doc);
    index_corpus(&env.pool, &env.config.corpus, false).await.unwrap();

    let (record, raw) =
        get::get_workflow_detail(&env.pool, &env.config.corpus.root, "0001_alpha.json")
            .await
            .unwrap()
            .unwrap();
    assert_eq!(record.name, "Alpha pipeline");
    assert_eq!(raw, doc);

    // Missing records and traversal attempts are absence, not engine errors
    let missing = get::get_workflow_detail(&env.pool, &env.config.corpus.root, "nope.json")
        .await
        .unwrap();
    assert!(missing.is_none());

    let traversal =
        get::get_workflow_detail(&env.pool, &env.config.corpus.root, "../0001_alpha.json")
            .await
            .unwrap();
    assert!(traversal.is_none());
}
