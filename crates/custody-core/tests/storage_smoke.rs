use custody_core::model::{AgentMetrics, Difficulty};
use custody_core::progression::apply_result;
use custody_core::storage::store::Store;
use tempfile::tempdir;

fn sample_result(agent: &str, score: f64, passed: bool) -> custody_core::model::TestResult {
    custody_core::model::TestResult {
        test_id: format!("custody-{}-{}", agent, score),
        ai_type: agent.into(),
        test_category: Default::default(),
        difficulty: Difficulty::Basic,
        kind: Default::default(),
        timestamp: "2026-03-01T10:00:00.000Z".into(),
        score,
        passed,
        xp_awarded: 0,
        error: None,
    }
}

#[test]
fn test_storage_smoke_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("custody.db");

    let store = Store::open(&db_path)?;
    store.init_schema()?;

    // Unknown agents have no row until their first test.
    assert!(store.get_metrics("imperium")?.is_none());

    let (m, awarded) = store.record_outcome("imperium", |m| {
        apply_result(m, &sample_result("imperium", 85.0, true), 50)
    })?;
    assert_eq!(awarded, 42);
    assert_eq!(m.total_tests_given, 1);

    let loaded = store.get_metrics("imperium")?.expect("row created");
    assert_eq!(loaded, m);
    assert_eq!(loaded.agent_id, "imperium_agent");
    assert_eq!(loaded.test_history.len(), 1);
    assert_eq!(loaded.test_history[0].xp_awarded, 42);

    // Verify via a raw connection
    let conn = rusqlite::Connection::open(&db_path)?;
    let count: i64 = conn.query_row("SELECT count(*) FROM agent_metrics", [], |r| r.get(0))?;
    assert_eq!(count, 1);
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    assert_eq!(version, 2);

    Ok(())
}

#[test]
fn test_persist_metrics_is_full_replace() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;

    let mut m = AgentMetrics::new("guardian");
    m.total_tests_given = 10;
    m.total_tests_passed = 7;
    m.total_tests_failed = 3;
    m.custody_xp = 350;
    m.custody_level = 4;
    store.persist_metrics("guardian", &m)?;

    let mut second = AgentMetrics::new("guardian");
    second.total_tests_given = 1;
    second.total_tests_failed = 1;
    store.persist_metrics("guardian", &second)?;

    let loaded = store.get_metrics("guardian")?.expect("row");
    assert_eq!(loaded.total_tests_given, 1);
    assert_eq!(loaded.total_tests_passed, 0);
    assert_eq!(loaded.custody_xp, 0);
    assert_eq!(loaded.custody_level, 1);
    Ok(())
}

#[test]
fn test_cache_is_invalidated_on_write() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;

    let mut m = AgentMetrics::new("sandbox");
    m.total_tests_given = 2;
    store.persist_metrics("sandbox", &m)?;
    // Warm the cache.
    assert_eq!(store.get_metrics("sandbox")?.unwrap().total_tests_given, 2);

    store.record_outcome("sandbox", |m| {
        apply_result(m, &sample_result("sandbox", 10.0, false), 50)
    })?;
    assert_eq!(store.get_metrics("sandbox")?.unwrap().total_tests_given, 3);

    m.total_tests_given = 9;
    store.persist_metrics("sandbox", &m)?;
    assert_eq!(store.get_metrics("sandbox")?.unwrap().total_tests_given, 9);
    Ok(())
}

#[test]
fn test_cache_sees_writes_from_another_handle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("custody.db");
    let cfg = custody_core::config::CustodyConfig::default();

    let a = Store::open(&db_path)?;
    a.init_schema()?;
    let b = Store::open(&db_path)?;

    a.record_outcome("sandbox", |m| {
        apply_result(m, &sample_result("sandbox", 20.0, false), 50)
    })?;
    // Warm a's cache.
    assert_eq!(a.get_metrics("sandbox")?.unwrap().total_tests_given, 1);

    b.record_outcome("sandbox", |m| {
        apply_result(m, &sample_result("sandbox", 90.0, true), 50)
    })?;
    assert_eq!(a.get_metrics("sandbox")?.unwrap().total_tests_given, 2);

    assert!(b.reset_metrics("sandbox")?);
    assert_eq!(a.get_metrics("sandbox")?.unwrap().total_tests_given, 0);

    let filtered = custody_core::analytics::get_analytics(&a, &cfg, Some("sandbox"));
    let global = custody_core::analytics::get_analytics(&a, &cfg, None);
    assert_eq!(filtered.total_tests, 0);
    assert_eq!(filtered.total_tests, global.total_tests);
    Ok(())
}

#[test]
fn test_reset_keeps_prestige_and_clears_history() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;

    assert!(!store.reset_metrics("conquest")?);

    store.record_outcome("conquest", |m| {
        m.prestige = 3;
        apply_result(m, &sample_result("conquest", 95.0, true), 50)
    })?;
    assert!(store.reset_metrics("conquest")?);

    let m = store.get_metrics("conquest")?.expect("row");
    assert_eq!(m.prestige, 3);
    assert_eq!(m.custody_level, 1);
    assert_eq!(m.level, 1);
    assert_eq!(m.custody_xp, 0);
    assert_eq!(m.total_tests_given, 0);
    assert_eq!(m.consecutive_successes, 0);
    assert_eq!(m.current_difficulty, Difficulty::Basic);
    assert!(m.test_history.is_empty());
    Ok(())
}

#[test]
fn test_migration_adds_streak_columns() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("legacy.db");

    // Schema as shipped before streaks were tracked.
    {
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute_batch(
            "CREATE TABLE agent_metrics (
                agent_type TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL UNIQUE,
                level INTEGER NOT NULL DEFAULT 1,
                xp INTEGER NOT NULL DEFAULT 0,
                prestige INTEGER NOT NULL DEFAULT 0,
                custody_level INTEGER NOT NULL DEFAULT 1,
                custody_xp INTEGER NOT NULL DEFAULT 0,
                total_tests_given INTEGER NOT NULL DEFAULT 0,
                total_tests_passed INTEGER NOT NULL DEFAULT 0,
                total_tests_failed INTEGER NOT NULL DEFAULT 0,
                current_difficulty TEXT NOT NULL DEFAULT 'basic',
                test_history TEXT NOT NULL DEFAULT '[]',
                last_test_date TEXT,
                updated_at TEXT
            );
            INSERT INTO agent_metrics (agent_type, agent_id, total_tests_given, total_tests_passed)
            VALUES ('imperium', 'imperium_agent', 4, 4);",
        )?;
    }

    let store = Store::open(&db_path)?;
    store.init_schema()?;
    // Idempotent.
    store.init_schema()?;

    let m = store.get_metrics("imperium")?.expect("legacy row");
    assert_eq!(m.total_tests_given, 4);
    assert_eq!(m.consecutive_successes, 0);
    assert_eq!(m.consecutive_failures, 0);
    Ok(())
}

#[test]
fn test_stats_best_effort() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;

    let empty = store.stats_best_effort()?;
    assert_eq!(empty.agents, Some(0));
    assert_eq!(empty.tests, Some(0));
    assert_eq!(empty.last_test_at, None);

    for agent in ["imperium", "guardian"] {
        store.record_outcome(agent, |m| {
            apply_result(m, &sample_result(agent, 80.0, true), 50)
        })?;
    }
    let stats = store.stats_best_effort()?;
    assert_eq!(stats.agents, Some(2));
    assert_eq!(stats.tests, Some(2));
    assert_eq!(stats.last_test_at.as_deref(), Some("2026-03-01T10:00:00.000Z"));
    assert_eq!(stats.version.as_deref(), Some("2"));
    Ok(())
}
