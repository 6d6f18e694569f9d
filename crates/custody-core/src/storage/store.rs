use crate::model::{AgentMetrics, Difficulty, TestResult};
use crate::storage::cache::MetricsCache;
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const METRICS_COLUMNS: &str = "agent_type, agent_id, level, xp, prestige, custody_level, custody_xp,
     total_tests_given, total_tests_passed, total_tests_failed,
     consecutive_successes, consecutive_failures, current_difficulty,
     test_history, last_test_date";

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
    cache: MetricsCache,
}

pub struct StoreStats {
    pub agents: Option<u64>,
    pub tests: Option<u64>,
    pub last_test_at: Option<String>,
    pub version: Option<String>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            cache: MetricsCache::new(crate::config::DEFAULT_CACHE_ENTRIES),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            cache: MetricsCache::new(crate::config::DEFAULT_CACHE_ENTRIES),
        })
    }

    pub fn with_cache_entries(mut self, entries: u64) -> Self {
        self.cache = MetricsCache::new(entries);
        self
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("metrics store connection lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;

        let cols = get_columns(&conn, "agent_metrics")?;
        for (col, ty) in crate::storage::schema::ADDITIVE_COLUMNS {
            add_column_if_missing(&conn, &cols, "agent_metrics", col, ty)?;
        }

        conn.execute_batch(&format!(
            "PRAGMA user_version = {}",
            crate::storage::schema::SCHEMA_VERSION
        ))?;
        Ok(())
    }

    /// Read-through lookup; `None` for an agent that was never tested.
    /// Cached rows are only served while no other connection has committed.
    pub fn get_metrics(&self, agent_type: &str) -> anyhow::Result<Option<AgentMetrics>> {
        let conn = self.lock()?;
        let version = data_version(&conn)?;
        if let Some(hit) = self.cache.get(agent_type, version) {
            return Ok(Some(hit));
        }
        let found = select_metrics(&conn, agent_type)?;
        if let Some(m) = &found {
            self.cache.put(m, version);
        }
        Ok(found)
    }

    pub fn list_metrics(&self) -> anyhow::Result<Vec<AgentMetrics>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM agent_metrics ORDER BY agent_type ASC",
            METRICS_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], row_to_metrics)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Upsert keyed by `agent_type`, overwriting every counter with the
    /// supplied values. Read-modify-write callers racing through this path
    /// lose updates; use [`Store::record_outcome`] for test results.
    pub fn persist_metrics(&self, agent_type: &str, metrics: &AgentMetrics) -> anyhow::Result<()> {
        let conn = self.lock()?;
        upsert_metrics(&conn, agent_type, metrics).context("persist agent metrics")?;
        self.cache.invalidate(agent_type);
        tracing::debug!(
            agent = %agent_type,
            tests = metrics.total_tests_given,
            passed = metrics.total_tests_passed,
            failed = metrics.total_tests_failed,
            xp = metrics.custody_xp,
            level = metrics.custody_level,
            "persisted custody metrics"
        );
        Ok(())
    }

    /// Read-modify-write of one agent row inside an immediate transaction.
    /// The row is created on first use.
    pub fn record_outcome<T>(
        &self,
        agent_type: &str,
        apply: impl FnOnce(&mut AgentMetrics) -> T,
    ) -> anyhow::Result<(AgentMetrics, T)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut metrics =
            select_metrics(&tx, agent_type)?.unwrap_or_else(|| AgentMetrics::new(agent_type));
        let out = apply(&mut metrics);
        upsert_metrics(&tx, agent_type, &metrics).context("write agent metrics")?;
        tx.commit().context("commit agent metrics")?;

        self.cache.invalidate(agent_type);
        Ok((metrics, out))
    }

    /// Zero an agent's custody counters and history. Prestige survives.
    /// Returns false when the agent has no row.
    pub fn reset_metrics(&self, agent_type: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE agent_metrics
             SET level = 1, xp = 0, custody_level = 1, custody_xp = 0,
                 total_tests_given = 0, total_tests_passed = 0, total_tests_failed = 0,
                 consecutive_successes = 0, consecutive_failures = 0,
                 current_difficulty = 'basic', test_history = '[]',
                 updated_at = ?2
             WHERE agent_type = ?1",
            params![agent_type, now_rfc3339()],
        )?;
        self.cache.invalidate(agent_type);
        Ok(changed > 0)
    }

    pub fn stats_best_effort(&self) -> anyhow::Result<StoreStats> {
        let conn = self.lock()?;

        let agents: Option<u64> = conn
            .query_row("SELECT COUNT(*) FROM agent_metrics", [], |r| {
                r.get::<_, i64>(0).map(|x| x as u64)
            })
            .ok();
        let tests: Option<u64> = conn
            .query_row(
                "SELECT COALESCE(SUM(total_tests_given), 0) FROM agent_metrics",
                [],
                |r| r.get::<_, i64>(0).map(|x| x as u64),
            )
            .ok();
        let last_test_at: Option<String> = conn
            .query_row("SELECT MAX(last_test_date) FROM agent_metrics", [], |r| {
                r.get::<_, Option<String>>(0)
            })
            .ok()
            .flatten();
        let version: Option<String> = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .ok()
            .map(|v: i64| v.to_string());

        Ok(StoreStats {
            agents,
            tests,
            last_test_at,
            version,
        })
    }
}

/// Changes whenever another connection commits to the database file.
fn data_version(conn: &Connection) -> anyhow::Result<i64> {
    conn.query_row("PRAGMA data_version", [], |r| r.get(0))
        .context("read sqlite data_version")
}

fn select_metrics(conn: &Connection, agent_type: &str) -> anyhow::Result<Option<AgentMetrics>> {
    let sql = format!(
        "SELECT {} FROM agent_metrics WHERE agent_type = ?1",
        METRICS_COLUMNS
    );
    let found = conn
        .query_row(&sql, params![agent_type], row_to_metrics)
        .optional()
        .with_context(|| format!("load agent metrics for {}", agent_type))?;
    Ok(found)
}

fn upsert_metrics(conn: &Connection, agent_type: &str, m: &AgentMetrics) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO agent_metrics (
            agent_type, agent_id, level, xp, prestige, custody_level, custody_xp,
            total_tests_given, total_tests_passed, total_tests_failed,
            consecutive_successes, consecutive_failures, current_difficulty,
            test_history, last_test_date, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(agent_type) DO UPDATE SET
            agent_id=excluded.agent_id,
            level=excluded.level,
            xp=excluded.xp,
            prestige=excluded.prestige,
            custody_level=excluded.custody_level,
            custody_xp=excluded.custody_xp,
            total_tests_given=excluded.total_tests_given,
            total_tests_passed=excluded.total_tests_passed,
            total_tests_failed=excluded.total_tests_failed,
            consecutive_successes=excluded.consecutive_successes,
            consecutive_failures=excluded.consecutive_failures,
            current_difficulty=excluded.current_difficulty,
            test_history=excluded.test_history,
            last_test_date=excluded.last_test_date,
            updated_at=excluded.updated_at",
        params![
            agent_type,
            m.agent_id,
            m.level as i64,
            m.xp as i64,
            m.prestige as i64,
            m.custody_level as i64,
            m.custody_xp as i64,
            m.total_tests_given as i64,
            m.total_tests_passed as i64,
            m.total_tests_failed as i64,
            m.consecutive_successes as i64,
            m.consecutive_failures as i64,
            m.current_difficulty.as_str(),
            serde_json::to_string(&m.test_history)?,
            m.last_test_date,
            now_rfc3339(),
        ],
    )?;
    Ok(())
}

fn row_to_metrics(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentMetrics> {
    let history_json: String = row.get(13)?;
    let test_history: Vec<TestResult> = serde_json::from_str(&history_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let difficulty: String = row.get(12)?;

    Ok(AgentMetrics {
        agent_type: row.get(0)?,
        agent_id: row.get(1)?,
        level: row.get::<_, i64>(2)? as u32,
        xp: row.get::<_, i64>(3)? as u64,
        prestige: row.get::<_, i64>(4)? as u32,
        custody_level: row.get::<_, i64>(5)? as u32,
        custody_xp: row.get::<_, i64>(6)? as u64,
        total_tests_given: row.get::<_, i64>(7)? as u64,
        total_tests_passed: row.get::<_, i64>(8)? as u64,
        total_tests_failed: row.get::<_, i64>(9)? as u64,
        consecutive_successes: row.get::<_, i64>(10)? as u32,
        consecutive_failures: row.get::<_, i64>(11)? as u32,
        current_difficulty: Difficulty::parse_lossy(&difficulty),
        test_history,
        last_test_date: row.get(14)?,
    })
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn get_columns(
    conn: &Connection,
    table: &str,
) -> anyhow::Result<std::collections::HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = std::collections::HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn add_column_if_missing(
    conn: &Connection,
    cols: &std::collections::HashSet<String>,
    table: &str,
    col: &str,
    ty: &str,
) -> anyhow::Result<()> {
    if !cols.contains(col) {
        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col, ty);
        conn.execute(&sql, [])?;
    }
    Ok(())
}
