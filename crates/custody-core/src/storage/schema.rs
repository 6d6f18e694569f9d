pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS agent_metrics (
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
  updated_at TEXT NOT NULL
);
"#;

/// Columns added after the first release; applied with `ALTER TABLE` when missing.
pub const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    ("consecutive_successes", "INTEGER NOT NULL DEFAULT 0"),
    ("consecutive_failures", "INTEGER NOT NULL DEFAULT 0"),
];

pub const SCHEMA_VERSION: i64 = 2;
