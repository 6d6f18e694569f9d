//! Read-only aggregates over `agent_metrics`.

use crate::config::CustodyConfig;
use crate::model::{AgentMetrics, Difficulty, TestResult};
use crate::progression::{eligibility, Eligibility};
use crate::storage::store::Store;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub pass_rate: f64,
    /// Mean over retained history, not over every test ever given.
    pub average_score: f64,
    pub total_agents: usize,
    pub average_level: f64,
    /// Newest first.
    pub recent_tests: Vec<TestResult>,
    pub agents: BTreeMap<String, AgentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub agent_type: String,
    pub level: u32,
    pub xp: u64,
    pub prestige: u32,
    pub custody_level: u32,
    pub custody_xp: u64,
    pub total_tests_given: u64,
    pub total_tests_passed: u64,
    pub total_tests_failed: u64,
    pub pass_rate: f64,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub current_difficulty: Difficulty,
    pub last_test_date: Option<String>,
    #[serde(flatten)]
    pub eligibility: Eligibility,
}

impl AgentSummary {
    pub fn from_metrics(m: &AgentMetrics, config: &CustodyConfig) -> Self {
        Self {
            agent_id: m.agent_id.clone(),
            agent_type: m.agent_type.clone(),
            level: m.level,
            xp: m.xp,
            prestige: m.prestige,
            custody_level: m.custody_level,
            custody_xp: m.custody_xp,
            total_tests_given: m.total_tests_given,
            total_tests_passed: m.total_tests_passed,
            total_tests_failed: m.total_tests_failed,
            pass_rate: m.pass_rate(),
            consecutive_successes: m.consecutive_successes,
            consecutive_failures: m.consecutive_failures,
            current_difficulty: m.current_difficulty,
            last_test_date: m.last_test_date.clone(),
            eligibility: eligibility(m, &config.thresholds, config.settings.recent_tests()),
        }
    }
}

/// Analytics for every agent, or only `agent` when given. Never fails:
/// store errors are logged and produce an all-zero result.
pub fn get_analytics(store: &Store, config: &CustodyConfig, agent: Option<&str>) -> Analytics {
    match try_get_analytics(store, config, agent) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(
                event = "custody.analytics.failed",
                agent = agent.unwrap_or("*"),
                error = %format!("{:#}", e),
                "analytics unavailable, returning empty result"
            );
            Analytics::default()
        }
    }
}

pub fn try_get_analytics(
    store: &Store,
    config: &CustodyConfig,
    agent: Option<&str>,
) -> anyhow::Result<Analytics> {
    let rows: Vec<AgentMetrics> = match agent {
        Some(a) => store.get_metrics(a)?.into_iter().collect(),
        None => store.list_metrics()?,
    };
    Ok(aggregate(&rows, config))
}

pub fn agent_status(
    store: &Store,
    config: &CustodyConfig,
    agent: &str,
) -> anyhow::Result<Option<AgentSummary>> {
    Ok(store
        .get_metrics(agent)?
        .map(|m| AgentSummary::from_metrics(&m, config)))
}

fn aggregate(rows: &[AgentMetrics], config: &CustodyConfig) -> Analytics {
    if rows.is_empty() {
        return Analytics::default();
    }

    let total_tests: u64 = rows.iter().map(|m| m.total_tests_given).sum();
    let passed_tests: u64 = rows.iter().map(|m| m.total_tests_passed).sum();
    let failed_tests: u64 = rows.iter().map(|m| m.total_tests_failed).sum();

    let mut history: Vec<&TestResult> = rows.iter().flat_map(|m| m.test_history.iter()).collect();
    let average_score = if history.is_empty() {
        0.0
    } else {
        history.iter().map(|t| t.score).sum::<f64>() / history.len() as f64
    };

    history.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.test_id.cmp(&a.test_id))
    });
    let recent_tests = history
        .into_iter()
        .take(config.settings.recent_tests())
        .cloned()
        .collect();

    let agents: BTreeMap<String, AgentSummary> = rows
        .iter()
        .map(|m| (m.agent_type.clone(), AgentSummary::from_metrics(m, config)))
        .collect();

    Analytics {
        total_tests,
        passed_tests,
        failed_tests,
        pass_rate: if total_tests == 0 {
            0.0
        } else {
            passed_tests as f64 / total_tests as f64
        },
        average_score,
        total_agents: rows.len(),
        average_level: rows.iter().map(|m| m.custody_level as f64).sum::<f64>() / rows.len() as f64,
        recent_tests,
        agents,
    }
}
