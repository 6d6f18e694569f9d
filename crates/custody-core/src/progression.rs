//! XP, level and eligibility rules applied to an agent after every test.

use crate::model::{AgentMetrics, Difficulty, TestResult};
use crate::thresholds::ThresholdConfig;
use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: u64 = 100;

/// XP earned for one result. A zero score still earns half the base award.
pub fn xp_award(result: &TestResult) -> u32 {
    let (pass_base, fail_base) = result.kind.base_xp();
    let base = if result.passed { pass_base } else { fail_base };
    let score_factor = if result.score > 0.0 {
        result.score / 100.0
    } else {
        0.5
    };
    (base as f64 * result.difficulty.xp_multiplier() * score_factor).floor() as u32
}

pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL + 1).min(u32::MAX as u64) as u32
}

/// Fold one result into the agent's counters. Returns the XP awarded and
/// stamps it onto the history entry.
pub fn apply_result(metrics: &mut AgentMetrics, result: &TestResult, history_limit: usize) -> u32 {
    metrics.total_tests_given += 1;
    if result.passed {
        metrics.total_tests_passed += 1;
        metrics.consecutive_successes += 1;
        metrics.consecutive_failures = 0;
    } else {
        metrics.total_tests_failed += 1;
        metrics.consecutive_failures += 1;
        metrics.consecutive_successes = 0;
    }

    let awarded = xp_award(result);
    metrics.custody_xp += awarded as u64;
    metrics.xp += awarded as u64;

    let new_level = level_for_xp(metrics.custody_xp);
    if new_level > metrics.custody_level {
        tracing::info!(
            agent = %metrics.agent_type,
            from = metrics.custody_level,
            to = new_level,
            "custody level up"
        );
        metrics.custody_level = new_level;
    }
    metrics.level = metrics.custody_level;
    metrics.current_difficulty = Difficulty::for_level(metrics.custody_level);

    let mut entry = result.clone();
    entry.xp_awarded = awarded;
    metrics.test_history.push(entry);
    if metrics.test_history.len() > history_limit {
        let excess = metrics.test_history.len() - history_limit;
        metrics.test_history.drain(..excess);
    }

    // Results can commit out of start order; keep the latest.
    if metrics
        .last_test_date
        .as_deref()
        .map_or(true, |seen| result.timestamp.as_str() > seen)
    {
        metrics.last_test_date = Some(result.timestamp.clone());
    }
    awarded
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub can_level_up: bool,
    pub can_create_proposals: bool,
}

pub fn eligibility(metrics: &AgentMetrics, thresholds: &ThresholdConfig, recent: usize) -> Eligibility {
    let can_level_up = metrics.custody_level < thresholds.max_level()
        && metrics.pass_rate() >= thresholds.level_up_pass_rate();

    let window = &metrics.test_history[metrics.test_history.len().saturating_sub(recent)..];
    let recent_passed = window.iter().filter(|t| t.passed).count();
    let recent_rate = if window.is_empty() {
        0.0
    } else {
        recent_passed as f64 / window.len() as f64
    };
    let can_create_proposals = metrics.custody_level >= thresholds.proposal_min_level()
        && window.len() >= thresholds.proposal_min_tests()
        && recent_rate >= thresholds.proposal_pass_rate();

    Eligibility {
        can_level_up,
        can_create_proposals,
    }
}
