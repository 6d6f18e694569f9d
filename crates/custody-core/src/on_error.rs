// on_error.rs - Scoring fallback policy
//
// A scoring metric that errors out must still produce a score. Historical
// deployments disagreed on the value (0 vs 75); the default here is 0 and
// the legacy value stays selectable until the product owner confirms.

use serde::{Deserialize, Serialize};

/// What score to use when a metric fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnScoringError {
    /// Score 0.0: an unscorable answer never passes.
    #[default]
    Zero,

    /// Score 75.0, the value some older deployments returned.
    LegacyNeutral,
}

impl OnScoringError {
    pub fn fallback_score(&self) -> f64 {
        match self {
            OnScoringError::Zero => 0.0,
            OnScoringError::LegacyNeutral => 75.0,
        }
    }

    /// Apply the policy to a scoring error, returning the substitute score.
    pub fn apply_to_error(&self, metric: &str, error: &anyhow::Error) -> f64 {
        let score = self.fallback_score();
        log_scoring_fallback(metric, &error.to_string(), score);
        score
    }
}

/// Structured audit event for a scoring fallback.
pub fn log_scoring_fallback(metric: &str, reason: &str, score: f64) {
    tracing::warn!(
        event = "custody.scoring.fallback",
        metric = %metric,
        reason = %reason,
        fallback_score = score,
        "Scoring fallback triggered: {}", reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        assert_eq!(OnScoringError::default(), OnScoringError::Zero);
        assert_eq!(OnScoringError::default().fallback_score(), 0.0);
    }

    #[test]
    fn test_legacy_neutral() {
        let policy = OnScoringError::LegacyNeutral;
        let error = anyhow::anyhow!("tokenizer exploded");
        assert_eq!(policy.apply_to_error("heuristic", &error), 75.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let zero: OnScoringError = serde_yaml::from_str("zero").unwrap();
        assert_eq!(zero, OnScoringError::Zero);

        #[derive(Deserialize)]
        struct Settings {
            on_scoring_error: OnScoringError,
        }

        let s: Settings = serde_yaml::from_str("on_scoring_error: legacy_neutral").unwrap();
        assert_eq!(s.on_scoring_error, OnScoringError::LegacyNeutral);
    }
}
