use crate::signals::{
    distinct_terms, length_points, Markers, CODE_POINTS, INNOVATION_CAP, INNOVATION_POINTS,
    INNOVATION_TERMS, STRUCTURE_POINTS, TECHNICAL_CAP, TECHNICAL_POINTS, TECHNICAL_TERMS,
};
use async_trait::async_trait;
use custody_core::metrics_api::{Metric, MetricResult, ScoringContext};
use custody_core::model::{AiResponse, Difficulty};
use std::sync::Arc;

/// Keyword and shape heuristic for free-text answers, scaled by difficulty.
pub struct HeuristicScoreMetric {
    markers: Markers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub length: f64,
    pub technical: f64,
    pub technical_terms: Vec<&'static str>,
    pub code: f64,
    pub structure: f64,
    pub innovation: f64,
    pub innovation_terms: Vec<&'static str>,
    pub multiplier: f64,
    pub score: f64,
}

impl Breakdown {
    pub fn raw(&self) -> f64 {
        self.length + self.technical + self.code + self.structure + self.innovation
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "length": self.length,
            "technical": self.technical,
            "technical_terms": self.technical_terms,
            "code": self.code,
            "structure": self.structure,
            "innovation": self.innovation,
            "innovation_terms": self.innovation_terms,
            "raw": self.raw(),
            "multiplier": self.multiplier,
        })
    }
}

impl HeuristicScoreMetric {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            markers: Markers::new()?,
        })
    }

    /// Pure scoring of `text` at `difficulty`, clamped to [0, 100].
    pub fn breakdown(&self, text: &str, difficulty: Difficulty) -> Breakdown {
        let lowered = text.to_lowercase();

        let technical_terms = distinct_terms(&lowered, &TECHNICAL_TERMS);
        let innovation_terms = distinct_terms(&lowered, &INNOVATION_TERMS);

        let mut b = Breakdown {
            length: length_points(text.chars().count()),
            technical: (technical_terms.len() as f64 * TECHNICAL_POINTS).min(TECHNICAL_CAP),
            technical_terms,
            code: if self.markers.has_code(text) {
                CODE_POINTS
            } else {
                0.0
            },
            structure: if self.markers.has_structure(text) {
                STRUCTURE_POINTS
            } else {
                0.0
            },
            innovation: (innovation_terms.len() as f64 * INNOVATION_POINTS).min(INNOVATION_CAP),
            innovation_terms,
            multiplier: difficulty.score_multiplier(),
            score: 0.0,
        };
        b.score = (b.raw() * b.multiplier).clamp(0.0, 100.0);
        b
    }
}

#[async_trait]
impl Metric for HeuristicScoreMetric {
    fn name(&self) -> &'static str {
        "heuristic_score"
    }

    async fn evaluate(
        &self,
        ctx: &ScoringContext,
        resp: &AiResponse,
    ) -> anyhow::Result<MetricResult> {
        if ctx.is_context_free() {
            tracing::debug!(metric = self.name(), "no test content or scenario, scoring 0");
            return Ok(MetricResult::zero("missing test context"));
        }

        let b = self.breakdown(&resp.text, ctx.difficulty);
        Ok(MetricResult::scored(b.score, b.to_json()))
    }
}

pub fn metric() -> anyhow::Result<Arc<dyn Metric>> {
    Ok(Arc::new(HeuristicScoreMetric::new()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(difficulty: Difficulty) -> ScoringContext {
        ScoringContext {
            difficulty,
            test_content: None,
            scenario: Some("Harden the login service".into()),
        }
    }

    fn resp(text: &str) -> AiResponse {
        AiResponse {
            text: text.into(),
            source: "test".into(),
            meta: serde_json::json!({}),
        }
    }

    fn rich_answer() -> String {
        let mut s = String::from(
            "# Plan\n\n1. Review the api and database security model.\n\
             - Add authentication and encryption at rest.\n\
             - Tune performance with a novel, innovative caching design.\n\n\
             ```python\ndef rotate_keys(store):\n    return store.rotate()\n```\n",
        );
        while s.chars().count() <= 800 {
            s.push_str("The architecture keeps deployment simple and the algorithm predictable. ");
        }
        s
    }

    #[tokio::test]
    async fn missing_context_scores_zero() {
        let m = HeuristicScoreMetric::new().unwrap();
        let r = m
            .evaluate(&ScoringContext::new(Difficulty::Legendary), &resp(&rich_answer()))
            .await
            .unwrap();
        assert_eq!(r.score, 0.0);
        assert_eq!(r.details["reason"], "missing test context");

        let blank = ScoringContext {
            difficulty: Difficulty::Basic,
            test_content: Some(serde_json::json!({})),
            scenario: Some("   ".into()),
        };
        let r = m.evaluate(&blank, &resp(&rich_answer())).await.unwrap();
        assert_eq!(r.score, 0.0);
    }

    #[tokio::test]
    async fn empty_response_scores_zero() {
        let m = HeuristicScoreMetric::new().unwrap();
        for d in Difficulty::ALL {
            let r = m.evaluate(&ctx(d), &resp("")).await.unwrap();
            assert_eq!(r.score, 0.0, "difficulty {}", d);
        }
    }

    #[tokio::test]
    async fn rich_answer_is_clamped_at_every_difficulty() {
        let m = HeuristicScoreMetric::new().unwrap();
        let text = rich_answer();
        for d in Difficulty::ALL {
            let r = m.evaluate(&ctx(d), &resp(&text)).await.unwrap();
            assert_eq!(r.score, 100.0, "difficulty {}", d);
            assert!(r.details["raw"].as_f64().unwrap() > 100.0);
        }
    }

    #[test]
    fn components_add_up() {
        let m = HeuristicScoreMetric::new().unwrap();
        let b = m.breakdown("1. Use the api and database design", Difficulty::Basic);
        assert_eq!(b.length, 0.0);
        assert_eq!(b.technical_terms, vec!["api", "database", "design"]);
        assert_eq!(b.technical, 24.0);
        assert_eq!(b.structure, 20.0);
        assert_eq!(b.code, 0.0);
        assert_eq!(b.innovation, 0.0);
        assert_eq!(b.score, 44.0);

        let scaled = m.breakdown("1. Use the api and database design", Difficulty::Intermediate);
        assert!((scaled.score - 57.2).abs() < 1e-9);
    }

    #[test]
    fn vocabulary_points_are_capped() {
        let m = HeuristicScoreMetric::new().unwrap();
        let b = m.breakdown(
            "api database security authentication encryption optimization \
             novel innovative creative unique advanced breakthrough",
            Difficulty::Basic,
        );
        assert_eq!(b.technical, 35.0);
        assert_eq!(b.innovation, 25.0);
    }

    #[test]
    fn matching_ignores_case() {
        let m = HeuristicScoreMetric::new().unwrap();
        let b = m.breakdown("SECURITY and Cutting-Edge Encryption", Difficulty::Basic);
        assert_eq!(b.technical_terms, vec!["security", "encryption"]);
        assert_eq!(b.innovation_terms, vec!["cutting-edge"]);
    }

    #[test]
    fn legendary_triples_raw_points() {
        let m = HeuristicScoreMetric::new().unwrap();
        // 8 (api) * 3.0
        let b = m.breakdown("the api", Difficulty::Legendary);
        assert_eq!(b.score, 24.0);
    }
}
