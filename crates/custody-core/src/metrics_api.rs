use crate::model::{AiResponse, Difficulty, TestContent};
use async_trait::async_trait;

/// Everything a metric may look at besides the response itself.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    pub difficulty: Difficulty,
    pub test_content: Option<serde_json::Value>,
    pub scenario: Option<String>,
}

impl ScoringContext {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    pub fn for_content(difficulty: Difficulty, content: &TestContent) -> Self {
        Self {
            difficulty,
            test_content: serde_json::to_value(content).ok(),
            scenario: content.scenario.clone(),
        }
    }

    /// True when neither usable test content nor a scenario was supplied.
    pub fn is_context_free(&self) -> bool {
        let no_content = match &self.test_content {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::Object(m)) => m.is_empty(),
            Some(serde_json::Value::String(s)) => s.trim().is_empty(),
            Some(serde_json::Value::Array(a)) => a.is_empty(),
            Some(_) => false,
        };
        let no_scenario = self
            .scenario
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true);
        no_content && no_scenario
    }
}

#[derive(Debug, Clone)]
pub struct MetricResult {
    pub score: f64,
    pub details: serde_json::Value,
}

impl MetricResult {
    pub fn scored(score: f64, details: serde_json::Value) -> Self {
        Self { score, details }
    }

    pub fn zero(reason: &str) -> Self {
        Self {
            score: 0.0,
            details: serde_json::json!({ "reason": reason }),
        }
    }
}

#[async_trait]
pub trait Metric: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        ctx: &ScoringContext,
        resp: &AiResponse,
    ) -> anyhow::Result<MetricResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_counts_as_missing_context() {
        let mut ctx = ScoringContext::new(Difficulty::Basic);
        assert!(ctx.is_context_free());

        ctx.test_content = Some(serde_json::json!({}));
        assert!(ctx.is_context_free());

        ctx.scenario = Some("   ".into());
        assert!(ctx.is_context_free());

        ctx.scenario = Some("Harden the login flow".into());
        assert!(!ctx.is_context_free());
    }

    #[test]
    fn content_is_context() {
        let content = TestContent {
            kind: "knowledge".into(),
            description: "Explain indexing".into(),
            ..Default::default()
        };
        let ctx = ScoringContext::for_content(Difficulty::Expert, &content);
        assert!(!ctx.is_context_free());
        assert_eq!(ctx.difficulty, Difficulty::Expert);
    }
}
