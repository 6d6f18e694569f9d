use crate::config::CustodyConfig;
use crate::metrics_api::{Metric, MetricResult, ScoringContext};
use crate::model::{AiResponse, Difficulty, TestCategory, TestContent, TestKind, TestResult};
use crate::on_error::OnScoringError;
use crate::progression::apply_result;
use crate::providers::{render_prompt, ContentGenerator, Responder};
use crate::storage::store::{now_rfc3339, Store};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{timeout, Duration};

static TEST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Runs custody tests end to end: content, response, score, progression.
#[derive(Clone)]
pub struct Administrator {
    pub store: Store,
    pub generator: Arc<dyn ContentGenerator>,
    pub responder: Arc<dyn Responder>,
    pub metric: Arc<dyn Metric>,
    pub config: CustodyConfig,
}

/// Material produced for one participant before scoring.
struct Attempt {
    content: TestContent,
    response: AiResponse,
}

impl Administrator {
    /// Administer one custody test to `agent`.
    ///
    /// Only caller mistakes (an agent outside the configured set) are returned
    /// as errors. Everything that goes wrong after that is folded into the
    /// returned [`TestResult`].
    pub async fn administer_test(
        &self,
        agent: &str,
        category: Option<TestCategory>,
    ) -> anyhow::Result<TestResult> {
        self.config.validate_agent(agent)?;
        let category = category.unwrap_or_else(|| self.config.settings.default_category());

        let difficulty = match self.store.get_metrics(agent) {
            Ok(found) => found
                .map(|m| Difficulty::for_level(m.custody_level))
                .unwrap_or_default(),
            Err(e) => {
                let base = self.base_result(agent, category, Difficulty::Basic, TestKind::Custody);
                return Ok(self.record_internal_failure(base, &e.context("read agent metrics")));
            }
        };

        let base = self.base_result(agent, category, difficulty, TestKind::Custody);
        let attempt = match self.prepare(agent, difficulty, category).await {
            Ok(a) => a,
            Err(e) => return Ok(self.record_internal_failure(base, &e)),
        };

        Ok(self.score_and_record(base, &attempt).await)
    }

    /// Collaborative or olympic event: one piece of content for every
    /// participant, each answering and recorded on their own.
    /// Results come back in participant order.
    pub async fn administer_group(
        &self,
        kind: TestKind,
        participants: &[String],
        difficulty: Difficulty,
        category: TestCategory,
    ) -> anyhow::Result<Vec<TestResult>> {
        if participants.is_empty() {
            anyhow::bail!("group test needs at least one participant");
        }
        for p in participants {
            self.config.validate_agent(p)?;
        }

        let content = self
            .bounded(
                "generate",
                self.generator.generator_name(),
                self.generator.generate(participants, difficulty, category),
            )
            .await;

        let mut out = Vec::with_capacity(participants.len());
        for agent in participants {
            let base = self.base_result(agent, category, difficulty, kind);
            let content = match &content {
                Ok(c) => c.clone(),
                Err(e) => {
                    let e = anyhow::anyhow!("{:#}", e);
                    out.push(self.record_internal_failure(base, &e));
                    continue;
                }
            };

            let prompt = render_prompt(agent, &content, difficulty, category);
            let response = self
                .bounded(
                    "respond",
                    self.responder.provider_name(),
                    self.responder.respond(agent, &prompt, &content),
                )
                .await;
            let result = match response {
                Ok(response) => {
                    self.score_and_record(base, &Attempt { content, response })
                        .await
                }
                Err(e) => self.record_internal_failure(base, &e),
            };
            out.push(result);
        }

        tracing::info!(
            event = "custody.group.administered",
            kind = kind.as_str(),
            participants = participants.len(),
            passed = out.iter().filter(|r| r.passed).count(),
            "group test complete"
        );
        Ok(out)
    }

    async fn prepare(
        &self,
        agent: &str,
        difficulty: Difficulty,
        category: TestCategory,
    ) -> anyhow::Result<Attempt> {
        let agents = [agent.to_string()];
        let content = self
            .bounded(
                "generate",
                self.generator.generator_name(),
                self.generator.generate(&agents, difficulty, category),
            )
            .await?;
        let prompt = render_prompt(agent, &content, difficulty, category);
        let response = self
            .bounded(
                "respond",
                self.responder.provider_name(),
                self.responder.respond(agent, &prompt, &content),
            )
            .await?;
        Ok(Attempt { content, response })
    }

    async fn bounded<T>(
        &self,
        stage: &str,
        source: &str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        let secs = self.config.settings.timeout_seconds();
        tracing::debug!(stage, source, timeout_secs = secs, "calling collaborator");
        match timeout(Duration::from_secs(secs), fut).await {
            Ok(r) => r.map_err(|e| e.context(format!("{} ({}) failed", stage, source))),
            Err(_) => Err(anyhow::anyhow!(
                "{} ({}) timed out after {}s",
                stage,
                source,
                secs
            )),
        }
    }

    async fn score_and_record(&self, mut result: TestResult, attempt: &Attempt) -> TestResult {
        let ctx = ScoringContext::for_content(result.difficulty, &attempt.content);
        let scored = score_with_policy(
            self.metric.as_ref(),
            self.config.settings.on_scoring_error,
            &ctx,
            &attempt.response,
        )
        .await;

        result.score = scored.score;
        result.passed = scored.score >= self.config.thresholds.passing_score();
        self.record(result)
    }

    /// Failures before scoring count once as a failed, zero-score test.
    fn record_internal_failure(&self, mut result: TestResult, error: &anyhow::Error) -> TestResult {
        tracing::warn!(
            event = "custody.test.internal_error",
            agent = %result.ai_type,
            test_id = %result.test_id,
            error = %format!("{:#}", error),
            "custody test failed before scoring"
        );
        result.score = 0.0;
        result.passed = false;
        result.error = Some(format!("{:#}", error));
        self.record(result)
    }

    fn record(&self, mut result: TestResult) -> TestResult {
        let limit = self.config.settings.history_limit();
        match self
            .store
            .record_outcome(&result.ai_type, |m| apply_result(m, &result, limit))
        {
            Ok((metrics, awarded)) => {
                result.xp_awarded = awarded;
                tracing::info!(
                    event = "custody.test.administered",
                    agent = %result.ai_type,
                    test_id = %result.test_id,
                    category = result.test_category.as_str(),
                    difficulty = result.difficulty.as_str(),
                    score = result.score,
                    passed = result.passed,
                    xp = awarded,
                    level = metrics.custody_level,
                    "custody test recorded"
                );
                result
            }
            Err(e) => {
                tracing::error!(
                    event = "custody.test.persist_failed",
                    agent = %result.ai_type,
                    test_id = %result.test_id,
                    error = %format!("{:#}", e),
                    "failed to persist custody result"
                );
                result.score = 0.0;
                result.passed = false;
                result.xp_awarded = 0;
                result.error = Some(format!("persistence failed: {:#}", e));
                result
            }
        }
    }

    fn base_result(
        &self,
        agent: &str,
        category: TestCategory,
        difficulty: Difficulty,
        kind: TestKind,
    ) -> TestResult {
        TestResult {
            test_id: next_test_id(agent),
            ai_type: agent.to_string(),
            test_category: category,
            difficulty,
            kind,
            timestamp: now_rfc3339(),
            score: 0.0,
            passed: false,
            xp_awarded: 0,
            error: None,
        }
    }
}

/// Evaluate `metric`, replacing any error with the policy's fallback score.
/// Scores are clamped to [0, 100] whatever the metric returns.
pub async fn score_with_policy(
    metric: &dyn Metric,
    policy: OnScoringError,
    ctx: &ScoringContext,
    resp: &AiResponse,
) -> MetricResult {
    match metric.evaluate(ctx, resp).await {
        Ok(mut r) if r.score.is_finite() => {
            r.score = r.score.clamp(0.0, 100.0);
            r
        }
        Ok(r) => {
            let e = anyhow::anyhow!("metric returned non-finite score {}", r.score);
            MetricResult::scored(
                policy.apply_to_error(metric.name(), &e),
                serde_json::json!({ "fallback": policy, "error": e.to_string() }),
            )
        }
        Err(e) => MetricResult::scored(
            policy.apply_to_error(metric.name(), &e),
            serde_json::json!({ "fallback": policy, "error": format!("{:#}", e) }),
        ),
    }
}

fn next_test_id(agent: &str) -> String {
    let seq = TEST_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "custody-{}-{}-{:010}",
        agent,
        chrono::Utc::now().timestamp_millis(),
        seq
    )
}
