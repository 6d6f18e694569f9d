use crate::model::{AiResponse, Difficulty, TestCategory, TestContent};
use async_trait::async_trait;

/// Produces the test material for an agent. Real generators live outside
/// this crate; [`template::TemplateContentGenerator`] is the built-in.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        agents: &[String],
        difficulty: Difficulty,
        category: TestCategory,
    ) -> anyhow::Result<TestContent>;
    fn generator_name(&self) -> &'static str;
}

/// Produces an agent's free-text answer to a prompt.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        agent: &str,
        prompt: &str,
        content: &TestContent,
    ) -> anyhow::Result<AiResponse>;
    fn provider_name(&self) -> &'static str;
}

/// Prompt shown to the responder for one custody test.
pub fn render_prompt(
    agent: &str,
    content: &TestContent,
    difficulty: Difficulty,
    category: TestCategory,
) -> String {
    let mut out = format!(
        "You are {} AI. Please respond to the following custody test:\n\nTest Category: {}\nDifficulty: {}\n",
        agent, category, difficulty
    );
    out.push_str(&format!("Description: {}\n", content.description));
    if let Some(s) = &content.scenario {
        out.push_str(&format!("Scenario: {}\n", s));
    }
    for (i, q) in content.questions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, q));
    }
    out.push_str(
        "\nPlease provide a comprehensive response that demonstrates your capabilities and addresses all requirements.\n",
    );
    out
}

pub mod fake;
pub mod file;
pub mod template;
