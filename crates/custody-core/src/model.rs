use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a custody test. Drives both the score multiplier and
/// the XP multiplier, and follows the agent's custody level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Basic,
    Intermediate,
    Advanced,
    Expert,
    Master,
    Legendary,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
        Difficulty::Master,
        Difficulty::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
            Difficulty::Master => "master",
            Difficulty::Legendary => "legendary",
        }
    }

    /// Multiplier applied to the accumulated heuristic score.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            Difficulty::Basic => 1.0,
            Difficulty::Intermediate => 1.3,
            Difficulty::Advanced => 1.6,
            Difficulty::Expert => 2.0,
            Difficulty::Master => 2.5,
            Difficulty::Legendary => 3.0,
        }
    }

    /// Multiplier applied to the base XP award.
    pub fn xp_multiplier(&self) -> f64 {
        match self {
            Difficulty::Basic => 1.0,
            Difficulty::Intermediate => 1.5,
            Difficulty::Advanced => 2.0,
            Difficulty::Expert => 2.5,
            Difficulty::Master => 3.0,
            Difficulty::Legendary => 4.0,
        }
    }

    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => Difficulty::Basic,
            4..=6 => Difficulty::Intermediate,
            7..=9 => Difficulty::Advanced,
            10..=12 => Difficulty::Expert,
            13..=15 => Difficulty::Master,
            _ => Difficulty::Legendary,
        }
    }

    /// Lenient parse for values read back from storage.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown difficulty '{}' (expected one of: basic, intermediate, advanced, expert, master, legendary)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    #[default]
    KnowledgeVerification,
    CodeQuality,
    SecurityAwareness,
    PerformanceOptimization,
    InnovationCapability,
    SelfImprovement,
    CrossAiCollaboration,
    ExperimentalValidation,
}

impl TestCategory {
    pub const ALL: [TestCategory; 8] = [
        TestCategory::KnowledgeVerification,
        TestCategory::CodeQuality,
        TestCategory::SecurityAwareness,
        TestCategory::PerformanceOptimization,
        TestCategory::InnovationCapability,
        TestCategory::SelfImprovement,
        TestCategory::CrossAiCollaboration,
        TestCategory::ExperimentalValidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestCategory::KnowledgeVerification => "knowledge_verification",
            TestCategory::CodeQuality => "code_quality",
            TestCategory::SecurityAwareness => "security_awareness",
            TestCategory::PerformanceOptimization => "performance_optimization",
            TestCategory::InnovationCapability => "innovation_capability",
            TestCategory::SelfImprovement => "self_improvement",
            TestCategory::CrossAiCollaboration => "cross_ai_collaboration",
            TestCategory::ExperimentalValidation => "experimental_validation",
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TestCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        TestCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown test category '{}'", s))
    }
}

/// Kind of test event; selects the XP base award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    #[default]
    Custody,
    Collaborative,
    Olympic,
}

impl TestKind {
    /// (pass, fail) base XP.
    pub fn base_xp(&self) -> (u32, u32) {
        match self {
            TestKind::Custody => (50, 1),
            TestKind::Collaborative => (75, 5),
            TestKind::Olympic => (100, 10),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Custody => "custody",
            TestKind::Collaborative => "collaborative",
            TestKind::Olympic => "olympic",
        }
    }
}

impl FromStr for TestKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "custody" => Ok(TestKind::Custody),
            "collaborative" => Ok(TestKind::Collaborative),
            "olympic" => Ok(TestKind::Olympic),
            other => anyhow::bail!("unknown test kind '{}'", other),
        }
    }
}

/// Test material handed to the responder and, as scoring context, to the metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default)]
    pub time_limit_minutes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub test_id: String,
    pub ai_type: String,
    pub test_category: TestCategory,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub kind: TestKind,
    pub timestamp: String,
    pub score: f64,
    pub passed: bool,
    #[serde(default)]
    pub xp_awarded: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One row of `agent_metrics`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMetrics {
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
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub current_difficulty: Difficulty,
    #[serde(default)]
    pub test_history: Vec<TestResult>,
    #[serde(default)]
    pub last_test_date: Option<String>,
}

impl AgentMetrics {
    /// Fresh row for a previously unseen agent.
    pub fn new(agent_type: &str) -> Self {
        Self {
            agent_id: format!("{}_agent", agent_type),
            agent_type: agent_type.to_string(),
            level: 1,
            xp: 0,
            prestige: 0,
            custody_level: 1,
            custody_xp: 0,
            total_tests_given: 0,
            total_tests_passed: 0,
            total_tests_failed: 0,
            consecutive_successes: 0,
            consecutive_failures: 0,
            current_difficulty: Difficulty::Basic,
            test_history: Vec::new(),
            last_test_date: None,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total_tests_given == 0 {
            0.0
        } else {
            self.total_tests_passed as f64 / self.total_tests_given as f64
        }
    }
}
