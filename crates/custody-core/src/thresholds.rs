use serde::{Deserialize, Serialize};

pub const DEFAULT_PASSING_SCORE: f64 = 70.0;
pub const DEFAULT_MAX_LEVEL: u32 = 10;
pub const DEFAULT_LEVEL_UP_PASS_RATE: f64 = 0.8;
pub const DEFAULT_PROPOSAL_MIN_LEVEL: u32 = 2;
pub const DEFAULT_PROPOSAL_PASS_RATE: f64 = 0.7;
pub const DEFAULT_PROPOSAL_MIN_TESTS: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up_pass_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_min_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_pass_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_min_tests: Option<usize>,
}

impl ThresholdConfig {
    pub fn passing_score(&self) -> f64 {
        self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE)
    }

    pub fn max_level(&self) -> u32 {
        self.max_level.unwrap_or(DEFAULT_MAX_LEVEL)
    }

    pub fn level_up_pass_rate(&self) -> f64 {
        self.level_up_pass_rate.unwrap_or(DEFAULT_LEVEL_UP_PASS_RATE)
    }

    pub fn proposal_min_level(&self) -> u32 {
        self.proposal_min_level.unwrap_or(DEFAULT_PROPOSAL_MIN_LEVEL)
    }

    pub fn proposal_pass_rate(&self) -> f64 {
        self.proposal_pass_rate.unwrap_or(DEFAULT_PROPOSAL_PASS_RATE)
    }

    pub fn proposal_min_tests(&self) -> usize {
        self.proposal_min_tests.unwrap_or(DEFAULT_PROPOSAL_MIN_TESTS)
    }
}
