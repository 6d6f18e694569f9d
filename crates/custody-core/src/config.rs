use crate::errors::ConfigError;
use crate::model::TestCategory;
use crate::on_error::OnScoringError;
use crate::thresholds::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CACHE_ENTRIES: u64 = 128;
pub const DEFAULT_RECENT_TESTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustodyConfig {
    #[serde(default = "default_version", rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "is_default_settings")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "is_default_thresholds")]
    pub thresholds: ThresholdConfig,
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            settings: Settings::default(),
            thresholds: ThresholdConfig::default(),
            agents: default_agents(),
        }
    }
}

impl CustodyConfig {
    /// Agent identities are a closed set; anything else is a caller mistake.
    pub fn validate_agent(&self, agent: &str) -> Result<(), ConfigError> {
        if self.agents.iter().any(|a| a == agent) {
            Ok(())
        } else {
            Err(ConfigError(format!(
                "invalid AI type: {} (known: {})",
                agent,
                self.agents.join(", ")
            )))
        }
    }
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_agents() -> Vec<String> {
    ["imperium", "guardian", "sandbox", "conquest"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn is_default_settings(s: &Settings) -> bool {
    s == &Settings::default()
}

fn is_default_thresholds(t: &ThresholdConfig) -> bool {
    t == &ThresholdConfig::default()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub on_scoring_error: OnScoringError,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_tests: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category: Option<TestCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_entries: Option<u64>,
}

impl Settings {
    pub fn history_limit(&self) -> usize {
        self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1)
    }

    pub fn recent_tests(&self) -> usize {
        self.recent_tests.unwrap_or(DEFAULT_RECENT_TESTS)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn default_category(&self) -> TestCategory {
        self.default_category.unwrap_or_default()
    }

    pub fn cache_entries(&self) -> u64 {
        self.cache_entries.unwrap_or(DEFAULT_CACHE_ENTRIES)
    }
}

pub fn load_config(path: &Path, strict: bool) -> Result<CustodyConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, strict).map_err(|e| ConfigError(format!("{} (file: {})", e, path.display())))
}

/// Missing file means built-in defaults; a present but broken file is an error.
pub fn load_config_or_default(path: &Path, strict: bool) -> Result<CustodyConfig, ConfigError> {
    if path.exists() {
        load_config(path, strict)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(CustodyConfig::default())
    }
}

pub fn parse_config(raw: &str, strict: bool) -> Result<CustodyConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: CustodyConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // YAML anchors and extension keys are allowed to float around.
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(fields = ?meaningful_unknowns, "ignored unknown config fields");
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if cfg.agents.is_empty() {
        return Err(ConfigError("config has no agents".into()));
    }

    let passing = cfg.thresholds.passing_score();
    if !(0.0..=100.0).contains(&passing) {
        return Err(ConfigError(format!(
            "thresholds.passing_score must be within 0..=100 (got {})",
            passing
        )));
    }

    if cfg.settings.timeout_seconds() == 0 {
        return Err(ConfigError(
            "settings.timeout_seconds must be at least 1".into(),
        ));
    }

    Ok(cfg)
}

pub const SAMPLE_CONFIG: &str = r#"configVersion: 1
settings:
  on_scoring_error: zero
  history_limit: 50
  recent_tests: 10
  timeout_seconds: 30
  default_category: knowledge_verification
  cache_entries: 128
thresholds:
  passing_score: 70
  max_level: 10
  level_up_pass_rate: 0.8
  proposal_min_level: 2
  proposal_pass_rate: 0.7
  proposal_min_tests: 3
agents:
  - imperium
  - guardian
  - sandbox
  - conquest
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
