use super::{exit_codes, parse_arg, print_json};
use crate::cli::args::ScoreArgs;
use custody_core::config::load_config_or_default;
use custody_core::engine::score_with_policy;
use custody_core::errors::ConfigError;
use custody_core::metrics_api::ScoringContext;
use custody_core::model::{AiResponse, Difficulty};

pub async fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let cfg = load_config_or_default(&args.config, args.strict)?;
    let difficulty: Difficulty = parse_arg(&args.difficulty)?;

    let text = match (&args.text, &args.file) {
        (Some(t), _) => t.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?,
        (None, None) => return Err(ConfigError("pass --text or --file".into()).into()),
    };

    let test_content = match &args.content {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                ConfigError(format!("failed to read {}: {}", path.display(), e))
            })?;
            let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
                ConfigError(format!("invalid test content JSON in {}: {}", path.display(), e))
            })?;
            Some(value)
        }
        None => None,
    };

    let ctx = ScoringContext {
        difficulty,
        test_content,
        scenario: args.scenario.clone(),
    };
    let resp = AiResponse {
        text,
        source: "cli".into(),
        meta: serde_json::json!({}),
    };

    let metric = custody_metrics::default_metric()?;
    let r = score_with_policy(metric.as_ref(), cfg.settings.on_scoring_error, &ctx, &resp).await;
    let threshold = cfg.thresholds.passing_score();
    let passed = r.score >= threshold;

    if args.format == "json" {
        print_json(&serde_json::json!({
            "metric": metric.name(),
            "difficulty": difficulty,
            "score": r.score,
            "passed": passed,
            "passing_score": threshold,
            "details": r.details,
        }))?;
    } else {
        let verdict = if passed { "PASS" } else { "FAIL" };
        eprintln!(
            "{} {:.2} (threshold {:.0}, difficulty {})",
            verdict, r.score, threshold, difficulty
        );
        if let Some(obj) = r.details.as_object() {
            for (k, v) in obj {
                eprintln!("    {}: {}", k, v);
            }
        }
    }

    Ok(if passed {
        exit_codes::OK
    } else {
        exit_codes::TEST_FAILED
    })
}
