use super::{exit_codes, open_store, print_json};
use crate::cli::args::{AnalyticsArgs, ResetArgs, StatusArgs};
use custody_core::analytics::{agent_status, get_analytics, AgentSummary};
use custody_core::model::AgentMetrics;
use custody_core::report::console::{print_analytics, print_status};

pub fn analytics(args: AnalyticsArgs) -> anyhow::Result<i32> {
    let (cfg, store) = open_store(&args.store)?;
    let a = get_analytics(&store, &cfg, args.agent.as_deref());
    if args.format == "json" {
        print_json(&a)?;
    } else {
        print_analytics(&a);
    }
    Ok(exit_codes::OK)
}

pub fn status(args: StatusArgs) -> anyhow::Result<i32> {
    let (cfg, store) = open_store(&args.store)?;
    cfg.validate_agent(&args.agent)?;

    let summary = match agent_status(&store, &cfg, &args.agent)? {
        Some(s) => s,
        None => AgentSummary::from_metrics(&AgentMetrics::new(&args.agent), &cfg),
    };
    if args.format == "json" {
        print_json(&summary)?;
    } else {
        print_status(&summary);
    }
    Ok(exit_codes::OK)
}

pub fn reset(args: ResetArgs) -> anyhow::Result<i32> {
    let (cfg, store) = open_store(&args.store)?;
    cfg.validate_agent(&args.agent)?;

    if store.reset_metrics(&args.agent)? {
        tracing::info!(event = "custody.metrics.reset", agent = %args.agent, "metrics reset");
        eprintln!("reset custody metrics for {}", args.agent);
    } else {
        eprintln!("no custody metrics recorded for {}", args.agent);
    }
    Ok(exit_codes::OK)
}
