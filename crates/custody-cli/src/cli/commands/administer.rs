use super::{build_responder, exit_codes, open_store, parse_arg, print_json};
use crate::cli::args::{AdministerArgs, GroupArgs};
use custody_core::engine::Administrator;
use custody_core::model::{Difficulty, TestCategory, TestKind, TestResult};
use custody_core::providers::template::TemplateContentGenerator;
use custody_core::report::console::print_results;
use std::sync::Arc;

pub async fn run(args: AdministerArgs) -> anyhow::Result<i32> {
    let category = args
        .category
        .as_deref()
        .map(parse_arg::<TestCategory>)
        .transpose()?;

    let admin = build(&args.store, &args.responder)?;
    let result = admin.administer_test(&args.agent, category).await?;

    emit(std::slice::from_ref(&result), &args.format)?;
    Ok(exit_code(std::slice::from_ref(&result)))
}

pub async fn run_group(args: GroupArgs) -> anyhow::Result<i32> {
    let kind: TestKind = parse_arg(&args.kind)?;
    let difficulty: Difficulty = parse_arg(&args.difficulty)?;
    let category: TestCategory = parse_arg(&args.category)?;

    let admin = build(&args.store, &args.responder)?;
    let results = admin
        .administer_group(kind, &args.agents, difficulty, category)
        .await?;

    emit(&results, &args.format)?;
    Ok(exit_code(&results))
}

fn build(
    store: &crate::cli::args::StoreArgs,
    responder: &crate::cli::args::ResponderArgs,
) -> anyhow::Result<Administrator> {
    let (config, store) = open_store(store)?;
    Ok(Administrator {
        store,
        generator: Arc::new(TemplateContentGenerator),
        responder: build_responder(responder)?,
        metric: custody_metrics::default_metric()?,
        config,
    })
}

fn emit(results: &[TestResult], format: &str) -> anyhow::Result<()> {
    if format == "json" {
        if let [single] = results {
            print_json(single)
        } else {
            print_json(&results)
        }
    } else {
        print_results(results);
        Ok(())
    }
}

fn exit_code(results: &[TestResult]) -> i32 {
    if results.iter().all(|r| r.passed) {
        exit_codes::OK
    } else {
        exit_codes::TEST_FAILED
    }
}
