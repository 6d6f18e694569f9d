use crate::cli::args::{Cli, Command, ResponderArgs, StoreArgs};
use custody_core::config::{load_config_or_default, CustodyConfig};
use custody_core::errors::ConfigError;
use custody_core::providers::file::FileResponder;
use custody_core::providers::template::TemplateResponder;
use custody_core::providers::Responder;
use custody_core::storage::Store;
use std::str::FromStr;
use std::sync::Arc;

pub mod administer;
pub mod init;
pub mod report;
pub mod score;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const TEST_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => init::run(args),
        Command::Administer(args) => administer::run(args).await,
        Command::Group(args) => administer::run_group(args).await,
        Command::Score(args) => score::run(args).await,
        Command::Analytics(args) => report::analytics(args),
        Command::Status(args) => report::status(args),
        Command::Reset(args) => report::reset(args),
        Command::Version => {
            println!("custody {}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Load config and open the metrics database, creating it on first use.
pub(crate) fn open_store(args: &StoreArgs) -> anyhow::Result<(CustodyConfig, Store)> {
    let cfg = load_config_or_default(&args.config, args.strict)?;

    if let Some(parent) = args.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = Store::open(&args.db)?.with_cache_entries(cfg.settings.cache_entries());
    store.init_schema()?;
    Ok((cfg, store))
}

pub(crate) fn build_responder(args: &ResponderArgs) -> anyhow::Result<Arc<dyn Responder>> {
    match args.responder.as_str() {
        "template" => Ok(Arc::new(TemplateResponder)),
        "file" => {
            let path = args.response_file.as_ref().ok_or_else(|| {
                ConfigError("--responder file requires --response-file".into())
            })?;
            Ok(Arc::new(FileResponder::new(path)))
        }
        other => Err(ConfigError(format!(
            "unknown responder '{}' (expected template|file)",
            other
        ))
        .into()),
    }
}

/// Parse a user-supplied enum value; bad input is a config error.
pub(crate) fn parse_arg<T>(raw: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = anyhow::Error>,
{
    raw.parse::<T>().map_err(|e| ConfigError(e.to_string()))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
