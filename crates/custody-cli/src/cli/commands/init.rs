use super::exit_codes;
use crate::cli::args::InitArgs;
use custody_core::config::write_sample_config;
use custody_core::errors::ConfigError;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() && !args.force {
        return Err(ConfigError(format!(
            "{} already exists (use --force to overwrite)",
            args.config.display()
        ))
        .into());
    }
    write_sample_config(&args.config)?;
    eprintln!("wrote {}", args.config.display());
    Ok(exit_codes::OK)
}
