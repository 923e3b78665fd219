//! check_aws_config_aggregator - Nagios plugin for AWS Config aggregators
//!
//! Prints a single status line on stdout and exits with the matching plugin
//! status code. Diagnostics go to stderr.

use aggcheck_common::logging::{LogConfig, LogFormat};
use aggcheck_common::{Config, ConfigBuilder};
use aggcheck_core::{report, CheckOutcome, PluginStatus};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

/// AWS Config aggregator compliance check
#[derive(Parser, Debug)]
#[command(name = "check_aws_config_aggregator")]
#[command(version)]
#[command(about = "Reports non-compliant AWS Config rules across an aggregator", long_about = None)]
struct Args {
    /// Required. The configuration aggregator name.
    #[arg(long)]
    config_aggregator_name: Option<String>,

    /// Optional. The region the config aggregator resides in.
    #[arg(long)]
    aws_region: Option<String>,

    /// Optional. The AWS access key id.
    #[arg(long)]
    aws_access_key_id: Option<String>,

    /// Optional. The AWS secret access key.
    #[arg(long)]
    aws_secret_key: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Layer file, environment and flags into one configuration
    fn load_config(&self) -> aggcheck_core::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        Ok(self.apply(config.merge_env()))
    }

    fn apply(&self, config: Config) -> Config {
        let mut builder = ConfigBuilder::from_config(config);

        if let Some(name) = &self.config_aggregator_name {
            builder = builder.aggregator_name(name);
        }
        if let Some(region) = &self.aws_region {
            builder = builder.region(region);
        }
        if let Some(key) = &self.aws_access_key_id {
            builder = builder.access_key_id(key);
        }
        if let Some(key) = &self.aws_secret_key {
            builder = builder.secret_key(key);
        }
        if let Some(level) = &self.log_level {
            builder = builder.log_level(level);
        }
        if let Some(format) = &self.log_format {
            builder = builder.log_format(format);
        }

        builder.build()
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            // Usage errors must not collide with the CRITICAL exit code
            let _ = err.print();
            let outcome = CheckOutcome::new(PluginStatus::Unknown, usage_summary(&err));
            println!("{}", outcome);
            return exit_code(outcome.exit_code());
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    let config = args.load_config();
    let logging = match &config {
        Ok(config) => config.logging.clone(),
        Err(_) => args.apply(Config::default()).logging,
    };

    let format = logging.format.parse::<LogFormat>();
    aggcheck_common::logging::init_logging_with_config(
        LogConfig::new()
            .level(&logging.level)
            .format(format.clone().unwrap_or_default()),
    );
    if let Err(e) = format {
        warn!("{}, falling back to compact", e);
    }

    debug!("check_aws_config_aggregator v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match config.map_err(anyhow::Error::from).and_then(run) {
        Ok(outcome) => outcome,
        Err(err) => fatal(err),
    };

    println!("{}", outcome);
    exit_code(outcome.exit_code())
}

/// Resolve options, fetch every page and build the status line
fn run(config: Config) -> Result<CheckOutcome> {
    let config = config.resolve()?;
    debug!("Resolved configuration: {:?}", config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let index = runtime.block_on(aggcheck_cloud::check_aggregator(&config))?;
    let outcome = report(&index);

    info!(
        status = %outcome.status,
        aggregator = %config.aggregator_name,
        "Check complete"
    );

    Ok(outcome)
}

fn fatal(err: anyhow::Error) -> CheckOutcome {
    match err.downcast_ref::<aggcheck_core::Error>() {
        Some(e) => {
            error!(code = e.code(), "{}", e);
            CheckOutcome::fatal(e)
        }
        None => {
            error!("{:#}", err);
            CheckOutcome::new(PluginStatus::Unknown, format!("{:#}", err))
        }
    }
}

/// First line of a clap error without its "error: " prefix
fn usage_summary(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error:").trim().to_string()
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(3))
}
