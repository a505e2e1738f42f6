//! Educamos Notifier CLI
//!
//! ## Usage
//!
//! ```bash
//! educamos-notifier run                          # One session, send to Telegram
//! educamos-notifier run --dry-run                # One session, print JSON
//! educamos-notifier schedule --cron "*/30 * * * *"
//! ```
//!
//! Every option can also come from the environment (`EDUCAMOS_USERNAME`,
//! `TELEGRAM_TOKEN`, `CRON_SCHEDULE`, ...) or a `.env` file.

use std::process::ExitCode;

use clap::Parser;
use educamos_notifier_cli::{
    logging, parse_schedule, run_once, run_scheduled, Cli, CliConfig, CliResult, Commands,
    Outcome, Verbosity,
};
use tracing::{error, info};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let verbosity = Verbosity::from_count(cli.verbose);
    logging::init(verbosity);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, verbosity)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, verbosity: Verbosity) -> CliResult<()> {
    match cli.command {
        Commands::Run(args) => {
            let config = CliConfig::from_args(&args.session, verbosity);
            let outcome = run_once(&config, args.dry_run).await?;
            if let Outcome::Dispatched(summary) = outcome {
                info!(
                    delivered = summary.delivered,
                    failed = summary.failed,
                    "run finished"
                );
            }
            Ok(())
        }
        Commands::Schedule(args) => {
            let schedule = parse_schedule(&args.cron)?;
            let config = CliConfig::from_args(&args.session, verbosity);
            config.notifier()?;
            info!(cron = %args.cron, "scheduler started");
            let config = &config;
            run_scheduled(&schedule, move || async move {
                if let Err(e) = run_once(config, false).await {
                    error!(error = %e, "scheduled session failed");
                }
            })
            .await
        }
    }
}
