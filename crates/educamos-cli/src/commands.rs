//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use educamos_notifier::{DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SETTLE_MS};

/// Educamos Notifier: forwards unread Educamos portal messages to Telegram
#[derive(Parser, Debug)]
#[command(name = "educamos-notifier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one extraction session and forward the messages
    Run(RunArgs),

    /// Run extraction sessions on a cron schedule
    Schedule(ScheduleArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Print the extracted records as JSON instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for the schedule command
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Cron expression, 5 fields (minute first) or 6 (seconds first)
    #[arg(long, env = "CRON_SCHEDULE")]
    pub cron: String,

    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Portal credentials, destinations and browser options shared by every
/// command
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Portal user name
    #[arg(long, env = "EDUCAMOS_USERNAME")]
    pub username: String,

    /// Portal password
    #[arg(long, env = "EDUCAMOS_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Portal login page
    #[arg(long, env = "EDUCAMOS_LOGIN_URL")]
    pub login_url: String,

    /// Where attachments are saved
    #[arg(long, env = "DOWNLOADS_FOLDER", default_value = "downloads")]
    pub downloads_folder: PathBuf,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat receiving the messages
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium binary (auto-detected when omitted)
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Disable the browser sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Budget for awaited elements and frames, in milliseconds
    #[arg(long, default_value_t = DEFAULT_ELEMENT_TIMEOUT_MS)]
    pub element_timeout_ms: u64,

    /// Budget for presence probes, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,

    /// Pause after opening a message, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 6] = [
        "--username",
        "jdoe",
        "--password",
        "secret",
        "--login-url",
        "https://educamos.example/login",
    ];

    fn parse(extra: &[&str]) -> Cli {
        let args = ["educamos-notifier"]
            .into_iter()
            .chain(extra.iter().copied())
            .chain(REQUIRED);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_defaults() {
        let cli = parse(&["run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(!args.dry_run);
        assert_eq!(args.session.username, "jdoe");
        assert_eq!(args.session.element_timeout_ms, 30_000);
        assert_eq!(args.session.probe_timeout_ms, 2_000);
        assert_eq!(args.session.settle_ms, 5_000);
        assert!(!args.session.headed);
    }

    #[test]
    fn test_run_flags() {
        let cli = parse(&["-vv", "run", "--dry-run", "--headed", "--settle-ms", "0"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.dry_run);
        assert!(args.session.headed);
        assert_eq!(args.session.settle_ms, 0);
    }

    #[test]
    fn test_schedule_takes_cron() {
        let cli = parse(&["schedule", "--cron", "*/15 * * * *"]);
        let Commands::Schedule(args) = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(args.cron, "*/15 * * * *");
    }
}
