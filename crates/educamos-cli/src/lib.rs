//! Educamos Notifier CLI Library
//!
//! Command-line triggers for the extraction session: a one-shot `run` and
//! a cron-driven `schedule`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
pub mod runner;
pub mod schedule;

pub use commands::{Cli, Commands, RunArgs, ScheduleArgs, SessionArgs};
pub use config::{CliConfig, TelegramTarget, Verbosity};
pub use error::{CliError, CliResult};
pub use runner::{execute, print_records, run_once, Outcome, Sink};
pub use schedule::{next_fire, normalize_cron, parse_schedule, run_scheduled};
