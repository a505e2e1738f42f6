//! Cron-driven trigger: one extraction session per fire time, never two at
//! once.

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tracing::{info, warn};

use crate::error::{CliError, CliResult};

/// Prefix a seconds field onto 5-field (minute-first) expressions
#[must_use]
pub fn normalize_cron(expr: &str) -> String {
    let fields = expr.split_whitespace().count();
    if fields == 5 {
        format!("0 {}", expr.trim())
    } else {
        expr.trim().to_string()
    }
}

/// Parse a 5- or 6-field cron expression
///
/// # Errors
///
/// Returns [`CliError::Schedule`] if the expression does not parse
pub fn parse_schedule(expr: &str) -> CliResult<Schedule> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| CliError::schedule(expr, e.to_string()))
}

/// First fire time strictly after `now`
#[must_use]
pub fn next_fire(schedule: &Schedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&now).next()
}

/// Run `job` at every fire time of `schedule`, forever.
///
/// Each job is awaited before the next fire time is computed, so a slow
/// session makes the loop skip the fire times it overran.
///
/// # Errors
///
/// Returns [`CliError::Schedule`] if the schedule has no future fire time
pub async fn run_scheduled<F, Fut>(schedule: &Schedule, mut job: F) -> CliResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let now = Utc::now();
        let Some(next) = next_fire(schedule, now) else {
            return Err(CliError::schedule(
                schedule.to_string(),
                "no upcoming fire time",
            ));
        };
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, "waiting for next session");
        tokio::time::sleep(wait).await;

        let started = Utc::now();
        job().await;
        let took = Utc::now() - started;
        if next_fire(schedule, started).is_some_and(|after| after < Utc::now()) {
            warn!(seconds = took.num_seconds(), "session overran the next fire time");
        }
    }
}
