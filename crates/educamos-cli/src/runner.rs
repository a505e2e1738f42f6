//! One session from launch to delivery

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use educamos_notifier::{
    dispatch, launch, DispatchSummary, EducamosMessage, ExtractionSession, Notifier,
    NotifierResult, PortalDriver,
};
use tracing::info;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Where extracted records go
pub enum Sink<'a> {
    /// Pretty JSON on the given writer
    Print(&'a mut dyn Write),
    /// Through a notifier
    Notify(&'a dyn Notifier),
}

impl fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print(_) => write!(f, "Sink::Print"),
            Self::Notify(_) => write!(f, "Sink::Notify"),
        }
    }
}

/// What a session produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Records written as JSON
    Printed {
        /// Number of records
        records: usize,
    },
    /// Records sent
    Dispatched(DispatchSummary),
    /// Nothing to deliver
    Empty,
}

/// Write records as a JSON array
///
/// # Errors
///
/// Returns error if serialization or the write fails
pub fn print_records(records: &[EducamosMessage], out: &mut dyn Write) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

/// Run a session on the driver `launch` yields, then deliver the records
///
/// # Errors
///
/// Returns error only if printing fails; session failures arrive as records
pub async fn execute<F>(
    session: &ExtractionSession,
    launch: F,
    sink: Sink<'_>,
) -> CliResult<Outcome>
where
    F: Future<Output = NotifierResult<Arc<dyn PortalDriver>>>,
{
    let records = session.run_launched(launch).await;
    match sink {
        Sink::Print(out) => {
            print_records(&records, out)?;
            Ok(Outcome::Printed {
                records: records.len(),
            })
        }
        Sink::Notify(_) if records.is_empty() => {
            info!("No messages found");
            Ok(Outcome::Empty)
        }
        Sink::Notify(notifier) => {
            let summary = dispatch(notifier, &records).await;
            info!(
                delivered = summary.delivered,
                failed = summary.failed,
                attachments = summary.attachments_sent,
                "dispatch finished"
            );
            Ok(Outcome::Dispatched(summary))
        }
    }
}

/// One session against the real browser, configured from the command line
///
/// # Errors
///
/// Returns [`crate::CliError::Config`] before launching anything if records
/// would be sent but no Telegram destination is configured
pub async fn run_once(config: &CliConfig, dry_run: bool) -> CliResult<Outcome> {
    let session = ExtractionSession::new(config.session.clone());
    let browser = launch(config.browser.clone());
    if dry_run {
        let mut stdout = std::io::stdout();
        execute(&session, browser, Sink::Print(&mut stdout)).await
    } else {
        let notifier = config.notifier()?;
        execute(&session, browser, Sink::Notify(&notifier)).await
    }
}
