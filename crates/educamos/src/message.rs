//! The record produced for every retrieved portal message.

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Subject the portal shows for a message deleted by its sender
pub const REMOVED_MARKER: &str = "Mensaje eliminado";

/// Subject of the synthetic record emitted when a session fails
pub const ERROR_SUBJECT: &str = "Error";

/// Sender of the synthetic error record
pub const BOT_SENDER: &str = "Educamos Notifier Bot";

/// One portal message, as handed to the notification dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducamosMessage {
    /// Reception date, as displayed by the portal
    pub date: String,
    /// Sender in display order ("First Last")
    pub from: String,
    /// Subject line
    pub subject: String,
    /// Whether the message answers an earlier one
    pub is_response: bool,
    /// Class group, may be empty
    pub group: String,
    /// School centre, may be empty
    pub centre: String,
    /// Trimmed body text
    pub body: String,
    /// Saved attachment files; `None` when the message was never opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<PathBuf>>,
    /// Error description, set only on the synthetic failure record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EducamosMessage {
    /// Synthetic record standing in for a failed session
    #[must_use]
    pub fn from_error(error: impl ToString) -> Self {
        let description = error.to_string();
        Self {
            date: Local::now().format("%d/%m/%Y %H:%M").to_string(),
            from: BOT_SENDER.to_string(),
            subject: ERROR_SUBJECT.to_string(),
            body: description.clone(),
            error: Some(description),
            ..Self::default()
        }
    }

    /// Row fields kept, subject replaced by [`REMOVED_MARKER`], nothing fetched
    #[must_use]
    pub fn into_removal_stub(self) -> Self {
        Self {
            subject: REMOVED_MARKER.to_string(),
            body: String::new(),
            attachments: None,
            ..self
        }
    }

    /// Whether this is the synthetic failure record
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether any attachment was saved
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        self.attachments.as_ref().is_some_and(|files| !files.is_empty())
    }
}

/// Turn the portal's "Last, First" into "First Last"
#[must_use]
pub fn normalize_sender(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .rev()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a subject announces a removed message (case-insensitive)
#[must_use]
pub fn is_removal_marker(subject: &str) -> bool {
    subject
        .to_lowercase()
        .contains(&REMOVED_MARKER.to_lowercase())
}

/// Whether the response cell reads as "yes" ("Sí", "si", ...)
#[must_use]
pub fn is_affirmative(cell: &str) -> bool {
    cell.trim().to_lowercase().starts_with('s')
}
