//! Notification dispatch: every extracted message goes to a chat.
//!
//! [`TelegramNotifier`] sends one text message per record, then uploads each
//! attachment with the Bot API method matching its kind (photo, audio, video
//! or plain document).

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::message::EducamosMessage;
use crate::result::{NotifierError, NotifierResult};

/// Telegram Bot API root
pub const TELEGRAM_API: &str = "https://api.telegram.org";

/// Outcome of notifying one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Attachments uploaded
    pub attachments_sent: usize,
    /// Attachments that failed to upload
    pub attachments_failed: usize,
}

/// Destination for extracted messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one record and its attachments.
    ///
    /// An attachment that fails to upload is counted in the [`Delivery`]
    /// and does not stop the others.
    ///
    /// # Errors
    ///
    /// [`NotifierError::Notification`] if the text message could not be sent;
    /// attachments are then skipped.
    async fn notify(&self, message: &EducamosMessage) -> NotifierResult<Delivery>;
}

/// Totals over a batch of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Records whose text message went out
    pub delivered: usize,
    /// Records whose text message failed
    pub failed: usize,
    /// Attachments uploaded
    pub attachments_sent: usize,
    /// Attachments that failed
    pub attachments_failed: usize,
}

/// Notify every record in order; failures are logged and the batch goes on
pub async fn dispatch(notifier: &dyn Notifier, messages: &[EducamosMessage]) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    for message in messages {
        match notifier.notify(message).await {
            Ok(delivery) => {
                info!(
                    subject = %message.subject,
                    attachments = delivery.attachments_sent,
                    "message delivered"
                );
                summary.delivered += 1;
                summary.attachments_sent += delivery.attachments_sent;
                summary.attachments_failed += delivery.attachments_failed;
            }
            Err(err) => {
                warn!(subject = %message.subject, error = %err, "sending message failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

// =============================================================================
// TELEGRAM
// =============================================================================

/// Bot API upload method for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// `sendPhoto`
    Photo,
    /// `sendAudio`
    Audio,
    /// `sendVideo`
    Video,
    /// `sendDocument`
    Document,
}

impl AttachmentKind {
    /// Kind by file extension (case-insensitive); unknown extensions are documents
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" | "gif" | "png" | "bmp" => Self::Photo,
            "wav" | "mp3" | "ogg" | "m4a" => Self::Audio,
            "mp4" | "avi" | "mov" | "mkv" | "webm" => Self::Video,
            _ => Self::Document,
        }
    }

    /// API method name
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Audio => "sendAudio",
            Self::Video => "sendVideo",
            Self::Document => "sendDocument",
        }
    }

    /// Multipart field carrying the file
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }
}

/// Telegram text for a record
#[must_use]
pub fn format_message(message: &EducamosMessage) -> String {
    let mut lines = vec![format!("Recibido mensaje el {}", message.date)];
    if message.is_response {
        lines.push(format!("  DE:     {} (Respuesta)", message.from));
    } else {
        lines.push(format!("  DE:     {}", message.from));
    }
    lines.push(format!("  ASUNTO: {}", message.subject));
    if !message.centre.is_empty() {
        lines.push(format!("  CENTRO: {}", message.centre));
    }
    if !message.group.is_empty() {
        lines.push(format!("  GRUPO:  {}", message.group));
    }
    lines.push("  ---".to_string());
    lines.push(format!("  {}", message.body));
    if message.has_attachments() {
        lines.push(String::new());
        lines.push("  Contiene adjuntos".to_string());
    }
    lines.join("\n")
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client posting to one chat
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    chat_id: String,
    base_url: String,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Client for bot `token` posting to `chat_id`
    #[must_use]
    pub fn new(token: &str, chat_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            chat_id: chat_id.into(),
            base_url: format!("{TELEGRAM_API}/bot{token}"),
        }
    }

    /// Point the client at another server (a local mock)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Destination chat
    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send plain text
    ///
    /// # Errors
    ///
    /// [`NotifierError::Notification`] on transport errors or a refused request.
    pub async fn send_text(&self, text: &str) -> NotifierResult<()> {
        let url = format!("{}/sendMessage", self.base_url);
        debug!(chat_id = %self.chat_id, "sending text");
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await
    }

    /// Upload a file with the method matching its extension
    ///
    /// # Errors
    ///
    /// I/O errors reading the file, or [`NotifierError::Notification`].
    pub async fn send_attachment(&self, path: &Path) -> NotifierResult<AttachmentKind> {
        let kind = AttachmentKind::from_path(path);
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| NotifierError::notification(format!("invalid MIME type: {e}")))?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part(kind.field(), part);

        let url = format!("{}/{}", self.base_url, kind.method());
        debug!(path = %path.display(), method = kind.method(), "uploading attachment");
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await?;
        Ok(kind)
    }
}

/// The request URL carries the bot token, so it is stripped from the error
fn transport_error(err: reqwest::Error) -> NotifierError {
    NotifierError::notification(err.without_url().to_string())
}

async fn check(response: reqwest::Response) -> NotifierResult<()> {
    let status = response.status();
    let body: TelegramResponse = response.json().await.map_err(|e| {
        NotifierError::notification(format!("HTTP {status}: {}", e.without_url()))
    })?;
    if body.ok {
        Ok(())
    } else {
        Err(NotifierError::notification(
            body.description
                .unwrap_or_else(|| format!("HTTP {status}")),
        ))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &EducamosMessage) -> NotifierResult<Delivery> {
        self.send_text(&format_message(message)).await?;

        let mut delivery = Delivery::default();
        for path in message.attachments.iter().flatten() {
            match self.send_attachment(path).await {
                Ok(_) => delivery.attachments_sent += 1,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "sending attachment failed");
                    delivery.attachments_failed += 1;
                }
            }
        }
        Ok(delivery)
    }
}
