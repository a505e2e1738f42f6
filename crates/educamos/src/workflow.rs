//! Message extraction workflow: one portal session, start to finish.
//!
//! ```text
//! LoggedOut ──login──► LoggedIn ──open app──► InApplication ──count──► Reading ──► Done
//! ```
//!
//! Reading repeats `unread` times: click "Mensajes" (the list reloads from
//! the top), then extract row 0. Opening or deleting the top message shifts
//! the rest up, so row 0 is the only position that stays meaningful.
//!
//! Any error on the way is caught once, in [`ExtractionSession::run`], and
//! turned into a single synthetic record.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::driver::PortalDriver;
use crate::message::EducamosMessage;
use crate::node::LocatorTimeouts;
use crate::portal::{Application, ApplicationsPanel, FollowUpPage, LoginPage, MessageRow};
use crate::result::NotifierResult;

// =============================================================================
// SETTINGS
// =============================================================================

/// Default pause after opening a message (5 seconds)
pub const DEFAULT_SETTLE_MS: u64 = 5_000;

/// Everything one session needs to know
#[derive(Clone)]
pub struct SessionSettings {
    /// Portal user
    pub username: String,
    /// Portal password
    pub password: String,
    /// Login page URL
    pub login_url: String,
    /// Where per-run attachment folders are created
    pub download_folder: PathBuf,
    /// Locator wait budgets
    pub timeouts: LocatorTimeouts,
    /// Pause after opening a message, before waiting for its content pane
    pub settle: Duration,
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("login_url", &self.login_url)
            .field("download_folder", &self.download_folder)
            .field("timeouts", &self.timeouts)
            .field("settle", &self.settle)
            .finish()
    }
}

impl SessionSettings {
    /// Settings with default timeouts and settle delay
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        login_url: impl Into<String>,
        download_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            login_url: login_url.into(),
            download_folder: download_folder.into(),
            timeouts: LocatorTimeouts::default(),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }

    /// Set the locator wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: LocatorTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the pause after opening a message
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Progress of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Browser open, nobody logged in
    LoggedOut,
    /// Credentials accepted
    LoggedIn,
    /// Inside "Seguimiento Educativo"
    InApplication,
    /// Extracting; `remaining` messages to go
    Reading {
        /// Messages left
        remaining: usize,
    },
    /// All messages extracted
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => write!(f, "logged-out"),
            Self::LoggedIn => write!(f, "logged-in"),
            Self::InApplication => write!(f, "in-application"),
            Self::Reading { remaining } => write!(f, "reading ({remaining} left)"),
            Self::Done => write!(f, "done"),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One extraction run against the portal. Holds no state between runs.
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    settings: SessionSettings,
}

/// Per-run mutable bits
struct RunContext {
    state: SessionState,
    attachment_folder: Option<PathBuf>,
}

impl RunContext {
    fn advance(&mut self, next: SessionState) {
        info!(from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

impl ExtractionSession {
    /// Session for `settings`
    #[must_use]
    pub const fn new(settings: SessionSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Launch a browser with `launch`, then [`run`](Self::run) on it.
    ///
    /// A failed launch yields the same single error record as a failed session.
    pub async fn run_launched<F>(&self, launch: F) -> Vec<EducamosMessage>
    where
        F: Future<Output = NotifierResult<Arc<dyn PortalDriver>>>,
    {
        match launch.await {
            Ok(driver) => self.run(driver).await,
            Err(err) => {
                error!(error = %err, "browser launch failed");
                vec![EducamosMessage::from_error(err)]
            }
        }
    }

    /// Extract every unread message. Never fails: an error anywhere yields a
    /// single record describing it. The driver is closed on both paths.
    pub async fn run(&self, driver: Arc<dyn PortalDriver>) -> Vec<EducamosMessage> {
        let mut ctx = RunContext {
            state: SessionState::LoggedOut,
            attachment_folder: None,
        };
        let outcome = self.extract(Arc::clone(&driver), &mut ctx).await;

        if let Err(err) = driver.close().await {
            warn!(error = %err, "closing the browser failed");
        }

        match outcome {
            Ok(messages) => {
                info!(count = messages.len(), "session finished");
                messages
            }
            Err(err) => {
                error!(state = %ctx.state, error = %err, "session failed");
                vec![EducamosMessage::from_error(err)]
            }
        }
    }

    async fn extract(
        &self,
        driver: Arc<dyn PortalDriver>,
        ctx: &mut RunContext,
    ) -> NotifierResult<Vec<EducamosMessage>> {
        let settings = &self.settings;
        tokio::fs::create_dir_all(&settings.download_folder).await?;

        let login = LoginPage::new(Arc::clone(&driver), settings.timeouts, None);
        login.navigate(&settings.login_url).await?;
        login.do_login(&settings.username, &settings.password).await?;
        ctx.advance(SessionState::LoggedIn);

        let panel = ApplicationsPanel::new(Arc::clone(&driver), settings.timeouts, None);
        panel.open(Application::SeguimientoEducativo).await?;
        ctx.advance(SessionState::InApplication);

        let page = FollowUpPage::new(driver, settings.timeouts, None);
        let unread = page.navigation.unread_count().await?;
        info!(unread, "unread messages");
        ctx.advance(SessionState::Reading { remaining: unread });

        let mut messages = Vec::with_capacity(unread);
        for done in 0..unread {
            page.navigation.click_messages().await?;
            let message = self.read_top_message(&page, ctx).await?;
            info!(
                n = done + 1,
                of = unread,
                subject = %message.subject,
                "message extracted"
            );
            messages.push(message);
            ctx.state = SessionState::Reading {
                remaining: unread - done - 1,
            };
        }
        ctx.advance(SessionState::Done);
        Ok(messages)
    }

    /// Extract the message at the top of the list
    async fn read_top_message(
        &self,
        page: &FollowUpPage,
        ctx: &mut RunContext,
    ) -> NotifierResult<EducamosMessage> {
        let row = page.body().message_row(0).await?;
        let message = EducamosMessage {
            date: row.date().await?,
            from: row.sender().await?,
            subject: row.subject().await?,
            is_response: row.is_response().await?,
            group: row.group().await?,
            centre: row.centre().await?,
            ..EducamosMessage::default()
        };

        if self.remove_if_deleted(page, &row).await? {
            return Ok(message.into_removal_stub());
        }

        let has_attachments = row.has_attachments().await?;
        row.click_subject().await?;
        if !self.settings.settle.is_zero() {
            tokio::time::sleep(self.settings.settle).await;
        }
        let body = page.body().message_text().await?;

        let attachments = if has_attachments {
            let folder = self.attachment_folder(ctx).await?;
            self.download_attachments(page, &folder).await?
        } else {
            Vec::new()
        };

        Ok(EducamosMessage {
            body,
            attachments: Some(attachments),
            ..message
        })
    }

    /// Delete the row if its sender already removed the message
    async fn remove_if_deleted(
        &self,
        page: &FollowUpPage,
        row: &MessageRow,
    ) -> NotifierResult<bool> {
        let _ = row.checkbox_input().await?;
        if !row.is_removed().await? {
            return Ok(false);
        }
        info!("message was removed by its sender, deleting it");
        page.toolbar().node().accept_dialogs().await?;
        row.click_checkbox().await?;
        page.toolbar().click_delete().await?;
        Ok(true)
    }

    /// The run's attachment folder, created on first use
    async fn attachment_folder(&self, ctx: &mut RunContext) -> NotifierResult<PathBuf> {
        if let Some(folder) = &ctx.attachment_folder {
            return Ok(folder.clone());
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ").to_string();
        let folder = self.settings.download_folder.join(stamp);
        tokio::fs::create_dir_all(&folder).await?;
        info!(folder = %folder.display(), "attachment folder created");
        ctx.attachment_folder = Some(folder.clone());
        Ok(folder)
    }

    /// Save every attachment of the opened message; failures are logged and skipped
    async fn download_attachments(
        &self,
        page: &FollowUpPage,
        folder: &Path,
    ) -> NotifierResult<Vec<PathBuf>> {
        let body = page.body();
        if !body.is_document_present().await? {
            warn!("message flagged with attachments but none are listed");
            return Ok(Vec::new());
        }
        let count = body.document_count().await?;
        info!(count, "downloading attachments");

        let mut saved = Vec::with_capacity(count);
        for index in 0..count {
            match self.download_one(page, index, folder).await {
                Ok(path) => {
                    info!(path = %path.display(), "attachment saved");
                    saved.push(path);
                }
                Err(err) => warn!(index, error = %err, "attachment transfer failed"),
            }
        }
        Ok(saved)
    }

    async fn download_one(
        &self,
        page: &FollowUpPage,
        index: usize,
        folder: &Path,
    ) -> NotifierResult<PathBuf> {
        let body = page.body();
        let link = body.document_link(index).await?;
        let download = body.node().driver().click_for_download(&link).await?;
        let path = folder.join(safe_file_name(&download.suggested_filename, index));
        body.node().driver().save_download(&download, &path).await?;
        Ok(path)
    }
}

/// Last path component of a server-suggested name
fn safe_file_name(suggested: &str, index: usize) -> PathBuf {
    Path::new(suggested)
        .file_name()
        .map_or_else(|| PathBuf::from(format!("attachment-{index}")), PathBuf::from)
}
