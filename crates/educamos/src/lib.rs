//! Educamos Notifier: message extraction for the Educamos school portal
//!
//! Logs into the portal's legacy frameset application ("Seguimiento
//! Educativo"), reads every unread message with its attachments, and
//! forwards the result to a Telegram chat.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  EDUCAMOS NOTIFIER Architecture                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Extraction │    │ Page       │    │ Locator    │            │
//! │   │ Session    │───►│ Objects    │───►│ Nodes +    │            │
//! │   │ (workflow) │    │ (portal)   │    │ Frames     │            │
//! │   └─────┬──────┘    └────────────┘    └─────┬──────┘            │
//! │         │                                   ▼                   │
//! │   ┌─────▼──────┐                     ┌────────────┐             │
//! │   │ Notifier   │                     │ Portal     │             │
//! │   │ (Telegram) │                     │ Driver     │             │
//! │   └────────────┘                     │ (CDP/mock) │             │
//! │                                      └────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
mod driver;
mod frame;
#[allow(clippy::missing_errors_doc)]
mod locator;
mod message;
mod node;
mod result;
mod selector;

#[allow(clippy::missing_errors_doc)]
pub mod portal;

#[allow(clippy::missing_errors_doc)]
pub mod notify;

pub mod workflow;

#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use browser::{
    launch, BrowserConfig, DEFAULT_DOWNLOAD_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
};
pub use driver::{
    DialogAction, Download, ElementRef, FrameHandle, LocatorStep, MockDom, MockDriver,
    MockElement, PortalDriver, Scope, WaitState,
};
pub use message::{
    is_affirmative, is_removal_marker, normalize_sender, EducamosMessage, BOT_SENDER,
    ERROR_SUBJECT, REMOVED_MARKER,
};
pub use node::{
    LocatorNode, LocatorTimeouts, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS,
};
pub use notify::{
    dispatch, format_message, AttachmentKind, Delivery, DispatchSummary, Notifier,
    TelegramNotifier, TELEGRAM_API,
};
pub use portal::{
    Application, ApplicationsPanel, BodyFrame, FollowUpPage, LoginPage, LowerFrame,
    MessageRow, NavigationBar, PrincipalFrame, TitleToolbar,
};
pub use result::{NotifierError, NotifierResult};
pub use selector::{substitute, SelectorMap, SelectorRegistry, DEFAULT_PLACEHOLDER, FRAME, ROOT};
pub use workflow::{ExtractionSession, SessionSettings, SessionState, DEFAULT_SETTLE_MS};
