//! CLI configuration

use std::fmt;
use std::time::Duration;

use educamos_notifier::{BrowserConfig, LocatorTimeouts, SessionSettings, TelegramNotifier};

use crate::commands::SessionArgs;
use crate::error::{CliError, CliResult};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - debug logs from this crate and the library
    Verbose,
    /// Debug - debug logs from every dependency
    Debug,
}

impl Verbosity {
    /// Level for a `-v` count
    #[must_use]
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Normal => "info",
            Self::Verbose => "info,educamos_notifier=debug,educamos_notifier_cli=debug",
            Self::Debug => "debug",
        }
    }
}

/// Telegram destination
#[derive(Clone)]
pub struct TelegramTarget {
    /// Bot token
    pub token: String,
    /// Receiving chat
    pub chat_id: String,
}

impl fmt::Debug for TelegramTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTarget")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Portal session settings
    pub session: SessionSettings,
    /// Browser launch options
    pub browser: BrowserConfig,
    /// Telegram destination, if configured
    pub telegram: Option<TelegramTarget>,
}

impl CliConfig {
    /// Build from parsed arguments
    #[must_use]
    pub fn from_args(args: &SessionArgs, verbosity: Verbosity) -> Self {
        let timeouts = LocatorTimeouts::default()
            .with_element(Duration::from_millis(args.element_timeout_ms))
            .with_probe(Duration::from_millis(args.probe_timeout_ms));
        let session = SessionSettings::new(
            args.username.clone(),
            args.password.clone(),
            args.login_url.clone(),
            args.downloads_folder.clone(),
        )
        .with_timeouts(timeouts)
        .with_settle(Duration::from_millis(args.settle_ms));

        let mut browser = BrowserConfig::default().with_headless(!args.headed);
        if args.no_sandbox {
            browser = browser.with_no_sandbox();
        }
        if let Some(ref path) = args.chromium_path {
            browser = browser.with_chromium_path(path);
        }

        let telegram = match (&args.telegram_token, &args.telegram_chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramTarget {
                    token: token.clone(),
                    chat_id: chat_id.clone(),
                })
            }
            _ => None,
        };

        Self {
            verbosity,
            session,
            browser,
            telegram,
        }
    }

    /// Notifier for the configured destination
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the token or chat id is missing
    pub fn notifier(&self) -> CliResult<TelegramNotifier> {
        self.telegram
            .as_ref()
            .map(|target| TelegramNotifier::new(&target.token, target.chat_id.clone()))
            .ok_or_else(|| {
                CliError::config("TELEGRAM_TOKEN and TELEGRAM_CHAT_ID must both be set")
            })
    }
}
