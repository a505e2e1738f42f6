//! Chromium-backed [`PortalDriver`].
//!
//! With the `browser` feature, [`CdpDriver`] drives a real Chromium over the
//! `DevTools` protocol through chromiumoxide. Elements are addressed with
//! JavaScript: every frame is a document expression
//! (`<parent>.querySelector(sel)?.contentDocument`), so a lazy
//! [`ElementRef`] is re-evaluated on each call exactly like the mock does.
//! Without the feature only [`BrowserConfig`] and [`launch`] exist, and
//! launching fails.

#![cfg_attr(not(feature = "browser"), allow(dead_code))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::driver::{ElementRef, PortalDriver, Scope, WaitState};
use crate::result::{NotifierError, NotifierResult};

/// Interval between state checks while waiting on an element
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Budget for one attachment transfer
pub const DEFAULT_DOWNLOAD_TIMEOUT_MS: u64 = 120_000;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Where the browser writes transfers before they are saved
    pub scratch_dir: PathBuf,
    /// Budget for a single transfer
    pub download_timeout: Duration,
    /// Interval between element state checks
    pub poll_interval: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            sandbox: true,
            scratch_dir: std::env::temp_dir().join("educamos-notifier-downloads"),
            download_timeout: Duration::from_millis(DEFAULT_DOWNLOAD_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Directory for in-flight transfers
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Budget for a single transfer
    #[must_use]
    pub const fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }
}

/// Launch a browser session and hand it out as a [`PortalDriver`]
///
/// # Errors
///
/// Returns [`NotifierError::Driver`] if the browser cannot be started, or
/// if the crate was built without the `browser` feature.
#[cfg(feature = "browser")]
pub async fn launch(config: BrowserConfig) -> NotifierResult<Arc<dyn PortalDriver>> {
    let driver = CdpDriver::launch(config).await?;
    Ok(Arc::new(driver))
}

/// Launch a browser session and hand it out as a [`PortalDriver`]
///
/// # Errors
///
/// Always fails: this build has no browser support.
#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
pub async fn launch(config: BrowserConfig) -> NotifierResult<Arc<dyn PortalDriver>> {
    let _ = config;
    Err(NotifierError::driver(
        "built without the `browser` feature",
    ))
}

// ============================================================================
// Element addressing
// ============================================================================

/// Document expression for a scope
fn document_expr(scope: &Scope) -> String {
    scope
        .frame()
        .map_or_else(|| "document".to_string(), |frame| frame.id().to_string())
}

/// Steps as a JSON array of `[selector, nth]` pairs
fn steps_json(element: &ElementRef) -> String {
    let steps: Vec<(&str, Option<usize>)> = element
        .steps()
        .iter()
        .map(|step| (step.selector.as_str(), step.nth))
        .collect();
    serde_json::to_string(&steps).unwrap_or_else(|_| "[]".to_string())
}

/// Expression evaluating to the element, or `null`
fn resolve_js(element: &ElementRef) -> String {
    format!(
        "(() => {{ let n = {doc}; for (const [s, i] of {steps}) {{ if (!n) return null; \
         n = i === null ? n.querySelector(s) : (n.querySelectorAll(s)[i] || null); }} \
         return n || null; }})()",
        doc = document_expr(element.scope()),
        steps = steps_json(element),
    )
}

/// Run `body` with the element bound to `el`
fn with_element_js(element: &ElementRef, body: &str) -> String {
    format!("(() => {{ const el = {}; {body} }})()", resolve_js(element))
}

/// Number of matches of the last step inside its parent
fn count_js(element: &ElementRef) -> String {
    format!(
        "(() => {{ const steps = {steps}; let n = {doc}; \
         for (let k = 0; k < steps.length; k++) {{ const [s, i] = steps[k]; \
         if (!n) return 0; \
         if (k === steps.length - 1) {{ const all = n.querySelectorAll(s); \
         return i === null ? all.length : (all[i] ? 1 : 0); }} \
         n = i === null ? n.querySelector(s) : (n.querySelectorAll(s)[i] || null); }} \
         return 0; }})()",
        doc = document_expr(element.scope()),
        steps = steps_json(element),
    )
}

/// Document expression of the frame hosted by the element
fn frame_expr(element: &ElementRef) -> String {
    format!("({})?.contentDocument", resolve_js(element))
}

fn state_js(element: &ElementRef, state: WaitState) -> String {
    let check = match state {
        WaitState::Attached => "return !!el;",
        WaitState::Detached => "return !el;",
        WaitState::Visible => {
            "return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);"
        }
        WaitState::Hidden => {
            "return !el || !(el.offsetWidth || el.offsetHeight || el.getClientRects().length);"
        }
    };
    with_element_js(element, check)
}

fn fill_js(element: &ElementRef, text: &str) -> String {
    let value = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    with_element_js(
        element,
        &format!(
            "if (!el) return false; el.focus(); el.value = {value}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;"
        ),
    )
}

fn attribute_js(element: &ElementRef, name: &str) -> String {
    let name = serde_json::to_string(name).unwrap_or_else(|_| "\"\"".to_string());
    with_element_js(
        element,
        &format!(
            "if (!el) return null; const name = {name}; \
             return {{ value: (name === 'value' && 'value' in el) ? el.value : el.getAttribute(name) }};"
        ),
    )
}

fn missing(element: &ElementRef) -> NotifierError {
    NotifierError::driver(format!("no element matches '{element}'"))
}

/// Listener tasks owned by a browser session; aborted on drop
#[derive(Debug, Default)]
struct BackgroundTasks(Vec<tokio::task::JoinHandle<()>>);

impl BackgroundTasks {
    fn push(&mut self, task: tokio::task::JoinHandle<()>) {
        self.0.push(task);
    }

    fn abort_all(&self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;

#[cfg(feature = "browser")]
mod cdp {
    use super::{
        attribute_js, count_js, fill_js, frame_expr, missing, state_js, with_element_js,
        BackgroundTasks, BrowserConfig,
    };
    use std::collections::{HashMap, VecDeque};
    use std::path::Path;
    use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::browser::{
        DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
        SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use tokio::sync::Mutex;
    use tracing::{debug, warn};

    use crate::driver::{
        DialogAction, Download, ElementRef, FrameHandle, PortalDriver, WaitState,
    };
    use crate::result::{NotifierError, NotifierResult};

    fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Transfers reported by the browser, filled by background listeners
    #[derive(Debug, Default)]
    struct Transfers {
        begun: StdMutex<VecDeque<Download>>,
        states: StdMutex<HashMap<String, DownloadProgressState>>,
    }

    #[derive(Debug, Deserialize)]
    struct TextProbe {
        text: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct AttributeProbe {
        value: Option<String>,
    }

    /// Chromium session on a single page
    #[derive(Debug)]
    pub struct CdpDriver {
        config: BrowserConfig,
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        dialog_policy: Arc<StdMutex<Option<DialogAction>>>,
        transfers: Arc<Transfers>,
        tasks: BackgroundTasks,
    }

    impl CdpDriver {
        /// Launch Chromium and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched or instrumented
        pub async fn launch(config: BrowserConfig) -> NotifierResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(NotifierError::driver)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;

            let mut tasks = BackgroundTasks::default();
            tasks.push(tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            }));

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;

            tokio::fs::create_dir_all(&config.scratch_dir).await?;
            let behavior = SetDownloadBehaviorParams::builder()
                .behavior(SetDownloadBehaviorBehavior::AllowAndName)
                .download_path(config.scratch_dir.to_string_lossy().into_owned())
                .events_enabled(true)
                .build()
                .map_err(NotifierError::driver)?;
            browser
                .execute(behavior)
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;

            let dialog_policy = Arc::new(StdMutex::new(None));
            let transfers = Arc::new(Transfers::default());

            let mut dialogs = page
                .event_listener::<EventJavascriptDialogOpening>()
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;
            let policy = Arc::clone(&dialog_policy);
            let dialog_page = page.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(event) = dialogs.next().await {
                    let action = *lock(&policy);
                    let accept = match action {
                        Some(DialogAction::Accept) => true,
                        Some(DialogAction::Dismiss) => false,
                        None => {
                            warn!(message = %event.message, "dialog opened with no policy, dismissing");
                            false
                        }
                    };
                    debug!(message = %event.message, accept, "answering dialog");
                    if let Err(e) = dialog_page
                        .execute(HandleJavaScriptDialogParams::new(accept))
                        .await
                    {
                        warn!(error = %e, "could not answer dialog");
                    }
                }
            }));

            let mut begun = browser
                .event_listener::<EventDownloadWillBegin>()
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;
            let sink = Arc::clone(&transfers);
            tasks.push(tokio::spawn(async move {
                while let Some(event) = begun.next().await {
                    debug!(guid = %event.guid, file = %event.suggested_filename, "transfer started");
                    lock(&sink.begun).push_back(Download {
                        guid: event.guid.clone(),
                        suggested_filename: event.suggested_filename.clone(),
                    });
                }
            }));

            let mut progress = browser
                .event_listener::<EventDownloadProgress>()
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;
            let sink = Arc::clone(&transfers);
            tasks.push(tokio::spawn(async move {
                while let Some(event) = progress.next().await {
                    lock(&sink.states).insert(event.guid.clone(), event.state.clone());
                }
            }));

            Ok(Self {
                config,
                browser: Mutex::new(browser),
                page,
                dialog_policy,
                transfers,
                tasks,
            })
        }

        /// Configuration the session was launched with
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn eval<T: DeserializeOwned>(&self, expr: String) -> NotifierResult<T> {
            let result = self
                .page
                .evaluate(expr.as_str())
                .await
                .map_err(|e| NotifierError::driver(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| NotifierError::driver(e.to_string()))
        }

        async fn poll<T>(
            &self,
            timeout: Duration,
            what: &str,
            mut check: impl FnMut() -> Option<T>,
        ) -> NotifierResult<T> {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(value) = check() {
                    return Ok(value);
                }
                if Instant::now() >= deadline {
                    return Err(NotifierError::download(format!(
                        "{what} within {}ms",
                        timeout.as_millis()
                    )));
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }

    #[async_trait]
    impl PortalDriver for CdpDriver {
        async fn goto(&self, url: &str) -> NotifierResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| NotifierError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn wait_for(
            &self,
            element: &ElementRef,
            state: WaitState,
            timeout: Duration,
        ) -> NotifierResult<()> {
            let expr = state_js(element, state);
            let deadline = Instant::now() + timeout;
            loop {
                // Frames may be mid-navigation; a failed evaluation counts as "not yet"
                match self.eval::<bool>(expr.clone()).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e) => debug!(element = %element, error = %e, "state check failed"),
                }
                if Instant::now() >= deadline {
                    return Err(NotifierError::ElementWaitTimeout {
                        selector: element.describe(),
                        ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        async fn content_frame(&self, element: &ElementRef) -> NotifierResult<FrameHandle> {
            let hosted: bool = self
                .eval(with_element_js(element, "return !!(el && el.contentDocument);"))
                .await?;
            if !hosted {
                return Err(NotifierError::driver(format!(
                    "'{element}' does not host a document"
                )));
            }
            Ok(FrameHandle::new(frame_expr(element)))
        }

        async fn count(&self, element: &ElementRef) -> NotifierResult<usize> {
            self.eval(count_js(element)).await
        }

        async fn is_enabled(&self, element: &ElementRef) -> NotifierResult<bool> {
            let enabled: Option<bool> = self
                .eval(with_element_js(element, "return el ? !el.disabled : null;"))
                .await?;
            enabled.ok_or_else(|| missing(element))
        }

        async fn click(&self, element: &ElementRef) -> NotifierResult<()> {
            let clicked: bool = self
                .eval(with_element_js(
                    element,
                    "if (!el) return false; el.scrollIntoView({ block: 'center' }); el.click(); return true;",
                ))
                .await?;
            if clicked {
                Ok(())
            } else {
                Err(missing(element))
            }
        }

        async fn fill(&self, element: &ElementRef, text: &str) -> NotifierResult<()> {
            let filled: bool = self.eval(fill_js(element, text)).await?;
            if filled {
                Ok(())
            } else {
                Err(missing(element))
            }
        }

        async fn text_content(&self, element: &ElementRef) -> NotifierResult<Option<String>> {
            let probe: Option<TextProbe> = self
                .eval(with_element_js(
                    element,
                    "return el ? { text: el.textContent } : null;",
                ))
                .await?;
            probe.map(|p| p.text).ok_or_else(|| missing(element))
        }

        async fn attribute(&self, element: &ElementRef, name: &str) -> NotifierResult<Option<String>> {
            let probe: Option<AttributeProbe> = self.eval(attribute_js(element, name)).await?;
            probe.map(|p| p.value).ok_or_else(|| missing(element))
        }

        async fn is_checked(&self, element: &ElementRef) -> NotifierResult<bool> {
            let checked: Option<bool> = self
                .eval(with_element_js(element, "return el ? !!el.checked : null;"))
                .await?;
            checked.ok_or_else(|| missing(element))
        }

        async fn set_dialog_policy(&self, action: DialogAction) -> NotifierResult<()> {
            *lock(&self.dialog_policy) = Some(action);
            Ok(())
        }

        async fn click_for_download(&self, element: &ElementRef) -> NotifierResult<Download> {
            lock(&self.transfers.begun).clear();
            self.click(element).await?;

            let timeout = self.config.download_timeout;
            let download = self
                .poll(timeout, "no transfer started", || {
                    lock(&self.transfers.begun).pop_front()
                })
                .await?;

            let state = self
                .poll(timeout, "transfer did not finish", || {
                    match lock(&self.transfers.states).get(&download.guid) {
                        Some(DownloadProgressState::InProgress) | None => None,
                        Some(state) => Some(state.clone()),
                    }
                })
                .await?;

            match state {
                DownloadProgressState::Completed => Ok(download),
                _ => Err(NotifierError::download(format!(
                    "transfer of '{}' was cancelled",
                    download.suggested_filename
                ))),
            }
        }

        async fn save_download(&self, download: &Download, path: &Path) -> NotifierResult<()> {
            let source = self.config.scratch_dir.join(&download.guid);
            if tokio::fs::rename(&source, path).await.is_err() {
                tokio::fs::copy(&source, path).await?;
                tokio::fs::remove_file(&source).await?;
            }
            lock(&self.transfers.states).remove(&download.guid);
            Ok(())
        }

        async fn close(&self) -> NotifierResult<()> {
            let mut browser = self.browser.lock().await;
            let closed = browser.close().await;
            if closed.is_ok() {
                if let Err(err) = browser.wait().await {
                    warn!(error = %err, "waiting for the browser process failed");
                }
            }
            self.tasks.abort_all();
            closed
                .map(|_| ())
                .map_err(|e| NotifierError::driver(e.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::FrameHandle;

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = BrowserConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert!(config.chromium_path.is_none());
            assert_eq!(config.poll_interval, Duration::from_millis(100));
        }

        #[test]
        fn test_builders() {
            let config = BrowserConfig::default()
                .with_headless(false)
                .with_no_sandbox()
                .with_chromium_path("/usr/bin/chromium")
                .with_scratch_dir("/tmp/scratch")
                .with_download_timeout(Duration::from_secs(5))
                .with_viewport(800, 600);
            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.chromium_path, Some(PathBuf::from("/usr/bin/chromium")));
            assert_eq!(config.scratch_dir, PathBuf::from("/tmp/scratch"));
            assert_eq!(config.download_timeout, Duration::from_secs(5));
            assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        }
    }

    mod addressing_tests {
        use super::*;

        #[test]
        fn test_page_scope_uses_document() {
            let element = ElementRef::new(Scope::Page, "#username");
            let js = resolve_js(&element);
            assert!(js.contains("let n = document;"));
            assert!(js.contains(r##"[["#username",null]]"##));
        }

        #[test]
        fn test_nth_and_descendant_steps() {
            let element = ElementRef::new(Scope::Page, "tr.doc")
                .nth(1)
                .descendant("td a");
            assert!(resolve_js(&element).contains(r#"[["tr.doc",1],["td a",null]]"#));
        }

        #[test]
        fn test_selector_quotes_are_escaped() {
            let element = ElementRef::new(Scope::Page, "a[title=\"x\"]");
            assert!(resolve_js(&element).contains(r#""a[title=\"x\"]""#));
        }

        #[test]
        fn test_frame_scope_uses_frame_document() {
            let host = ElementRef::new(Scope::Page, "[name='inferior']");
            let frame = FrameHandle::new(frame_expr(&host));
            let element = ElementRef::new(Scope::Frame(frame), "#numeroMensajes");
            let js = resolve_js(&element);
            assert!(js.contains("?.contentDocument"));
            assert!(js.contains("[name='inferior']"));
            assert!(js.contains("#numeroMensajes"));
        }

        #[test]
        fn test_fill_escapes_text() {
            let element = ElementRef::new(Scope::Page, "#password");
            let js = fill_js(&element, "pa\"ss\nword");
            assert!(js.contains(r#"el.value = "pa\"ss\nword";"#));
        }

        #[test]
        fn test_count_targets_last_step() {
            let element = ElementRef::new(Scope::Page, "table").descendant("tr");
            assert!(count_js(&element).contains("querySelectorAll(s)"));
        }

        #[test]
        fn test_wait_states_render_distinct_checks() {
            let element = ElementRef::new(Scope::Page, "#x");
            assert!(state_js(&element, WaitState::Attached).contains("return !!el;"));
            assert!(state_js(&element, WaitState::Detached).contains("return !el;"));
            assert!(state_js(&element, WaitState::Visible).contains("offsetWidth"));
        }

        #[test]
        fn test_attribute_reads_live_value() {
            let element = ElementRef::new(Scope::Page, "#username");
            let js = attribute_js(&element, "value");
            assert!(js.contains(r#"const name = "value";"#));
            assert!(js.contains("el.value"));
        }
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_browser_support_fails() {
        let err = launch(BrowserConfig::default()).await.unwrap_err();
        assert!(matches!(err, NotifierError::Driver { .. }));
    }

    mod task_tests {
        use super::*;
        use tokio::sync::oneshot;

        /// A task that never finishes; `rx` errors once the task is dropped
        fn idle_task() -> (tokio::task::JoinHandle<()>, oneshot::Receiver<()>) {
            let (tx, rx) = oneshot::channel::<()>();
            let task = tokio::spawn(async move {
                let _tx = tx;
                std::future::pending::<()>().await;
            });
            (task, rx)
        }

        #[tokio::test]
        async fn test_abort_all_stops_every_task() {
            let mut tasks = BackgroundTasks::default();
            let (first, first_rx) = idle_task();
            let (second, second_rx) = idle_task();
            tasks.push(first);
            tasks.push(second);

            tasks.abort_all();

            let wait = Duration::from_secs(1);
            assert!(tokio::time::timeout(wait, first_rx).await.unwrap().is_err());
            assert!(tokio::time::timeout(wait, second_rx).await.unwrap().is_err());
        }

        #[tokio::test]
        async fn test_drop_aborts_tasks() {
            let mut tasks = BackgroundTasks::default();
            let (task, rx) = idle_task();
            tasks.push(task);

            drop(tasks);

            let closed = tokio::time::timeout(Duration::from_secs(1), rx).await;
            assert!(closed.unwrap().is_err());
        }
    }
}
