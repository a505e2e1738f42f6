//! PortalDriver - abstract browser automation seam
//!
//! The locator hierarchy never talks to a browser directly. Every lookup,
//! wait and interaction goes through [`PortalDriver`], so the same nodes run
//! against chromium ([`crate::CdpDriver`], `browser` feature) or against the
//! scripted [`MockDriver`] in tests.
//!
//! ```text
//! ┌──────────────────────┐      ┌─────────────────────────────┐
//! │ LocatorNode          │─────►│ PortalDriver (async trait)  │
//! │ (scope + selectors)  │      ├──────────────┬──────────────┤
//! └──────────────────────┘      │ CdpDriver    │ MockDriver   │
//!                               │ chromiumoxide│ in-memory DOM│
//!                               └──────────────┴──────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::result::{NotifierError, NotifierResult};

/// Driver-issued reference to an embedded document.
///
/// Clones share one allocation; [`FrameHandle::same_as`] compares identity,
/// so a node that inherits its parent's frame can be told apart from one
/// that queried the same frame again.
#[derive(Debug, Clone)]
pub struct FrameHandle(Arc<FrameRef>);

#[derive(Debug)]
struct FrameRef {
    id: String,
}

impl FrameHandle {
    /// Wrap a driver-specific frame id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::new(FrameRef { id: id.into() }))
    }

    /// Driver-specific id (a document expression for the CDP driver)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// Whether both handles are the very same resolution
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Document context that element queries run against
#[derive(Debug, Clone)]
pub enum Scope {
    /// The top-level page
    Page,
    /// An embedded document
    Frame(FrameHandle),
}

impl Scope {
    /// Stable key of the scope, `page` for the top-level document
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::Frame(frame) => frame.id(),
        }
    }

    /// The frame, if this scope is one
    #[must_use]
    pub const fn frame(&self) -> Option<&FrameHandle> {
        match self {
            Self::Page => None,
            Self::Frame(frame) => Some(frame),
        }
    }

    /// Whether this is the top-level page
    #[must_use]
    pub const fn is_page(&self) -> bool {
        matches!(self, Self::Page)
    }
}

impl From<Option<FrameHandle>> for Scope {
    fn from(frame: Option<FrameHandle>) -> Self {
        frame.map_or(Self::Page, Self::Frame)
    }
}

/// One step of an element path: a CSS selector, optionally narrowed to the
/// n-th match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorStep {
    /// CSS selector, evaluated inside the previous step's element
    pub selector: String,
    /// Zero-based match index; `None` means the first match
    pub nth: Option<usize>,
}

/// Lazy reference to an element, re-evaluated on every driver call
#[derive(Debug, Clone)]
pub struct ElementRef {
    scope: Scope,
    steps: Vec<LocatorStep>,
}

impl ElementRef {
    /// Element matching `selector` inside `scope`
    #[must_use]
    pub fn new(scope: Scope, selector: impl Into<String>) -> Self {
        Self {
            scope,
            steps: vec![LocatorStep {
                selector: selector.into(),
                nth: None,
            }],
        }
    }

    /// Narrow the last step to its `index`-th match
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.nth = Some(index);
        }
        self
    }

    /// Element matching `selector` inside this one
    #[must_use]
    pub fn descendant(&self, selector: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(LocatorStep {
            selector: selector.into(),
            nth: None,
        });
        Self {
            scope: self.scope.clone(),
            steps,
        }
    }

    /// Scope the element lives in
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Path from the scope's document to the element
    #[must_use]
    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// Selector of the first step
    #[must_use]
    pub fn selector(&self) -> &str {
        self.steps.first().map_or("", |step| step.selector.as_str())
    }

    /// Playwright-style rendering, e.g. `tr.doc >> nth=1 >> td a`
    #[must_use]
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|step| match step.nth {
                Some(index) => format!("{} >> nth={index}", step.selector),
                None => step.selector.clone(),
            })
            .collect::<Vec<_>>()
            .join(" >> ")
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Element states a wait can target (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitState {
    /// Present in the document
    #[default]
    Attached,
    /// Absent from the document
    Detached,
    /// Present and rendered
    Visible,
    /// Absent or not rendered
    Hidden,
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        };
        write!(f, "{name}")
    }
}

/// Answer given to `alert`/`confirm` dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Press OK
    Accept,
    /// Press Cancel
    Dismiss,
}

/// A finished file transfer, waiting to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Driver-specific transfer id
    pub guid: String,
    /// File name proposed by the server
    pub suggested_filename: String,
}

/// Abstract driver trait for browser automation.
///
/// All calls are sequential awaits; implementations never need to handle
/// two operations on the same page at once.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// Navigate the top-level page
    async fn goto(&self, url: &str) -> NotifierResult<()>;

    /// Wait until `element` reaches `state`.
    ///
    /// Fails with [`NotifierError::ElementWaitTimeout`] once `timeout` runs out.
    async fn wait_for(
        &self,
        element: &ElementRef,
        state: WaitState,
        timeout: Duration,
    ) -> NotifierResult<()>;

    /// Embedded document hosted by `element`
    async fn content_frame(&self, element: &ElementRef) -> NotifierResult<FrameHandle>;

    /// Number of matches of the element's last step
    async fn count(&self, element: &ElementRef) -> NotifierResult<usize>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self, element: &ElementRef) -> NotifierResult<bool>;

    /// Click the element
    async fn click(&self, element: &ElementRef) -> NotifierResult<()>;

    /// Replace the element's value with `text`
    async fn fill(&self, element: &ElementRef, text: &str) -> NotifierResult<()>;

    /// Raw text content
    async fn text_content(&self, element: &ElementRef) -> NotifierResult<Option<String>>;

    /// Attribute value
    async fn attribute(&self, element: &ElementRef, name: &str) -> NotifierResult<Option<String>>;

    /// Checked state of a checkbox
    async fn is_checked(&self, element: &ElementRef) -> NotifierResult<bool>;

    /// How dialogs opened from now on are answered
    async fn set_dialog_policy(&self, action: DialogAction) -> NotifierResult<()>;

    /// Click the element and wait for the transfer it starts to finish
    async fn click_for_download(&self, element: &ElementRef) -> NotifierResult<Download>;

    /// Persist a finished transfer at `path`, byte for byte
    async fn save_download(&self, download: &Download, path: &Path) -> NotifierResult<()>;

    /// Tear the browser session down
    async fn close(&self) -> NotifierResult<()>;
}

// ============================================================================
// Mock implementation
// ============================================================================

/// Element state in the [`MockDriver`] DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: Option<String>,
    /// Enabled for interaction
    pub enabled: bool,
    /// Rendered
    pub visible: bool,
    /// Checkbox state
    pub checked: bool,
    /// Number of matches reported by `count`
    pub count: usize,
    /// Clicking opens a confirmation dialog
    pub confirm: bool,
    /// Attributes
    pub attributes: HashMap<String, String>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: None,
            enabled: true,
            visible: true,
            checked: false,
            count: 1,
            confirm: false,
            attributes: HashMap::new(),
        }
    }
}

impl MockElement {
    /// Enabled, visible element without text
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element with text content
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the match count
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark as not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Clicking asks for confirmation
    #[must_use]
    pub const fn confirming(mut self) -> Self {
        self.confirm = true;
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }
}

/// The scripted document tree behind a [`MockDriver`].
///
/// Elements are keyed by scope key plus [`ElementRef::describe`].
#[derive(Debug, Default)]
pub struct MockDom {
    elements: HashMap<(String, String), MockElement>,
    frames: HashMap<(String, String), String>,
    downloads: HashMap<(String, String), VecDeque<(String, Vec<u8>)>>,
    transfers: HashMap<String, Vec<u8>>,
    dialog_policy: Option<DialogAction>,
    next_transfer: u64,
    url: Option<String>,
}

impl MockDom {
    /// Put an element in `scope`, replacing any previous one
    pub fn insert(&mut self, scope: &str, key: impl Into<String>, element: MockElement) {
        let _ = self
            .elements
            .insert((scope.to_string(), key.into()), element);
    }

    /// Remove an element
    pub fn remove(&mut self, scope: &str, key: &str) -> Option<MockElement> {
        self.elements.remove(&(scope.to_string(), key.to_string()))
    }

    /// Look up an element
    #[must_use]
    pub fn get(&self, scope: &str, key: &str) -> Option<&MockElement> {
        self.elements.get(&(scope.to_string(), key.to_string()))
    }

    /// Mutable element lookup
    pub fn get_mut(&mut self, scope: &str, key: &str) -> Option<&mut MockElement> {
        self.elements.get_mut(&(scope.to_string(), key.to_string()))
    }

    /// Make `selector` in `scope` host the document `frame_id`
    pub fn bind_frame(&mut self, scope: &str, selector: &str, frame_id: &str) {
        self.insert(scope, selector, MockElement::new());
        let _ = self.frames.insert(
            (scope.to_string(), selector.to_string()),
            frame_id.to_string(),
        );
    }

    /// Queue a file served when `key` in `scope` is clicked for download
    pub fn queue_download(
        &mut self,
        scope: &str,
        key: &str,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) {
        self.downloads
            .entry((scope.to_string(), key.to_string()))
            .or_default()
            .push_back((filename.into(), bytes.into()));
    }

    /// Current dialog policy
    #[must_use]
    pub const fn dialog_policy(&self) -> Option<DialogAction> {
        self.dialog_policy
    }

    /// Last URL navigated to
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Mutation run when a mock element is clicked
pub type ClickHook = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Mock driver for unit testing.
///
/// Waits resolve instantly: a missing element fails the wait immediately
/// instead of sleeping through the timeout.
#[derive(Default)]
pub struct MockDriver {
    dom: Mutex<MockDom>,
    hooks: Mutex<HashMap<(String, String), Vec<ClickHook>>>,
    call_history: Mutex<Vec<String>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("dom", &self.dom)
            .field("call_history", &self.call_history)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDriver {
    /// Create new mock driver with an empty DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit the DOM
    pub fn with_dom<R>(&self, edit: impl FnOnce(&mut MockDom) -> R) -> R {
        edit(&mut lock(&self.dom))
    }

    /// Add an element
    pub fn add_element(&self, scope: &str, key: impl Into<String>, element: MockElement) {
        self.with_dom(|dom| dom.insert(scope, key, element));
    }

    /// Bind a frame-hosting element
    pub fn add_frame(&self, scope: &str, selector: &str, frame_id: &str) {
        self.with_dom(|dom| dom.bind_frame(scope, selector, frame_id));
    }

    /// Run `hook` every time `key` in `scope` is clicked
    pub fn on_click(
        &self,
        scope: &str,
        key: impl Into<String>,
        hook: impl Fn(&mut MockDom) + Send + Sync + 'static,
    ) {
        lock(&self.hooks)
            .entry((scope.to_string(), key.into()))
            .or_default()
            .push(Arc::new(hook));
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.call_history).clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        lock(&self.call_history)
            .iter()
            .any(|call| call.starts_with(prefix))
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn count_calls(&self, prefix: &str) -> usize {
        lock(&self.call_history)
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, op: &str, element: &ElementRef) {
        lock(&self.call_history).push(format!(
            "{op}:{}:{}",
            element.scope().key(),
            element.describe()
        ));
    }

    fn record_raw(&self, entry: String) {
        lock(&self.call_history).push(entry);
    }

    fn element(&self, element: &ElementRef) -> Option<MockElement> {
        lock(&self.dom)
            .get(element.scope().key(), &element.describe())
            .cloned()
    }

    fn require(&self, element: &ElementRef) -> NotifierResult<MockElement> {
        self.element(element).ok_or_else(|| {
            NotifierError::driver(format!(
                "no element '{}' in {}",
                element.describe(),
                element.scope().key()
            ))
        })
    }

    fn run_hooks(&self, element: &ElementRef) {
        let key = (
            element.scope().key().to_string(),
            element.describe(),
        );
        let hooks = lock(&self.hooks).get(&key).cloned().unwrap_or_default();
        let mut dom = lock(&self.dom);
        for hook in hooks {
            hook(&mut dom);
        }
    }
}

#[async_trait]
impl PortalDriver for MockDriver {
    async fn goto(&self, url: &str) -> NotifierResult<()> {
        self.record_raw(format!("goto:{url}"));
        lock(&self.dom).url = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(
        &self,
        element: &ElementRef,
        state: WaitState,
        timeout: Duration,
    ) -> NotifierResult<()> {
        self.record(&format!("wait_for[{state}]"), element);
        let found = self.element(element);
        let reached = match state {
            WaitState::Attached => found.is_some(),
            WaitState::Visible => found.is_some_and(|e| e.visible),
            WaitState::Detached => found.is_none(),
            WaitState::Hidden => found.map_or(true, |e| !e.visible),
        };
        if reached {
            Ok(())
        } else {
            Err(NotifierError::ElementWaitTimeout {
                selector: element.describe(),
                ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content_frame(&self, element: &ElementRef) -> NotifierResult<FrameHandle> {
        self.record("content_frame", element);
        let key = (element.scope().key().to_string(), element.describe());
        lock(&self.dom)
            .frames
            .get(&key)
            .map(FrameHandle::new)
            .ok_or_else(|| {
                NotifierError::driver(format!("'{}' does not host a frame", element.describe()))
            })
    }

    async fn count(&self, element: &ElementRef) -> NotifierResult<usize> {
        self.record("count", element);
        Ok(self.element(element).map_or(0, |e| e.count))
    }

    async fn is_enabled(&self, element: &ElementRef) -> NotifierResult<bool> {
        Ok(self.require(element)?.enabled)
    }

    async fn click(&self, element: &ElementRef) -> NotifierResult<()> {
        self.record("click", element);
        let target = self.require(element)?;
        if target.confirm {
            let policy = lock(&self.dom).dialog_policy;
            match policy {
                Some(DialogAction::Accept) => self.record_raw("dialog:accept".to_string()),
                Some(DialogAction::Dismiss) => {
                    self.record_raw("dialog:dismiss".to_string());
                    return Ok(());
                }
                None => {
                    return Err(NotifierError::driver(format!(
                        "unhandled dialog opened by '{}'",
                        element.describe()
                    )))
                }
            }
        }
        self.run_hooks(element);
        Ok(())
    }

    async fn fill(&self, element: &ElementRef, text: &str) -> NotifierResult<()> {
        self.record("fill", element);
        let mut dom = lock(&self.dom);
        let target = dom
            .get_mut(element.scope().key(), &element.describe())
            .ok_or_else(|| NotifierError::driver(format!("no element '{}'", element.describe())))?;
        let _ = target
            .attributes
            .insert("value".to_string(), text.to_string());
        Ok(())
    }

    async fn text_content(&self, element: &ElementRef) -> NotifierResult<Option<String>> {
        self.record("text_content", element);
        Ok(self.require(element)?.text)
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> NotifierResult<Option<String>> {
        Ok(self.require(element)?.attributes.get(name).cloned())
    }

    async fn is_checked(&self, element: &ElementRef) -> NotifierResult<bool> {
        Ok(self.require(element)?.checked)
    }

    async fn set_dialog_policy(&self, action: DialogAction) -> NotifierResult<()> {
        self.record_raw(format!("dialog_policy:{action:?}"));
        lock(&self.dom).dialog_policy = Some(action);
        Ok(())
    }

    async fn click_for_download(&self, element: &ElementRef) -> NotifierResult<Download> {
        self.record("download", element);
        let _ = self.require(element)?;
        let key = (element.scope().key().to_string(), element.describe());
        let mut dom = lock(&self.dom);
        let (filename, bytes) = dom
            .downloads
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                NotifierError::download(format!("'{}' started no transfer", element.describe()))
            })?;
        dom.next_transfer += 1;
        let guid = format!("mock-transfer-{}", dom.next_transfer);
        let _ = dom.transfers.insert(guid.clone(), bytes);
        Ok(Download {
            guid,
            suggested_filename: filename,
        })
    }

    async fn save_download(&self, download: &Download, path: &Path) -> NotifierResult<()> {
        self.record_raw(format!("save_download:{}", path.display()));
        let bytes = lock(&self.dom)
            .transfers
            .remove(&download.guid)
            .ok_or_else(|| NotifierError::download(format!("unknown transfer {}", download.guid)))?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn close(&self) -> NotifierResult<()> {
        self.record_raw("close".to_string());
        Ok(())
    }
}
