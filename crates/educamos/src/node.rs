//! Locator nodes: one per logical UI region.
//!
//! A node is data, not behavior: a selector set, an optional frame
//! declaration and a non-owning link to its parent. Region-specific page
//! objects ([`crate::portal`]) wrap an `Arc<LocatorNode>` and own their
//! children, so the hierarchy stays a strict ownership tree while children
//! can still walk up to resolve frames.
//!
//! The frame cache is filled on first resolution and never reset. A fresh
//! view of the page (a row whose index shifted, a new session) means a
//! fresh node.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::driver::{FrameHandle, PortalDriver};
use crate::result::{NotifierError, NotifierResult};
use crate::selector::{SelectorMap, SelectorRegistry};

/// Default wait for elements and frames (30 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 30_000;

/// Default wait for existence probes (2 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Wait budgets shared by every node of a hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorTimeouts {
    /// Budget for `locate` and frame resolution
    pub element: Duration,
    /// Default budget for `exists` probes
    pub probe: Duration,
}

impl Default for LocatorTimeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS),
            probe: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

impl LocatorTimeouts {
    /// Set the element budget
    #[must_use]
    pub const fn with_element(mut self, timeout: Duration) -> Self {
        self.element = timeout;
        self
    }

    /// Set the probe budget
    #[must_use]
    pub const fn with_probe(mut self, timeout: Duration) -> Self {
        self.probe = timeout;
        self
    }
}

/// A unit of the locator hierarchy
pub struct LocatorNode {
    pub(crate) name: String,
    pub(crate) registry: SelectorRegistry,
    pub(crate) parent: Option<Weak<LocatorNode>>,
    pub(crate) driver: Arc<dyn PortalDriver>,
    pub(crate) timeouts: LocatorTimeouts,
    pub(crate) frame: OnceCell<Option<FrameHandle>>,
}

impl fmt::Debug for LocatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorNode")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("has_parent", &self.parent.is_some())
            .field("timeouts", &self.timeouts)
            .field("frame", &self.frame.get())
            .finish_non_exhaustive()
    }
}

impl LocatorNode {
    /// Top-level node of a hierarchy
    #[must_use]
    pub fn root(
        name: impl Into<String>,
        driver: Arc<dyn PortalDriver>,
        timeouts: LocatorTimeouts,
        defaults: SelectorMap,
        overrides: Option<&SelectorMap>,
    ) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            registry: SelectorRegistry::new(name.clone(), defaults, overrides),
            name,
            parent: None,
            driver,
            timeouts,
            frame: OnceCell::new(),
        })
    }

    /// Node nested under `parent`; shares its driver and timeouts
    #[must_use]
    pub fn child(
        parent: &Arc<Self>,
        name: impl Into<String>,
        defaults: SelectorMap,
        overrides: Option<&SelectorMap>,
    ) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            registry: SelectorRegistry::new(name.clone(), defaults, overrides),
            name,
            parent: Some(Arc::downgrade(parent)),
            driver: Arc::clone(&parent.driver),
            timeouts: parent.timeouts,
            frame: OnceCell::new(),
        })
    }

    /// Node name, used in logs and errors
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's selectors
    #[must_use]
    pub const fn registry(&self) -> &SelectorRegistry {
        &self.registry
    }

    /// Driver shared by the hierarchy
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PortalDriver> {
        &self.driver
    }

    /// Wait budgets
    #[must_use]
    pub const fn timeouts(&self) -> LocatorTimeouts {
        self.timeouts
    }

    /// Raw template registered for `name`
    ///
    /// # Errors
    ///
    /// [`NotifierError::SelectorNotFound`] if `name` is not registered.
    pub fn selector(&self, name: &str) -> NotifierResult<&str> {
        self.registry.get_selector(name)
    }

    /// The parent node, `None` for a root.
    ///
    /// # Errors
    ///
    /// [`NotifierError::DetachedNode`] if the parent was dropped.
    pub fn parent(&self) -> NotifierResult<Option<Arc<Self>>> {
        match &self.parent {
            None => Ok(None),
            Some(weak) => weak
                .upgrade()
                .map(Some)
                .ok_or_else(|| NotifierError::DetachedNode {
                    node: self.name.clone(),
                }),
        }
    }

    /// The cached frame, if resolution already ran
    #[must_use]
    pub fn cached_frame(&self) -> Option<Option<&FrameHandle>> {
        self.frame.get().map(Option::as_ref)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    fn driver() -> Arc<dyn PortalDriver> {
        Arc::new(MockDriver::new())
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = LocatorTimeouts::default();
        assert_eq!(timeouts.element, Duration::from_secs(30));
        assert_eq!(timeouts.probe, Duration::from_secs(2));

        let short = timeouts
            .with_element(Duration::from_millis(5))
            .with_probe(Duration::from_millis(1));
        assert_eq!(short.element, Duration::from_millis(5));
        assert_eq!(short.probe, Duration::from_millis(1));
    }

    #[test]
    fn test_child_inherits_driver_and_timeouts() {
        let timeouts = LocatorTimeouts::default().with_element(Duration::from_millis(7));
        let root = LocatorNode::root("page", driver(), timeouts, SelectorMap::new(), None);
        let child = LocatorNode::child(&root, "frame", SelectorMap::new(), None);

        assert_eq!(child.timeouts(), timeouts);
        assert!(Arc::ptr_eq(child.driver(), root.driver()));
        assert!(Arc::ptr_eq(&child.parent().unwrap().unwrap(), &root));
        assert!(root.parent().unwrap().is_none());
    }

    #[test]
    fn test_parent_link_is_non_owning() {
        let root = LocatorNode::root(
            "page",
            driver(),
            LocatorTimeouts::default(),
            SelectorMap::new(),
            None,
        );
        let child = LocatorNode::child(&root, "orphan", SelectorMap::new(), None);
        assert_eq!(Arc::strong_count(&root), 1);

        drop(root);
        let err = child.parent().unwrap_err();
        assert!(matches!(err, NotifierError::DetachedNode { ref node } if node == "orphan"));
    }

    #[test]
    fn test_selector_lookup() {
        let node = LocatorNode::root(
            "login",
            driver(),
            LocatorTimeouts::default(),
            SelectorMap::new().with("username", "#username"),
            None,
        );
        assert_eq!(node.selector("username").unwrap(), "#username");
        assert!(node.selector("password").is_err());
        assert!(node.cached_frame().is_none());
    }
}
