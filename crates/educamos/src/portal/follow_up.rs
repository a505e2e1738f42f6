//! "Seguimiento Educativo", the frameset application hosting the messages.

use std::sync::Arc;

use crate::driver::PortalDriver;
use crate::node::{LocatorNode, LocatorTimeouts};
use crate::portal::{BodyFrame, LowerFrame, NavigationBar, TitleToolbar};
use crate::selector::SelectorMap;

/// Top of the frame hierarchy; owns every nested page object
#[derive(Debug, Clone)]
pub struct FollowUpPage {
    node: Arc<LocatorNode>,
    /// Navigation bar frame
    pub navigation: NavigationBar,
    /// Frame chain down to the message list
    pub lower: LowerFrame,
}

impl FollowUpPage {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new().with("cell", "td")
    }

    /// Application page on the top-level document
    #[must_use]
    pub fn new(
        driver: Arc<dyn PortalDriver>,
        timeouts: LocatorTimeouts,
        overrides: Option<&SelectorMap>,
    ) -> Self {
        let node = LocatorNode::root(
            "seguimientoEducativo",
            driver,
            timeouts,
            Self::defaults(),
            overrides,
        );
        let navigation = NavigationBar::attach(&node, None);
        let lower = LowerFrame::attach(&node, None);
        Self {
            node,
            navigation,
            lower,
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// Body frame, `inferior > principal > cuerpo`
    #[must_use]
    pub const fn body(&self) -> &BodyFrame {
        &self.lower.principal.body
    }

    /// Title toolbar, `inferior > principal > botoneraTitulo`
    #[must_use]
    pub const fn toolbar(&self) -> &TitleToolbar {
        &self.lower.principal.toolbar
    }
}
