//! The nested frame chain holding the message list.

use std::sync::Arc;

use crate::driver::ElementRef;
use crate::node::LocatorNode;
use crate::portal::BodyFrame;
use crate::result::NotifierResult;
use crate::selector::{SelectorMap, FRAME};

/// Outer content frame, `[name='inferior']`
#[derive(Debug, Clone)]
pub struct LowerFrame {
    node: Arc<LocatorNode>,
    /// Principal frame nested inside
    pub principal: PrincipalFrame,
}

impl LowerFrame {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new().with(FRAME, "[name='inferior']")
    }

    /// Frame chain nested under `parent`, with default selectors below
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, overrides: Option<&SelectorMap>) -> Self {
        let node = LocatorNode::child(parent, "inferior", Self::defaults(), overrides);
        let principal = PrincipalFrame::attach(&node, None);
        Self { node, principal }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }
}

/// `[name='principal']`, parent of the body and toolbar frames
#[derive(Debug, Clone)]
pub struct PrincipalFrame {
    node: Arc<LocatorNode>,
    /// Message list and message content
    pub body: BodyFrame,
    /// Toolbar with the delete action
    pub toolbar: TitleToolbar,
}

impl PrincipalFrame {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new().with(FRAME, "[name='principal']")
    }

    /// Principal frame nested under `parent`
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, overrides: Option<&SelectorMap>) -> Self {
        let node = LocatorNode::child(parent, "principal", Self::defaults(), overrides);
        let body = BodyFrame::attach(&node, None);
        let toolbar = TitleToolbar::attach(&node, None);
        Self {
            node,
            body,
            toolbar,
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }
}

/// Title toolbar, `[name='botoneraTitulo']`
#[derive(Debug, Clone)]
pub struct TitleToolbar {
    node: Arc<LocatorNode>,
}

impl TitleToolbar {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new()
            .with(FRAME, "[name='botoneraTitulo']")
            .with("deleteButton", "#i_ELIMINAR_MENSAJES_SELECCIONADO")
    }

    /// Toolbar nested under `parent`
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, overrides: Option<&SelectorMap>) -> Self {
        Self {
            node: LocatorNode::child(parent, "botoneraTitulo", Self::defaults(), overrides),
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// "Delete selected messages" button
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn delete_button(&self) -> NotifierResult<ElementRef> {
        self.node.locate("deleteButton").await
    }

    /// Delete the selected messages; the portal asks for confirmation
    ///
    /// # Errors
    ///
    /// Lookup failures or a disabled button.
    pub async fn click_delete(&self) -> NotifierResult<()> {
        self.node.click("deleteButton").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, PortalDriver};
    use crate::node::LocatorTimeouts;
    use crate::portal::testing::bind_frames;

    #[tokio::test]
    async fn test_sibling_frames_share_principal() {
        let driver = Arc::new(MockDriver::new());
        bind_frames(&driver);
        let d: Arc<dyn PortalDriver> = driver.clone();
        let top = LocatorNode::root("top", d, LocatorTimeouts::default(), SelectorMap::new(), None);
        let lower = LowerFrame::attach(&top, None);

        let body = lower.principal.body.node().resolve_frame().await.unwrap().unwrap();
        let toolbar = lower.principal.toolbar.node().resolve_frame().await.unwrap().unwrap();
        assert_eq!(body.id(), "cuerpo");
        assert_eq!(toolbar.id(), "botonera");

        assert_eq!(driver.count_calls("content_frame:page:[name='inferior']"), 1);
        assert_eq!(driver.count_calls("content_frame:inferior:[name='principal']"), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_dialog_answer() {
        let driver = Arc::new(MockDriver::new());
        bind_frames(&driver);
        driver.add_element(
            "botonera",
            "#i_ELIMINAR_MENSAJES_SELECCIONADO",
            MockElement::new().confirming(),
        );
        let d: Arc<dyn PortalDriver> = driver.clone();
        let top = LocatorNode::root("top", d, LocatorTimeouts::default(), SelectorMap::new(), None);
        let lower = LowerFrame::attach(&top, None);
        let toolbar = &lower.principal.toolbar;

        assert!(toolbar.click_delete().await.is_err());
        toolbar.node().accept_dialogs().await.unwrap();
        toolbar.click_delete().await.unwrap();
        assert!(driver.was_called("dialog:accept"));
    }
}
