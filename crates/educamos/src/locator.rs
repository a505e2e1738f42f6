//! Element locator: logical names to live, waitable element handles.
//!
//! Every lookup first settles the node's frame, then resolves the address
//! through the node's [`SelectorRegistry`](crate::selector::SelectorRegistry)
//! and auto-waits for the element before handing it out.

use std::time::Duration;

use tracing::debug;

use crate::driver::{DialogAction, ElementRef, WaitState};
use crate::node::LocatorNode;
use crate::result::{NotifierError, NotifierResult};
use crate::selector::{DEFAULT_PLACEHOLDER, ROOT};

impl LocatorNode {
    /// Wait for the element registered as `name` and return it
    ///
    /// # Errors
    ///
    /// [`NotifierError::SelectorNotFound`] for an unknown name,
    /// [`NotifierError::ElementWaitTimeout`] if it never appears.
    pub async fn locate(&self, name: &str) -> NotifierResult<ElementRef> {
        self.locate_with(name, None).await
    }

    /// [`locate`](Self::locate) with the template placeholder replaced by `parameter`
    ///
    /// # Errors
    ///
    /// As [`locate`](Self::locate).
    pub async fn locate_with(
        &self,
        name: &str,
        parameter: Option<&str>,
    ) -> NotifierResult<ElementRef> {
        let element = self.element(name, parameter).await?;
        self.wait_attached(&element).await?;
        Ok(element)
    }

    /// Unwaited element reference for `name`
    ///
    /// # Errors
    ///
    /// Selector or frame resolution failures.
    pub async fn element(&self, name: &str, parameter: Option<&str>) -> NotifierResult<ElementRef> {
        let scope = self.scope().await?;
        let address = self
            .registry
            .resolve_address(name, parameter, DEFAULT_PLACEHOLDER)?;
        Ok(ElementRef::new(scope, address))
    }

    /// Whether `name` reaches `state` within `timeout`.
    ///
    /// A failed wait is `false`; unknown names and frame failures still error.
    ///
    /// # Errors
    ///
    /// Selector or frame resolution failures.
    pub async fn exists(
        &self,
        name: &str,
        timeout: Duration,
        state: WaitState,
    ) -> NotifierResult<bool> {
        let element = self.element(name, None).await?;
        match self.driver.wait_for(&element, state, timeout).await {
            Ok(()) => Ok(true),
            Err(err) => {
                debug!(node = %self.name, element = %element, error = %err, "probe failed");
                Ok(false)
            }
        }
    }

    /// Locate `name`, check it is enabled and click it once
    ///
    /// # Errors
    ///
    /// [`NotifierError::ElementDisabled`] if the element refuses interaction,
    /// plus any lookup failure.
    pub async fn click(&self, name: &str) -> NotifierResult<()> {
        let element = self.locate(name).await?;
        self.click_element(&element).await
    }

    /// Click an already located element once
    ///
    /// # Errors
    ///
    /// [`NotifierError::ElementDisabled`] or driver failures.
    pub async fn click_element(&self, element: &ElementRef) -> NotifierResult<()> {
        if !self.driver.is_enabled(element).await? {
            return Err(NotifierError::ElementDisabled {
                selector: element.describe(),
            });
        }
        debug!(node = %self.name, element = %element, "click");
        self.driver.click(element).await
    }

    /// Trimmed text of `name`.
    ///
    /// With `required = false` an element absent after the probe timeout
    /// reads as an empty string.
    ///
    /// # Errors
    ///
    /// Lookup failures when `required` is set.
    pub async fn read_text(&self, name: &str, required: bool) -> NotifierResult<String> {
        if !required
            && !self
                .exists(name, self.timeouts.probe, WaitState::Attached)
                .await?
        {
            return Ok(String::new());
        }
        let element = self.locate(name).await?;
        self.element_text(&element).await
    }

    /// Trimmed text of an already located element
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn element_text(&self, element: &ElementRef) -> NotifierResult<String> {
        let text = self.driver.text_content(element).await?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    /// Type `text` into `name`, replacing its value when `clear_first` is
    /// set and appending to it otherwise
    ///
    /// # Errors
    ///
    /// Lookup or driver failures.
    pub async fn type_text(&self, name: &str, text: &str, clear_first: bool) -> NotifierResult<()> {
        let element = self.locate(name).await?;
        if clear_first {
            self.driver.fill(&element, text).await
        } else {
            let current = self
                .driver
                .attribute(&element, "value")
                .await?
                .unwrap_or_default();
            self.driver.fill(&element, &format!("{current}{text}")).await
        }
    }

    /// `value` attribute of `name`
    ///
    /// # Errors
    ///
    /// Lookup or driver failures.
    pub async fn value(&self, name: &str) -> NotifierResult<String> {
        let element = self.locate(name).await?;
        Ok(self
            .driver
            .attribute(&element, "value")
            .await?
            .unwrap_or_default())
    }

    /// Number of elements currently matching `name`, without waiting
    ///
    /// # Errors
    ///
    /// Selector or frame resolution failures.
    pub async fn count(&self, name: &str) -> NotifierResult<usize> {
        let element = self.element(name, None).await?;
        self.driver.count(&element).await
    }

    /// Checked state of the checkbox `name`
    ///
    /// # Errors
    ///
    /// Lookup or driver failures.
    pub async fn is_checked(&self, name: &str) -> NotifierResult<bool> {
        let element = self.locate(name).await?;
        self.driver.is_checked(&element).await
    }

    /// Wait for an element to appear, using the node's element budget
    ///
    /// # Errors
    ///
    /// [`NotifierError::ElementWaitTimeout`].
    pub async fn wait_attached(&self, element: &ElementRef) -> NotifierResult<()> {
        self.driver
            .wait_for(element, WaitState::Attached, self.timeouts.element)
            .await
    }

    /// Wait for an element to leave the document
    ///
    /// # Errors
    ///
    /// [`NotifierError::ElementWaitTimeout`].
    pub async fn wait_until_gone(&self, element: &ElementRef) -> NotifierResult<()> {
        self.driver
            .wait_for(element, WaitState::Detached, self.timeouts.element)
            .await
    }

    /// The node's `body` element
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn body(&self) -> NotifierResult<ElementRef> {
        self.locate("body").await
    }

    /// The node's root element (`body` when no root is declared)
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn root_element(&self) -> NotifierResult<ElementRef> {
        if self.registry.has_root() {
            self.locate(ROOT).await
        } else {
            self.body().await
        }
    }

    /// Navigate the top-level page
    ///
    /// # Errors
    ///
    /// [`NotifierError::Navigation`].
    pub async fn navigate(&self, url: &str) -> NotifierResult<()> {
        self.driver.goto(url).await
    }

    /// Accept every dialog opened from now on
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn accept_dialogs(&self) -> NotifierResult<()> {
        self.driver.set_dialog_policy(DialogAction::Accept).await
    }

    /// Dismiss every dialog opened from now on
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn dismiss_dialogs(&self) -> NotifierResult<()> {
        self.driver.set_dialog_policy(DialogAction::Dismiss).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, PortalDriver};
    use crate::node::LocatorTimeouts;
    use crate::selector::{SelectorMap, FRAME};
    use std::sync::Arc;

    fn login_node(driver: &Arc<MockDriver>) -> Arc<LocatorNode> {
        let driver: Arc<dyn PortalDriver> = driver.clone();
        LocatorNode::root(
            "login",
            driver,
            LocatorTimeouts::default(),
            SelectorMap::new()
                .with("username", "#username")
                .with("submit", "#kc-login")
                .with("label", "#numeroMensajes"),
            None,
        )
    }

    mod locate_tests {
        use super::*;

        #[tokio::test]
        async fn test_locate_waits_then_returns_handle() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#username", MockElement::new());
            let node = login_node(&driver);

            let element = node.locate("username").await.unwrap();
            assert_eq!(element.describe(), "#username");
            assert!(element.scope().is_page());
            assert!(driver.was_called("wait_for[attached]:page:#username"));
        }

        #[tokio::test]
        async fn test_locate_missing_element_times_out() {
            let driver = Arc::new(MockDriver::new());
            let node = login_node(&driver);
            let err = node.locate("username").await.unwrap_err();
            assert!(matches!(err, NotifierError::ElementWaitTimeout { .. }));
        }

        #[tokio::test]
        async fn test_unknown_name_is_not_a_timeout() {
            let driver = Arc::new(MockDriver::new());
            let node = login_node(&driver);
            let err = node.locate("nope").await.unwrap_err();
            assert!(matches!(err, NotifierError::SelectorNotFound { .. }));
            assert!(node.exists("nope", Duration::ZERO, WaitState::Attached).await.is_err());
        }

        #[tokio::test]
        async fn test_locate_inside_frame() {
            let driver = Arc::new(MockDriver::new());
            driver.add_frame("page", "[name='cuerpo']", "cuerpo");
            driver.add_element("cuerpo", ".tablaFondoMenRec", MockElement::text(" hola "));
            let d: Arc<dyn PortalDriver> = driver.clone();
            let cuerpo = LocatorNode::root(
                "cuerpo",
                d,
                LocatorTimeouts::default(),
                SelectorMap::new()
                    .with(FRAME, "[name='cuerpo']")
                    .with("messageTable", ".tablaFondoMenRec"),
                None,
            );

            assert_eq!(cuerpo.read_text("messageTable", true).await.unwrap(), "hola");
        }

        #[tokio::test]
        async fn test_locate_with_parameter() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "input:nth-of-type(3)", MockElement::new());
            let d: Arc<dyn PortalDriver> = driver.clone();
            let node = LocatorNode::root(
                "form",
                d,
                LocatorTimeouts::default(),
                SelectorMap::new().with("inputByIndex", "input:nth-of-type(#)"),
                None,
            );
            let element = node.locate_with("inputByIndex", Some("3")).await.unwrap();
            assert_eq!(element.describe(), "input:nth-of-type(3)");
        }
    }

    mod exists_tests {
        use super::*;

        #[tokio::test]
        async fn test_exists_true_and_false() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#username", MockElement::new());
            let node = login_node(&driver);
            let t = Duration::from_millis(1);

            assert!(node.exists("username", t, WaitState::Attached).await.unwrap());
            assert!(!node.exists("submit", t, WaitState::Attached).await.unwrap());
            assert!(node.exists("submit", t, WaitState::Detached).await.unwrap());
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_enabled() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#kc-login", MockElement::new());
            let node = login_node(&driver);
            node.click("submit").await.unwrap();
            assert_eq!(driver.count_calls("click:page:#kc-login"), 1);
        }

        #[tokio::test]
        async fn test_click_disabled_fails_without_clicking() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#kc-login", MockElement::new().disabled());
            let node = login_node(&driver);
            let err = node.click("submit").await.unwrap_err();
            assert!(matches!(err, NotifierError::ElementDisabled { .. }));
            assert!(!driver.was_called("click:"));
        }

        #[tokio::test]
        async fn test_read_text_optional_absent_is_empty() {
            let driver = Arc::new(MockDriver::new());
            let node = login_node(&driver);
            assert_eq!(node.read_text("label", false).await.unwrap(), "");
            assert!(node.read_text("label", true).await.is_err());
        }

        #[tokio::test]
        async fn test_read_text_trims() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#numeroMensajes", MockElement::text("\n 3 \t"));
            let node = login_node(&driver);
            assert_eq!(node.read_text("label", false).await.unwrap(), "3");
        }

        #[tokio::test]
        async fn test_type_text_clear_and_append() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#username", MockElement::new());
            let node = login_node(&driver);

            node.type_text("username", "ali", true).await.unwrap();
            node.type_text("username", "ce", false).await.unwrap();
            assert_eq!(node.value("username").await.unwrap(), "alice");

            node.type_text("username", "bob", true).await.unwrap();
            assert_eq!(node.value("username").await.unwrap(), "bob");
        }

        #[tokio::test]
        async fn test_wait_until_gone() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "#username", MockElement::new());
            let node = login_node(&driver);
            let field = node.locate("username").await.unwrap();

            assert!(node.wait_until_gone(&field).await.is_err());
            driver.with_dom(|dom| dom.remove("page", "#username"));
            assert!(node.wait_until_gone(&field).await.is_ok());
        }

        #[tokio::test]
        async fn test_root_element_defaults_to_body() {
            let driver = Arc::new(MockDriver::new());
            driver.add_element("page", "body", MockElement::new());
            let node = login_node(&driver);
            assert_eq!(node.root_element().await.unwrap().describe(), "body");
        }

        #[tokio::test]
        async fn test_dialog_policies() {
            let driver = Arc::new(MockDriver::new());
            let node = login_node(&driver);
            node.dismiss_dialogs().await.unwrap();
            assert_eq!(
                driver.with_dom(|dom| dom.dialog_policy()),
                Some(DialogAction::Dismiss)
            );
            node.accept_dialogs().await.unwrap();
            assert_eq!(
                driver.with_dom(|dom| dom.dialog_policy()),
                Some(DialogAction::Accept)
            );
        }
    }
}
