//! Keycloak login form in front of the portal.

use std::sync::Arc;

use tracing::info;

use crate::driver::{ElementRef, PortalDriver};
use crate::node::{LocatorNode, LocatorTimeouts};
use crate::result::{NotifierError, NotifierResult};
use crate::selector::SelectorMap;

/// Login form page object
#[derive(Debug, Clone)]
pub struct LoginPage {
    node: Arc<LocatorNode>,
}

impl LoginPage {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new()
            .with("username", "#username")
            .with("password", "#password")
            .with("submitButton", "#kc-login")
    }

    /// Login form on the top-level page
    #[must_use]
    pub fn new(
        driver: Arc<dyn PortalDriver>,
        timeouts: LocatorTimeouts,
        overrides: Option<&SelectorMap>,
    ) -> Self {
        Self {
            node: LocatorNode::root("login", driver, timeouts, Self::defaults(), overrides),
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// Open the login page
    ///
    /// # Errors
    ///
    /// [`NotifierError::Navigation`] if the page cannot be loaded.
    pub async fn navigate(&self, url: &str) -> NotifierResult<()> {
        self.node.navigate(url).await
    }

    /// Username field
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn username(&self) -> NotifierResult<ElementRef> {
        self.node.locate("username").await
    }

    /// Password field
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn password(&self) -> NotifierResult<ElementRef> {
        self.node.locate("password").await
    }

    /// Submit button
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn submit_button(&self) -> NotifierResult<ElementRef> {
        self.node.locate("submitButton").await
    }

    /// Type the username
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn set_username(&self, username: &str) -> NotifierResult<()> {
        self.node.type_text("username", username, true).await
    }

    /// Type the password
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn set_password(&self, password: &str) -> NotifierResult<()> {
        self.node.type_text("password", password, true).await
    }

    /// Press the submit button
    ///
    /// # Errors
    ///
    /// Lookup failures or a disabled button.
    pub async fn click_submit(&self) -> NotifierResult<()> {
        self.node.click("submitButton").await
    }

    /// Submit the credentials and wait for the form to go away.
    ///
    /// # Errors
    ///
    /// [`NotifierError::LoginRejected`] if the username field is still there
    /// once the element budget runs out.
    pub async fn do_login(&self, username: &str, password: &str) -> NotifierResult<()> {
        let username_field = self.username().await?;
        self.set_username(username).await?;
        self.set_password(password).await?;
        self.click_submit().await?;

        self.node
            .wait_until_gone(&username_field)
            .await
            .map_err(|err| match err {
                NotifierError::ElementWaitTimeout { .. } => NotifierError::LoginRejected,
                other => other,
            })?;
        info!("login form accepted");
        Ok(())
    }
}
