//! Top navigation bar frame: unread counter and the "Mensajes" entry.

use std::sync::Arc;

use crate::driver::ElementRef;
use crate::node::LocatorNode;
use crate::result::NotifierResult;
use crate::selector::{SelectorMap, FRAME};

/// Navigation bar page object
#[derive(Debug, Clone)]
pub struct NavigationBar {
    node: Arc<LocatorNode>,
}

impl NavigationBar {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new()
            .with(FRAME, "[name='barraNavegacion']")
            .with("mensajesLink", "a:has(img[alt='Mensajes'])")
            .with("numeroMensajesLabel", "#numeroMensajes")
    }

    /// Navigation bar nested under `parent`
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, overrides: Option<&SelectorMap>) -> Self {
        Self {
            node: LocatorNode::child(parent, "barraNavegacion", Self::defaults(), overrides),
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// "Mensajes" link
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn messages_link(&self) -> NotifierResult<ElementRef> {
        self.node.locate("mensajesLink").await
    }

    /// Click "Mensajes", which reloads the message list from the top
    ///
    /// # Errors
    ///
    /// Lookup failures or a disabled link.
    pub async fn click_messages(&self) -> NotifierResult<()> {
        self.node.click("mensajesLink").await
    }

    /// Unread counter; an absent or non-numeric label reads as zero
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn unread_count(&self) -> NotifierResult<usize> {
        let label = self.node.read_text("numeroMensajesLabel", false).await?;
        Ok(parse_count(&label))
    }
}

/// Leading decimal digits of `text`, zero when there are none
fn parse_count(text: &str) -> usize {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}
