//! One row of the message list.
//!
//! Rows are addressed by position: `tr:nth-of-type(index + 2)` inside the
//! message table (1-based, plus the header row). The position is baked into
//! the row's root selector at construction, so a row node always points at
//! the same slot; re-reading the list after it shifted means building a new
//! row.

use std::sync::Arc;

use crate::driver::ElementRef;
use crate::message::{is_affirmative, is_removal_marker, normalize_sender};
use crate::node::LocatorNode;
use crate::result::NotifierResult;
use crate::selector::{substitute, SelectorMap, DEFAULT_PLACEHOLDER, ROOT};

/// Row page object
#[derive(Debug, Clone)]
pub struct MessageRow {
    node: Arc<LocatorNode>,
    index: usize,
}

impl MessageRow {
    /// Default selectors; the root still carries the position placeholder
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new()
            .with(
                ROOT,
                "table[class='TableData']:has(img[src*='ico_sobre']) tr:nth-of-type(#)",
            )
            .with("envelope", "td:nth-of-type(1)")
            .with("clip", "td:nth-of-type(2)")
            .with("checkbox", "td:nth-of-type(3)")
            .with("date", "td:nth-of-type(4)")
            .with("from", "td:nth-of-type(5)")
            .with("subject", "td:nth-of-type(6)")
            .with("isResponse", "td:nth-of-type(7)")
            .with("group", "td:nth-of-type(8)")
            .with("centre", "td:nth-of-type(9)")
            .with("openEnvelope", "img[src*='abierto']")
            .with("clipImage", "img[src*='attach']")
            .with("checkboxInput", "td:nth-of-type(3) input")
    }

    /// Table position of the `index`-th message
    #[must_use]
    pub const fn position(index: usize) -> usize {
        index + 2
    }

    /// Row `index` nested under the body frame node `parent`
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, index: usize, overrides: Option<&SelectorMap>) -> Self {
        let mut selectors = match overrides {
            Some(overrides) => Self::defaults().overlay(overrides),
            None => Self::defaults(),
        };
        if let Some(root) = selectors.get(ROOT) {
            let position = Self::position(index).to_string();
            let root = substitute(root, Some(&position), DEFAULT_PLACEHOLDER);
            selectors.set(ROOT, root);
        }
        Self {
            node: LocatorNode::child(parent, format!("row[{index}]"), selectors, None),
            index,
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// Zero-based list index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The whole row
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn root(&self) -> NotifierResult<ElementRef> {
        self.node.root_element().await
    }

    /// Envelope cell
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn envelope(&self) -> NotifierResult<ElementRef> {
        self.node.locate("envelope").await
    }

    /// Attachment (clip) cell
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn clip(&self) -> NotifierResult<ElementRef> {
        self.node.locate("clip").await
    }

    /// Selection checkbox
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn checkbox_input(&self) -> NotifierResult<ElementRef> {
        self.node.locate("checkboxInput").await
    }

    /// Reception date
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn date(&self) -> NotifierResult<String> {
        self.node.read_text("date", true).await
    }

    /// Sender, "Last, First" turned into "First Last"
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn sender(&self) -> NotifierResult<String> {
        Ok(normalize_sender(&self.node.read_text("from", true).await?))
    }

    /// Subject
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn subject(&self) -> NotifierResult<String> {
        self.node.read_text("subject", true).await
    }

    /// Whether the message is a reply ("Sí" in the response column)
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn is_response(&self) -> NotifierResult<bool> {
        Ok(is_affirmative(&self.node.read_text("isResponse", true).await?))
    }

    /// Class group
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn group(&self) -> NotifierResult<String> {
        self.node.read_text("group", true).await
    }

    /// School centre
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn centre(&self) -> NotifierResult<String> {
        self.node.read_text("centre", true).await
    }

    /// Whether the envelope icon shows the message as already opened
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn is_message_open(&self) -> NotifierResult<bool> {
        self.has_marker("envelope", "openEnvelope").await
    }

    /// Whether the clip icon is shown
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn has_attachments(&self) -> NotifierResult<bool> {
        self.has_marker("clip", "clipImage").await
    }

    /// Whether the subject announces a message removed by its sender
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn is_removed(&self) -> NotifierResult<bool> {
        Ok(is_removal_marker(&self.subject().await?))
    }

    /// Checked state of the selection checkbox
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn checkbox_value(&self) -> NotifierResult<bool> {
        self.node.is_checked("checkboxInput").await
    }

    /// Tick (or untick) the selection checkbox
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn click_checkbox(&self) -> NotifierResult<()> {
        self.node.click("checkboxInput").await
    }

    /// Open the message
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn click_subject(&self) -> NotifierResult<()> {
        self.node.click("subject").await
    }

    /// Presence of a marker image inside a cell
    async fn has_marker(&self, cell: &str, marker: &str) -> NotifierResult<bool> {
        let cell = self.node.locate(cell).await?;
        let marker = cell.descendant(self.node.selector(marker)?);
        Ok(self.node.driver().count(&marker).await? > 0)
    }
}
