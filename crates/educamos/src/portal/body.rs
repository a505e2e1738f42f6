//! Body frame: the message list and, once a message is opened, its content.

use std::sync::Arc;

use tracing::debug;

use crate::driver::{ElementRef, WaitState};
use crate::node::LocatorNode;
use crate::portal::MessageRow;
use crate::result::NotifierResult;
use crate::selector::{SelectorMap, FRAME};

const TABLE: &str = "table[class='TableData']";

/// Body frame page object, `[name='cuerpo']`
#[derive(Debug, Clone)]
pub struct BodyFrame {
    node: Arc<LocatorNode>,
}

impl BodyFrame {
    /// Default selectors
    #[must_use]
    pub fn defaults() -> SelectorMap {
        SelectorMap::new()
            .with(FRAME, "[name='cuerpo']")
            .with("allInput", "input[value='TODOS']")
            .with("rightArrowImage", "img[src*='arrowRight']")
            .with("table", TABLE)
            .with("tableHeader", format!("{TABLE} tr:has([class*='cabecera'])"))
            .with("rows", format!("{TABLE} tr:has([class^='cuerpo'])"))
            .with("documents", "tr:has(>*>img[src*='txt-icon'])")
            .with("cells", "td")
            .with("input", "input")
            .with("downloadLink", "td:has(a) a")
            .with("messageTable", ".tablaFondoMenRec")
            .with(
                "conversation",
                format!("{TABLE} tr:has(td[onclick='javascript:showOpciones(1)'][align='LEFT'])"),
            )
    }

    /// Body frame nested under `parent`
    #[must_use]
    pub fn attach(parent: &Arc<LocatorNode>, overrides: Option<&SelectorMap>) -> Self {
        Self {
            node: LocatorNode::child(parent, "cuerpo", Self::defaults(), overrides),
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// "All" filter input
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn all_input(&self) -> NotifierResult<ElementRef> {
        self.node.locate("allInput").await
    }

    /// Next-page arrow
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn right_arrow_image(&self) -> NotifierResult<ElementRef> {
        self.node.locate("rightArrowImage").await
    }

    /// Message list table
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn table(&self) -> NotifierResult<ElementRef> {
        self.node.locate("table").await
    }

    /// Header row of the message list
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn table_header(&self) -> NotifierResult<ElementRef> {
        self.node.locate("tableHeader").await
    }

    /// Message rows, all matches
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn rows(&self) -> NotifierResult<ElementRef> {
        self.node.locate("rows").await
    }

    /// Attachment rows of an opened message, all matches
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn documents(&self) -> NotifierResult<ElementRef> {
        self.node.locate("documents").await
    }

    /// Content pane of an opened message
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn message_table(&self) -> NotifierResult<ElementRef> {
        self.node.locate("messageTable").await
    }

    /// Conversation thread rows
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn conversation(&self) -> NotifierResult<ElementRef> {
        self.node.locate("conversation").await
    }

    /// Click the first download link
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn click_download_link(&self) -> NotifierResult<()> {
        self.node.click("downloadLink").await
    }

    /// Row page object for the `index`-th message (0 = top of the list).
    ///
    /// The frame is resolved before the row is handed out.
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn message_row(&self, index: usize) -> NotifierResult<MessageRow> {
        let _ = self.node.resolve_frame().await?;
        let row = MessageRow::attach(&self.node, index, None);
        let _ = row.node().resolve_frame().await?;
        Ok(row)
    }

    /// Number of message rows currently listed
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn row_count(&self) -> NotifierResult<usize> {
        self.node.count("rows").await
    }

    /// Row page objects for every listed message
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn message_rows(&self) -> NotifierResult<Vec<MessageRow>> {
        let count = self.row_count().await?;
        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            rows.push(self.message_row(index).await?);
        }
        Ok(rows)
    }

    /// Whether the opened message lists attachment rows
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn is_document_present(&self) -> NotifierResult<bool> {
        self.node
            .exists("documents", self.node.timeouts().probe, WaitState::Attached)
            .await
    }

    /// Number of attachment rows in the opened message
    ///
    /// # Errors
    ///
    /// Frame resolution failures.
    pub async fn document_count(&self) -> NotifierResult<usize> {
        self.node.count("documents").await
    }

    /// Download link inside the `index`-th attachment row
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn document_link(&self, index: usize) -> NotifierResult<ElementRef> {
        let link = self
            .node
            .element("documents", None)
            .await?
            .nth(index)
            .descendant(self.node.selector("downloadLink")?);
        self.node.wait_attached(&link).await?;
        Ok(link)
    }

    /// Text of the opened message, once its content pane is rendered
    ///
    /// # Errors
    ///
    /// [`crate::NotifierError::ElementWaitTimeout`] if the pane never shows up.
    pub async fn message_text(&self) -> NotifierResult<String> {
        let pane = self.message_table().await?;
        let text = self.node.element_text(&pane).await?;
        debug!(chars = text.len(), "message body read");
        Ok(text)
    }
}
