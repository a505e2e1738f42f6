//! Frame resolution: which document a node's lookups must query.
//!
//! ```text
//! no parent,  no frame   → top-level page
//! no parent,  frame      → frame found in the top-level page
//! parent,     frame      → frame found in the parent's document
//! parent,     no frame   → the parent's document, same handle
//! ```
//!
//! Resolution recurses up the parent chain and is memoized per node, so
//! sibling subtrees under a shared ancestor query that ancestor's frame once.

use futures::future::BoxFuture;
use tracing::debug;

use crate::driver::{ElementRef, FrameHandle, Scope, WaitState};
use crate::node::LocatorNode;
use crate::result::{NotifierError, NotifierResult};
use crate::selector::FRAME;

impl LocatorNode {
    /// Resolve (once) and return the node's frame; `None` means the
    /// top-level page.
    ///
    /// # Errors
    ///
    /// [`NotifierError::FrameResolutionTimeout`] if a frame-hosting element
    /// on the chain never appears.
    pub fn resolve_frame(&self) -> BoxFuture<'_, NotifierResult<Option<FrameHandle>>> {
        Box::pin(async move {
            self.frame
                .get_or_try_init(|| self.compute_frame())
                .await
                .cloned()
        })
    }

    /// Document context for this node's lookups
    ///
    /// # Errors
    ///
    /// Propagates frame resolution failures.
    pub async fn scope(&self) -> NotifierResult<Scope> {
        Ok(Scope::from(self.resolve_frame().await?))
    }

    async fn compute_frame(&self) -> NotifierResult<Option<FrameHandle>> {
        let declares_frame = self.registry.has_frame();
        match self.parent()? {
            None if declares_frame => self.frame_in(Scope::Page).await.map(Some),
            None => Ok(None),
            Some(parent) => {
                let parent_frame = parent.resolve_frame().await?;
                if declares_frame {
                    self.frame_in(Scope::from(parent_frame)).await.map(Some)
                } else {
                    debug!(node = %self.name, parent = %parent.name, "sharing parent frame");
                    Ok(parent_frame)
                }
            }
        }
    }

    async fn frame_in(&self, scope: Scope) -> NotifierResult<FrameHandle> {
        let selector = self.registry.get_selector(FRAME)?.to_string();
        debug!(node = %self.name, %selector, within = %scope.key(), "resolving frame");

        let host = ElementRef::new(scope, selector.clone());
        self.driver
            .wait_for(&host, WaitState::Attached, self.timeouts.element)
            .await
            .map_err(|err| match err {
                NotifierError::ElementWaitTimeout { ms, .. } => {
                    NotifierError::FrameResolutionTimeout {
                        node: self.name.clone(),
                        selector: selector.clone(),
                        ms,
                    }
                }
                other => other,
            })?;
        self.driver.content_frame(&host).await
    }
}
