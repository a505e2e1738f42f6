//! Applications panel shown right after login.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::driver::{ElementRef, PortalDriver};
use crate::node::{LocatorNode, LocatorTimeouts};
use crate::result::NotifierResult;
use crate::selector::SelectorMap;

/// Applications reachable from the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Application {
    /// "Seguimiento Educativo": messages, grades, attendance
    SeguimientoEducativo,
    /// "Secretaría Virtual"
    SecretariaVirtual,
    /// "Banco de Libros"
    BancoDeLibros,
    /// "Evaluación Interna"
    EvaluacionInterna,
}

impl Application {
    /// Every application, in panel order
    pub const ALL: [Self; 4] = [
        Self::SeguimientoEducativo,
        Self::SecretariaVirtual,
        Self::BancoDeLibros,
        Self::EvaluacionInterna,
    ];

    /// Selector name of the application's access button
    #[must_use]
    pub const fn button_name(self) -> &'static str {
        match self {
            Self::SeguimientoEducativo => "seguimientoEducativoAccessButton",
            Self::SecretariaVirtual => "secretariaVirtualAccessButton",
            Self::BancoDeLibros => "bancoDeLibrosAccessButton",
            Self::EvaluacionInterna => "evaluacionInternaAccessButton",
        }
    }

    /// CSS class the portal puts on the application tile
    #[must_use]
    pub const fn tile_class(self) -> &'static str {
        match self {
            Self::SeguimientoEducativo => "SEGUIMIENTO_EDUCATIVO",
            Self::SecretariaVirtual => "SECRETARIA_VIRTUAL",
            Self::BancoDeLibros => "LIBROS",
            Self::EvaluacionInterna => "EICE",
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SeguimientoEducativo => "Seguimiento Educativo",
            Self::SecretariaVirtual => "Secretaría Virtual",
            Self::BancoDeLibros => "Banco de Libros",
            Self::EvaluacionInterna => "Evaluación Interna",
        };
        write!(f, "{label}")
    }
}

/// Panel page object
#[derive(Debug, Clone)]
pub struct ApplicationsPanel {
    node: Arc<LocatorNode>,
}

impl ApplicationsPanel {
    /// Default selectors: one access button per application tile
    #[must_use]
    pub fn defaults() -> SelectorMap {
        Application::ALL
            .iter()
            .fold(SelectorMap::new(), |map, app| {
                map.with(
                    app.button_name(),
                    format!("div:has(>*>*>.{}) button", app.tile_class()),
                )
            })
    }

    /// Panel on the top-level page
    #[must_use]
    pub fn new(
        driver: Arc<dyn PortalDriver>,
        timeouts: LocatorTimeouts,
        overrides: Option<&SelectorMap>,
    ) -> Self {
        Self {
            node: LocatorNode::root(
                "applications",
                driver,
                timeouts,
                Self::defaults(),
                overrides,
            ),
        }
    }

    /// Underlying node
    #[must_use]
    pub fn node(&self) -> &Arc<LocatorNode> {
        &self.node
    }

    /// Access button of `app`
    ///
    /// # Errors
    ///
    /// Lookup failures.
    pub async fn access_button(&self, app: Application) -> NotifierResult<ElementRef> {
        self.node.locate(app.button_name()).await
    }

    /// Click the access button of `app`
    ///
    /// # Errors
    ///
    /// Lookup failures or a disabled button.
    pub async fn click_access_button(&self, app: Application) -> NotifierResult<()> {
        self.node.click(app.button_name()).await
    }

    /// Open `app` and wait for the panel to be replaced by it
    ///
    /// # Errors
    ///
    /// [`crate::NotifierError::ElementWaitTimeout`] if the button never goes away.
    pub async fn open(&self, app: Application) -> NotifierResult<()> {
        let button = self.access_button(app).await?;
        self.node.click_element(&button).await?;
        self.node.wait_until_gone(&button).await?;
        info!(application = %app, "application opened");
        Ok(())
    }
}
