//! Page objects for the Educamos legacy frameset portal.
//!
//! Each page object wraps one [`LocatorNode`](crate::LocatorNode) and owns
//! the page objects nested under it:
//!
//! ```text
//! LoginPage                     (top page)
//! ApplicationsPanel             (top page)
//! FollowUpPage                  (top page, "Seguimiento Educativo")
//! ├── NavigationBar             frame [name='barraNavegacion']
//! └── LowerFrame                frame [name='inferior']
//!     └── PrincipalFrame        frame [name='principal']
//!         ├── BodyFrame         frame [name='cuerpo']
//!         │   └── MessageRow*   built on demand, one per table row
//!         └── TitleToolbar      frame [name='botoneraTitulo']
//! ```
//!
//! Every constructor accepts optional selector overrides that are laid over
//! the page object's defaults.

mod applications;
mod body;
mod follow_up;
mod frames;
mod login;
mod message_row;
mod navigation;

#[cfg(test)]
pub(crate) mod testing;

pub use applications::{Application, ApplicationsPanel};
pub use body::BodyFrame;
pub use follow_up::FollowUpPage;
pub use frames::{LowerFrame, PrincipalFrame, TitleToolbar};
pub use login::LoginPage;
pub use message_row::MessageRow;
pub use navigation::NavigationBar;
