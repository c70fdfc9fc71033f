//! The browser half of the application, without the browser.
//!
//! Pages load records from the backend’s HTTP surface, render them
//! through dioxus views and turn user actions back into HTTP calls. The
//! hosting environment (actual DOM, dialogs, location hash) sits behind
//! the [`Shell`] trait and the transport behind [`Backend`], so the whole
//! lifecycle runs and is tested natively.

pub mod backend;
pub mod client;
pub mod edit;
pub mod error;
pub mod list;
pub mod router;
pub mod screens;
pub mod shell;
pub mod views;

pub use backend::{Backend, HttpBackend, Method};
pub use client::{Entry, ResourceClient};
pub use edit::EditPage;
pub use error::{PageError, TransportError};
pub use list::{ListEntry, ListPage};
pub use router::{Entity, Navigation, Page, Route, Router, RouterState};
pub use screens::Screen;
pub use shell::Shell;

/// The lifecycle of a single page instance. A page is discarded by
/// whoever navigates away from it; there is no teardown state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Ready,
}
