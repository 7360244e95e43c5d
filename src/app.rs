//! Application module: routes and the browsing model used by the TUI and
//! runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, the current
//! route with its back stack, the list selection and filter, and popups.
//! Playback state is not kept here; it belongs to the player service.

mod model;
mod route;

pub use model::*;
pub use route::Route;
