//! Catalog module: the track value type and the directory scanner that
//! produces enriched tracks for the player.
//!
//! Tracks leave this module fully enriched (band, album, genre, year); the
//! player never fetches or validates those fields itself.

mod album;
mod display;
mod model;
mod scan;

pub use album::*;
pub use display::display_from_fields;
pub use model::*;
pub use scan::scan;
