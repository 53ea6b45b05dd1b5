//! Signature board core - grid placement, coordinate mapping and tiles
//!
//! This crate provides the pieces behind the board:
//! - [`grid::GridCoordinates`] - cell/pixel conversion and occupancy queries
//! - [`placement::PlacementPolicy`] - choosing the cell for a new signature
//! - [`surface`] - RGBA8 raster surface with the few drawing primitives we need
//! - [`render`] - deterministic tile and reference rendering
//! - [`tiles`] - encoded tile cache with region invalidation
//! - [`board::Board`] - the state object tying it all together

pub mod board;
pub mod constants;
pub mod error;
pub mod flip;
pub mod glyphs;
pub mod grid;
pub mod payload;
pub mod placement;
pub mod render;
pub mod surface;
pub mod tiles;
pub mod validation;

pub use board::*;
pub use constants::*;
pub use error::*;
pub use flip::*;
pub use grid::*;
pub use placement::*;
pub use render::*;
pub use surface::*;
pub use tiles::*;
pub use validation::*;
