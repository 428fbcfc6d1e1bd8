//! # Vellum snapping engine
//!
//! Resolves a pointer position to an exact coordinate against the shapes
//! of a page, at interactive rates.
//!
//! The engine does not own the document: it sees it through the
//! [`SnapPage`] trait and the [`SnapNode`] object tree, collects the
//! nearby geometric primitives of eligible objects, and then runs a
//! prioritized resolution: angular snapping first, then vertices, control
//! points, intersections, boundaries, and finally the grid. "No snap
//! occurred" is a normal result, never an error.

pub mod collect;
pub mod page;
pub mod snap;

pub use crate::collect::Collected;
pub use crate::page::{SnapNode, SnapPage, ToolSnap};
pub use crate::snap::{Modes, Snap, Snapped};
