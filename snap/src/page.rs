//! The page interface the snapping engine works against.
//!
//! The document model lives elsewhere; snapping only needs to walk a
//! page's objects as a tree of groups and placed shapes, and to know which
//! of them participate in snapping for the current view.

use vellum_shape::math::{Point, Transform};
use vellum_shape::Shape;

/// One object of a page, as the snapping engine sees it: either a placed
/// shape or a group of objects under a common matrix.
#[derive(Clone, Debug)]
pub enum SnapNode {
    Group {
        matrix: Transform,
        children: Vec<SnapNode>,
    },
    Path {
        matrix: Transform,
        shape: Shape,
    },
}

impl SnapNode {
    /// Snap `mouse` to the vertices (or, with `ctl`, the control points)
    /// of every shape in this subtree; `outer` is the accumulated matrix
    /// of the enclosing groups.
    pub fn snap_vertex(
        &self,
        mouse: Point,
        outer: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        match self {
            SnapNode::Group { matrix, children } => {
                let m = matrix.then(outer);
                for child in children {
                    child.snap_vertex(mouse, &m, pos, bound, ctl);
                }
            }
            SnapNode::Path { matrix, shape } => {
                let m = matrix.then(outer);
                shape.snap_vertex(mouse, &m, pos, bound, ctl);
            }
        }
    }

    /// Snap `mouse` to the closest boundary point of every shape in this
    /// subtree.
    pub fn snap_boundary(&self, mouse: Point, outer: &Transform, pos: &mut Point, bound: &mut f64) {
        match self {
            SnapNode::Group { matrix, children } => {
                let m = matrix.then(outer);
                for child in children {
                    child.snap_boundary(mouse, &m, pos, bound);
                }
            }
            SnapNode::Path { matrix, shape } => {
                let m = matrix.then(outer);
                shape.snap_boundary(mouse, &m, pos, bound);
            }
        }
    }
}

/// Read access to the snappable content of a page.
///
/// Eligibility is the page's business: an object snaps in a view if its
/// layer is visible there and has snapping enabled. Layer lookup by name
/// exists for the dedicated custom-grid layer.
pub trait SnapPage {
    /// Number of objects on the page.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object `i`, in drawing order.
    fn object(&self, i: usize) -> &SnapNode;

    /// Does object `i` participate in snapping in `view`?
    fn snaps_in_view(&self, i: usize, view: usize) -> bool;

    /// Layer of object `i`.
    fn layer_of(&self, i: usize) -> usize;

    /// Look a layer up by name.
    fn find_layer(&self, name: &str) -> Option<usize>;
}

/// Snapping hook for the active tool, so a drawing in progress offers its
/// own vertices before it becomes an object.
pub trait ToolSnap {
    fn snap_vertex(&self, mouse: Point, pos: &mut Point, bound: &mut f64, ctl: bool);
}
