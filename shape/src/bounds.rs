//! Empty-aware axis-aligned bounding boxes.
//!
//! Every distance and snapping query in this crate is pruned through
//! [`Bounds::certain_clearance`] before any fine-grained geometry runs, so
//! the accumulation semantics here (union with an empty identity) are part
//! of the query contract, not a convenience.

use crate::math::{point, Point, Rect, Vector};

/// An axis-parallel rectangle which can be empty.
///
/// The empty box is the identity for [`add_point`](Bounds::add_point) and
/// [`add_bounds`](Bounds::add_bounds).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// The empty box.
    pub fn new() -> Bounds {
        Bounds {
            min: point(1.0, 0.0),
            max: point(-1.0, 0.0),
        }
    }

    /// Smallest box containing `a` and `b`.
    pub fn of(a: Point, b: Point) -> Bounds {
        let mut r = Bounds::new();
        r.add_point(a);
        r.add_point(b);
        r
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Lower-left corner. Meaningless on an empty box.
    pub fn min(&self) -> Point {
        self.min
    }

    /// Upper-right corner. Meaningless on an empty box.
    pub fn max(&self) -> Point {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Enlarge to contain `p`.
    pub fn add_point(&mut self, p: Point) {
        if self.is_empty() {
            self.min = p;
            self.max = p;
        } else {
            if p.x > self.max.x {
                self.max.x = p.x;
            } else if p.x < self.min.x {
                self.min.x = p.x;
            }
            if p.y > self.max.y {
                self.max.y = p.y;
            } else if p.y < self.min.y {
                self.min.y = p.y;
            }
        }
    }

    /// Enlarge to contain `rhs`; an empty `rhs` changes nothing.
    pub fn add_bounds(&mut self, rhs: &Bounds) {
        if rhs.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *rhs;
        } else {
            if rhs.max.x > self.max.x {
                self.max.x = rhs.max.x;
            }
            if rhs.min.x < self.min.x {
                self.min.x = rhs.min.x;
            }
            if rhs.max.y > self.max.y {
                self.max.y = rhs.max.y;
            }
            if rhs.min.y < self.min.y {
                self.min.y = rhs.min.y;
            }
        }
    }

    /// Enlarge to contain a kernel rectangle.
    pub fn add_rect(&mut self, r: &Rect) {
        self.add_point(r.min());
        self.add_point(r.max());
    }

    /// Does the (closed) box contain `p`? An empty box contains nothing.
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    pub fn intersects(&self, rhs: &Bounds) -> bool {
        if self.is_empty() || rhs.is_empty() {
            return false;
        }
        self.min.x <= rhs.max.x
            && rhs.min.x <= self.max.x
            && self.min.y <= rhs.max.y
            && rhs.min.y <= self.max.y
    }

    /// Returns `true` only if the distance between the box and `v` is at
    /// least `bound`. May return `false` for larger distances; queries use
    /// this as a cheap rejection test before exact geometry.
    pub fn certain_clearance(&self, v: Point, bound: f64) -> bool {
        (self.min.x - v.x) >= bound
            || (v.x - self.max.x) >= bound
            || (self.min.y - v.y) >= bound
            || (v.y - self.max.y) >= bound
    }

    /// Grow by `amount` in every direction.
    pub fn inflate(&self, amount: f64) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds {
            min: self.min - Vector::new(amount, amount),
            max: self.max + Vector::new(amount, amount),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_union_identity() {
        let mut b = Bounds::new();
        assert!(b.is_empty());
        assert!(!b.contains(point(0.0, 0.0)));
        b.add_bounds(&Bounds::new());
        assert!(b.is_empty());
        b.add_point(point(2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min(), point(2.0, 3.0));
        assert_eq!(b.max(), point(2.0, 3.0));
    }

    #[test]
    fn accumulation() {
        let mut b = Bounds::of(point(0.0, 0.0), point(4.0, 1.0));
        b.add_point(point(-2.0, 5.0));
        assert_eq!(b.min(), point(-2.0, 0.0));
        assert_eq!(b.max(), point(4.0, 5.0));
        let mut c = Bounds::new();
        c.add_bounds(&b);
        assert_eq!(b, c);
    }

    #[test]
    fn clearance() {
        let b = Bounds::of(point(0.0, 0.0), point(10.0, 10.0));
        assert!(b.certain_clearance(point(25.0, 5.0), 10.0));
        assert!(!b.certain_clearance(point(12.0, 5.0), 10.0));
        // inside points are never cleared
        assert!(!b.certain_clearance(point(5.0, 5.0), 0.1));
    }
}
