//! The rendering seam.
//!
//! Shapes do not render themselves; they replay their geometry into a
//! [`Painter`] supplied by the rendering backend. The painter owns the
//! current transformation and path state.

use crate::arc::EllipticArc;
use crate::math::{Bezier, Point};

/// Receiver for the drawing commands a shape consists of.
pub trait Painter {
    /// Start a new subpath at `p`.
    fn move_to(&mut self, p: Point);
    /// Straight segment from the current position.
    fn line_to(&mut self, p: Point);
    /// Cubic Bezier from the current position; `b.from` is the current
    /// position.
    fn curve_to(&mut self, b: Bezier);
    /// Elliptic arc from the current position; the arc begins at the
    /// current position.
    fn draw_arc(&mut self, arc: &EllipticArc);
    /// Close the current subpath with a straight segment.
    fn close_path(&mut self);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Records draw commands for assertions.
    #[derive(Debug, PartialEq)]
    pub enum Command {
        MoveTo(Point),
        LineTo(Point),
        CurveTo(Bezier),
        Arc(EllipticArc),
        Close,
    }

    #[derive(Default)]
    pub struct RecordingPainter {
        pub commands: Vec<Command>,
    }

    impl Painter for RecordingPainter {
        fn move_to(&mut self, p: Point) {
            self.commands.push(Command::MoveTo(p));
        }

        fn line_to(&mut self, p: Point) {
            self.commands.push(Command::LineTo(p));
        }

        fn curve_to(&mut self, b: Bezier) {
            self.commands.push(Command::CurveTo(b));
        }

        fn draw_arc(&mut self, arc: &EllipticArc) {
            self.commands.push(Command::Arc(*arc));
        }

        fn close_path(&mut self) {
            self.commands.push(Command::Close);
        }
    }
}
