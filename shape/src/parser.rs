//! Parser for the persisted shape text.
//!
//! The format is a whitespace-separated stream of numbers and one-letter
//! operators; numbers accumulate until an operator consumes them. The
//! parser tracks the current open curve and the current point, so each
//! operator chains from where the previous one ended. See
//! [`crate::writer`] for the emitting side.

use log::debug;
use thiserror::Error;

use crate::curve::Curve;
use crate::math::{point, Point, Transform};
use crate::subpath::{ClosedSpline, Ellipse, SubPath};

/// Why a shape text failed to parse.
///
/// Parsing never panics on malformed input: these are data errors, and the
/// caller is expected to discard the result and keep the document usable.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("wrong number of arguments for operator `{0}`")]
    BadArity(char),
    #[error("operator `{0}` needs an open curve subpath")]
    NoOpenCurve(char),
    #[error("degenerate arc matrix")]
    SingularMatrix,
    #[error("misplaced `*` marker in spiro spline")]
    BadSpiroMarker,
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("curve subpath with no segments")]
    EmptyCurve,
}

fn take_point(args: &mut Vec<f64>) -> Point {
    let v = point(args[0], args[1]);
    args.drain(..2);
    v
}

fn take_matrix(args: &mut Vec<f64>) -> Transform {
    let m = Transform::new(args[0], args[1], args[2], args[3], args[4], args[5]);
    args.drain(..6);
    m
}

/// State of the subpath list under construction; finished subpaths move
/// into `done`, the open curve stays out until an operator ends it.
struct ShapeParser {
    done: Vec<SubPath>,
    cur: Option<Curve>,
    org: Point,
}

impl ShapeParser {
    fn new() -> ShapeParser {
        ShapeParser {
            done: Vec::new(),
            cur: None,
            org: point(0.0, 0.0),
        }
    }

    fn open(&mut self, op: char) -> Result<&mut Curve, ParseError> {
        self.cur.as_mut().ok_or(ParseError::NoOpenCurve(op))
    }

    /// End the open curve, if any. Mid-stream curves must have segments;
    /// only the trailing one may be empty (see [`finish`](Self::finish)).
    fn end_curve(&mut self) -> Result<(), ParseError> {
        if let Some(sp) = self.cur.take() {
            if sp.is_empty() {
                return Err(ParseError::EmptyCurve);
            }
            self.done.push(SubPath::Curve(sp));
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<SubPath> {
        // tolerate a single trailing `m` with nothing after it: writers
        // have historically produced it, and it denotes no geometry
        if let Some(sp) = self.cur.take() {
            if !sp.is_empty() {
                self.done.push(SubPath::Curve(sp));
            } else {
                debug!("dropping trailing empty curve subpath");
            }
        }
        self.done
    }
}

/// Parse shape text into subpaths. `Shape::parse` is the public entry
/// point.
pub(crate) fn parse_subpaths(data: &str) -> Result<Vec<SubPath>, ParseError> {
    match parse_inner(data) {
        Ok(subpaths) => Ok(subpaths),
        Err(err) => {
            debug!("shape text rejected: {}", err);
            Err(err)
        }
    }
}

fn parse_inner(data: &str) -> Result<Vec<SubPath>, ParseError> {
    let mut p = ShapeParser::new();
    let mut args: Vec<f64> = Vec::new();
    // position in `args` of the last `*` marker
    let mut mark: Option<usize> = None;

    for token in data.split_whitespace() {
        match token {
            "h" => {
                let sp = p.open('h')?;
                if sp.is_empty() {
                    return Err(ParseError::EmptyCurve);
                }
                sp.set_closed(true);
                p.end_curve()?;
                mark = None;
            }
            "m" => {
                if args.len() != 2 {
                    return Err(ParseError::BadArity('m'));
                }
                p.end_curve()?;
                p.org = take_point(&mut args);
                p.cur = Some(Curve::new());
                mark = None;
            }
            "l" => {
                if args.is_empty() || args.len() % 2 != 0 {
                    return Err(ParseError::BadArity('l'));
                }
                let mut org = p.org;
                let sp = p.open('l')?;
                while !args.is_empty() {
                    let v = take_point(&mut args);
                    sp.append_segment(org, v);
                    org = v;
                }
                p.org = org;
                mark = None;
            }
            "a" => {
                if args.len() != 8 {
                    return Err(ParseError::BadArity('a'));
                }
                let m = take_matrix(&mut args);
                if m.determinant() == 0.0 {
                    // a zero-radius arc has no usable geometry
                    return Err(ParseError::SingularMatrix);
                }
                let v1 = take_point(&mut args);
                let org = p.org;
                p.open('a')?.append_arc(m, org, v1);
                p.org = v1;
                mark = None;
            }
            "s" | "q" | "c" | "C" | "L" => {
                let op = token.chars().next().unwrap();
                // cardinal splines carry a trailing tension argument
                let parity = if op == 'C' { 1 } else { 0 };
                if args.len() < 2 || args.len() % 2 != parity {
                    return Err(ParseError::BadArity(op));
                }
                let mut v = vec![p.org];
                while args.len() >= 2 {
                    v.push(take_point(&mut args));
                }
                let sp = p.open(op)?;
                match op {
                    's' => sp.append_old_spline(&v),
                    'C' => {
                        let tension = args.pop().unwrap();
                        sp.append_cardinal_spline(&v, tension);
                    }
                    'L' => match mark {
                        Some(at) => {
                            if at % 2 != 0 {
                                return Err(ParseError::BadSpiroMarker);
                            }
                            let pts = at / 2;
                            if pts < 2 || pts % 3 != 2 {
                                return Err(ParseError::BadSpiroMarker);
                            }
                            sp.append_spiro_spline_precomputed(&v, pts + 1);
                        }
                        None => sp.append_spiro_spline(&v),
                    },
                    // `q` is a historic synonym for `c`
                    _ => sp.append_spline(&v),
                }
                p.org = *v.last().unwrap();
                mark = None;
            }
            "e" => {
                if args.len() != 6 {
                    return Err(ParseError::BadArity('e'));
                }
                p.end_curve()?;
                p.done.push(SubPath::Ellipse(Ellipse::new(take_matrix(&mut args))));
                mark = None;
            }
            "u" => {
                if args.len() < 6 || args.len() % 2 != 0 {
                    return Err(ParseError::BadArity('u'));
                }
                p.end_curve()?;
                let mut v = Vec::with_capacity(args.len() / 2);
                while !args.is_empty() {
                    v.push(take_point(&mut args));
                }
                p.done.push(SubPath::ClosedSpline(ClosedSpline::new(v)));
                mark = None;
            }
            "*" => {
                mark = Some(args.len());
            }
            _ => match token.parse::<f64>() {
                Ok(num) => args.push(num),
                Err(_) => return Err(ParseError::BadNumber(token.to_string())),
            },
        }
    }
    Ok(p.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::SegmentKind;
    use crate::shape::Shape;

    #[test]
    fn closed_triangle() {
        let s = Shape::parse("0 0 m 10 0 l 10 10 l h").unwrap();
        assert_eq!(s.count_subpaths(), 1);
        let c = s.subpath(0).as_curve().unwrap();
        assert!(c.closed());
        assert_eq!(c.count_segments_closing(), 3);
        assert_eq!(c.count_segments(), 2);
        assert_eq!(c.closing_segment().last(), point(0.0, 0.0));
    }

    #[test]
    fn chained_line_coordinates() {
        let s = Shape::parse("0 0 m 10 0 10 10 0 10 l").unwrap();
        let c = s.subpath(0).as_curve().unwrap();
        assert!(!c.closed());
        assert_eq!(c.count_segments(), 3);
    }

    #[test]
    fn missing_coordinate_fails() {
        assert_eq!(Shape::parse("0 0 m 10 l").unwrap_err(), ParseError::BadArity('l'));
    }

    #[test]
    fn operator_without_curve_fails() {
        assert_eq!(Shape::parse("1 1 l").unwrap_err(), ParseError::NoOpenCurve('l'));
        assert_eq!(Shape::parse("h").unwrap_err(), ParseError::NoOpenCurve('h'));
    }

    #[test]
    fn singular_arc_matrix_fails() {
        assert_eq!(Shape::parse("0 0 m 1 0 0 0 0 0 5 5 a").unwrap_err(), ParseError::SingularMatrix);
    }

    #[test]
    fn arc_parses() {
        let s = Shape::parse("5 0 m 5 0 0 5 0 0 0 5 a").unwrap();
        let c = s.subpath(0).as_curve().unwrap();
        assert_eq!(c.segment(0).kind(), SegmentKind::Arc);
        let arc = c.segment(0).arc();
        assert!((arc.begin() - point(5.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn spline_kinds() {
        let s = Shape::parse("0 0 m 4 4 8 0 c").unwrap();
        assert_eq!(
            s.subpath(0).as_curve().unwrap().segment(0).kind(),
            SegmentKind::Spline
        );
        let s = Shape::parse("0 0 m 4 4 8 0 q").unwrap();
        assert_eq!(
            s.subpath(0).as_curve().unwrap().segment(0).kind(),
            SegmentKind::Spline
        );
        let s = Shape::parse("0 0 m 4 4 8 0 s").unwrap();
        assert_eq!(
            s.subpath(0).as_curve().unwrap().segment(0).kind(),
            SegmentKind::OldSpline
        );
        let s = Shape::parse("0 0 m 4 4 8 0 0.5 C").unwrap();
        let c = s.subpath(0);
        let seg = c.as_curve().unwrap().segment(0);
        assert_eq!(seg.kind(), SegmentKind::CardinalSpline);
        assert_eq!(seg.tension(), 0.5);
    }

    #[test]
    fn cardinal_without_tension_fails() {
        assert_eq!(Shape::parse("0 0 m 4 4 8 0 C").unwrap_err(), ParseError::BadArity('C'));
    }

    #[test]
    fn ellipse_and_closed_spline() {
        let s = Shape::parse("5 0 0 5 1 2 e").unwrap();
        assert!(s.subpath(0).as_ellipse().is_some());
        let s = Shape::parse("0 0 12 0 12 12 0 12 u").unwrap();
        assert_eq!(s.subpath(0).as_closed_spline().unwrap().cps.len(), 4);
        assert_eq!(Shape::parse("0 0 12 0 u").unwrap_err(), ParseError::BadArity('u'));
    }

    #[test]
    fn precomputed_spiro_marker() {
        // two control points, one Bezier piece: the marker splits two
        // precomputed points from the spiro originals
        let text = "0 0 m 10 10 20 0 * 30 10 40 0 L";
        let s = Shape::parse(text).unwrap();
        let c = s.subpath(0).as_curve().unwrap();
        let seg = c.segment(0);
        assert_eq!(seg.kind(), SegmentKind::SpiroSpline);
        // originals: the current point plus the two after the marker
        assert_eq!(seg.count_cps(), 3);
        assert_eq!(seg.last(), point(40.0, 0.0));
        let mut bez = Vec::new();
        seg.beziers(&mut bez);
        assert_eq!(bez.len(), 1);
        assert_eq!(bez[0].from, point(0.0, 0.0));
        assert_eq!(bez[0].ctrl1, point(10.0, 10.0));
        assert_eq!(bez[0].ctrl2, point(20.0, 0.0));
        assert_eq!(bez[0].to, point(40.0, 0.0));
    }

    #[test]
    fn misplaced_spiro_marker_fails() {
        // only one point before the marker
        assert_eq!(Shape::parse("0 0 m 10 10 * 30 10 40 0 L").unwrap_err(), ParseError::BadSpiroMarker);
    }

    #[test]
    fn plain_spiro_falls_back() {
        let s = Shape::parse("0 0 m 10 10 20 0 30 10 L").unwrap();
        let seg_count = s.subpath(0).as_curve().unwrap().count_segments();
        assert_eq!(seg_count, 1);
    }

    #[test]
    fn trailing_empty_move_is_dropped() {
        let s = Shape::parse("0 0 m 10 0 l 5 5 m").unwrap();
        assert_eq!(s.count_subpaths(), 1);
        // but only in trailing position
        assert_eq!(Shape::parse("5 5 m 0 0 m 1 1 l").unwrap_err(), ParseError::EmptyCurve);
        // closing an empty curve is not tolerated either
        assert_eq!(Shape::parse("5 5 m h").unwrap_err(), ParseError::EmptyCurve);
    }

    #[test]
    fn garbage_tokens_fail() {
        let err = Shape::parse("0 0 m 1 bogus l").unwrap_err();
        assert_eq!(err, ParseError::BadNumber("bogus".to_string()));
    }

    #[test]
    fn empty_text_is_empty_shape() {
        let s = Shape::parse("").unwrap();
        assert_eq!(s.count_subpaths(), 0);
    }
}
