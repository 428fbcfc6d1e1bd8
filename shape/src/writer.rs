//! Emits the persisted shape text; the syntactic inverse of
//! [`crate::parser`].
//!
//! Emission is token-exact: one control point or operator per line, and a
//! fixed-precision decimal form for coordinates so that parse/save cycles
//! are drift-free after the first pass.

use std::fmt::{self, Write};

use crate::curve::{Curve, SegData};
use crate::math::{Point, Transform};
use crate::subpath::{ClosedSpline, Ellipse, SubPath};

/// Write a coordinate with at most six significant decimal digits,
/// suppressing trailing zeros.
///
/// Magnitudes below 1e-8 collapse to `0`; magnitudes of 1e9 and above are
/// out of contract for document coordinates and fall back to the shortest
/// float form.
pub fn write_scalar<W: Write>(w: &mut W, d: f64) -> fmt::Result {
    let mut d = d;
    if d < 0.0 {
        w.write_char('-')?;
        d = -d;
    }
    if d >= 1e9 {
        write!(w, "{}", d)
    } else if d < 1e-8 {
        w.write_char('0')
    } else {
        let factor: i64 = if d > 1000.0 {
            100
        } else if d > 100.0 {
            1_000
        } else if d > 10.0 {
            10_000
        } else if d > 1.0 {
            100_000
        } else if d > 0.1 {
            1_000_000
        } else if d > 0.01 {
            10_000_000
        } else {
            100_000_000
        };
        let dd = d.trunc();
        let mut intpart = dd as i64;
        let mut v = (factor as f64 * (d - dd) + 0.5) as i64;
        if v >= factor {
            intpart += 1;
            v -= factor;
        }
        write!(w, "{}", intpart)?;
        if v != 0 {
            let mask = factor / 10;
            w.write_char('.')?;
            while v != 0 {
                w.write_char((b'0' + (v / mask) as u8) as char)?;
                v = (10 * v) % factor;
            }
        }
        Ok(())
    }
}

pub fn write_point<W: Write>(w: &mut W, p: Point) -> fmt::Result {
    write_scalar(w, p.x)?;
    w.write_char(' ')?;
    write_scalar(w, p.y)
}

pub fn write_matrix<W: Write>(w: &mut W, m: &Transform) -> fmt::Result {
    for (i, a) in [m.m11, m.m12, m.m21, m.m22, m.m31, m.m32].iter().enumerate() {
        if i > 0 {
            w.write_char(' ')?;
        }
        write_scalar(w, *a)?;
    }
    Ok(())
}

pub(crate) fn save_subpath<W: Write>(sp: &SubPath, w: &mut W) -> fmt::Result {
    match sp {
        SubPath::Ellipse(e) => save_ellipse(e, w),
        SubPath::ClosedSpline(s) => save_closed_spline(s, w),
        SubPath::Curve(c) => save_curve(c, w),
    }
}

fn save_ellipse<W: Write>(e: &Ellipse, w: &mut W) -> fmt::Result {
    write_matrix(w, &e.matrix)?;
    w.write_str(" e\n")
}

fn save_closed_spline<W: Write>(s: &ClosedSpline, w: &mut W) -> fmt::Result {
    for p in &s.cps[..s.cps.len() - 1] {
        write_point(w, *p)?;
        w.write_char('\n')?;
    }
    write_point(w, *s.cps.last().unwrap())?;
    w.write_str(" u\n")
}

fn save_curve<W: Write>(c: &Curve, w: &mut W) -> fmt::Result {
    write_point(w, c.cps[0])?;
    w.write_str(" m\n")?;
    let mut vtx = 1; // next control point to emit
    let mut mat = 0;
    // the synthetic closing segment is implied by `h`
    let fin = if c.closed { c.segs.len() - 1 } else { c.segs.len() };
    for seg in &c.segs[..fin] {
        let last = seg.last as usize;
        match seg.data {
            SegData::Line => {
                debug_assert_eq!(vtx, last);
                write_point(w, c.cps[vtx])?;
                w.write_str(" l\n")?;
                vtx += 1;
            }
            SegData::Arc { matrix } => {
                debug_assert_eq!(mat, matrix as usize);
                write_matrix(w, &c.mats[mat])?;
                w.write_char(' ')?;
                write_point(w, c.cps[vtx])?;
                w.write_str(" a\n")?;
                mat += 1;
                vtx += 1;
            }
            SegData::OldSpline => {
                while vtx < last {
                    write_point(w, c.cps[vtx])?;
                    w.write_char('\n')?;
                    vtx += 1;
                }
                write_point(w, c.cps[vtx])?;
                w.write_str(" s\n")?;
                vtx += 1;
            }
            SegData::Spline => {
                while vtx < last {
                    write_point(w, c.cps[vtx])?;
                    w.write_char('\n')?;
                    vtx += 1;
                }
                write_point(w, c.cps[vtx])?;
                w.write_str(" c\n")?;
                vtx += 1;
            }
            SegData::Cardinal { tension } => {
                while vtx < last {
                    write_point(w, c.cps[vtx])?;
                    w.write_char('\n')?;
                    vtx += 1;
                }
                write_point(w, c.cps[vtx])?;
                w.write_char(' ')?;
                write_scalar(w, tension)?;
                w.write_str(" C\n")?;
                vtx += 1;
            }
            SegData::Spiro { split } => {
                let split = split as usize;
                while vtx < split - 1 {
                    write_point(w, c.cps[vtx])?;
                    w.write_char('\n')?;
                    vtx += 1;
                }
                write_point(w, c.cps[split - 1])?;
                w.write_str(" *\n")?;
                // skip the stored final target and origin, they repeat
                // points written elsewhere
                vtx = split + 2;
                while vtx < last {
                    write_point(w, c.cps[vtx])?;
                    w.write_char('\n')?;
                    vtx += 1;
                }
                write_point(w, c.cps[vtx])?;
                w.write_str(" L\n")?;
                vtx += 1;
            }
        }
    }
    if c.closed {
        w.write_str("h\n")?;
    }
    Ok(())
}
