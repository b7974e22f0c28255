//! Zeros of the bilinear field inside a single cell.
//!
//! In local coordinates `s, t` in `[0, 1]` the interpolated field is
//!
//! ```text
//! f(s, t) = a00 + a10 s + a01 t + a11 s t
//! g(s, t) = b00 + b10 s + b01 t + b11 s t
//! ```
//!
//! Eliminating the `s t` term gives a line `c00 + c10 s + c01 t = 0`;
//! substituting it back into `f` leaves a quadratic in `s`.

use glam::DVec2;

use crate::geometry::{Bounds, Corner, Point2, Vector2};

/// Relative tolerance for treating a coefficient as zero.
const EPS: f64 = 1e-12;

/// Bilinear coefficients of one field component.
#[derive(Debug, Clone, Copy)]
struct Bilinear {
    c00: f64,
    c10: f64,
    c01: f64,
    c11: f64,
}

impl Bilinear {
    fn from_corners(v00: f64, v10: f64, v01: f64, v11: f64) -> Self {
        Self {
            c00: v00,
            c10: v10 - v00,
            c01: v01 - v00,
            c11: v00 - v10 - v01 + v11,
        }
    }

    fn magnitude(&self) -> f64 {
        self.c00
            .abs()
            .max(self.c10.abs())
            .max(self.c01.abs())
            .max(self.c11.abs())
    }

    /// Solves for `t` at a fixed `s`, if the component depends on `t` there.
    fn t_at(&self, s: f64, tol: f64) -> Option<f64> {
        let denom = self.c01 + self.c11 * s;
        (denom.abs() > tol).then(|| -(self.c00 + self.c10 * s) / denom)
    }
}

/// Location of a zero of the bilinear field strictly inside `bounds`.
///
/// `samples` are the corner field values indexed by [`Corner::index`]. Returns
/// `None` for a degenerate cell, a field without an isolated zero, or a zero
/// outside or on the border of the cell. When the quadratic has two interior
/// roots the one with the smaller `s` wins.
pub fn locate(bounds: Bounds, samples: [Vector2; 4]) -> Option<Point2> {
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return None;
    }
    let at = |c: Corner| samples[c.index()];
    let (v00, v10, v01, v11) = (
        at(Corner::X1Y1),
        at(Corner::X2Y1),
        at(Corner::X1Y2),
        at(Corner::X2Y2),
    );
    let f = Bilinear::from_corners(v00.x, v10.x, v01.x, v11.x);
    let g = Bilinear::from_corners(v00.y, v10.y, v01.y, v11.y);

    let scale = f.magnitude().max(g.magnitude());
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let tol1 = EPS * scale;
    let tol2 = tol1 * scale;
    let tol3 = tol2 * scale;

    let (s, t) = if f.c11.abs() <= tol1 && g.c11.abs() <= tol1 {
        solve_linear(&f, &g, tol2)?
    } else {
        solve_bilinear(&f, &g, tol1, tol2, tol3)?
    };

    let inside = |v: f64| v > 0.0 && v < 1.0;
    if !(inside(s) && inside(t)) {
        return None;
    }
    Some(DVec2::new(
        bounds.x1 + s * bounds.width(),
        bounds.y1 + t * bounds.height(),
    ))
}

/// Both components are affine: a 2x2 system.
fn solve_linear(f: &Bilinear, g: &Bilinear, tol: f64) -> Option<(f64, f64)> {
    let det = f.c10 * g.c01 - f.c01 * g.c10;
    if det.abs() <= tol {
        return None;
    }
    let s = (-f.c00 * g.c01 + f.c01 * g.c00) / det;
    let t = (-f.c10 * g.c00 + f.c00 * g.c10) / det;
    Some((s, t))
}

fn solve_bilinear(
    f: &Bilinear,
    g: &Bilinear,
    tol1: f64,
    tol2: f64,
    tol3: f64,
) -> Option<(f64, f64)> {
    // f.c11 * g - g.c11 * f has no s t term.
    let l00 = f.c11 * g.c00 - f.c00 * g.c11;
    let l10 = f.c11 * g.c10 - f.c10 * g.c11;
    let l01 = f.c11 * g.c01 - f.c01 * g.c11;

    if l01.abs() <= tol2 {
        // The line is vertical in (s, t): s is fixed, t comes from either
        // component.
        if l10.abs() <= tol2 {
            return None;
        }
        let s = -l00 / l10;
        let t = f.t_at(s, tol1).or_else(|| g.t_at(s, tol1))?;
        return Some((s, t));
    }

    let t_of = |s: f64| -(l00 + l10 * s) / l01;

    // f(s, t_of(s)) * l01 = qa s^2 + qb s + qc
    let qa = -f.c11 * l10;
    let qb = f.c10 * l01 - f.c01 * l10 - f.c11 * l00;
    let qc = f.c00 * l01 - f.c01 * l00;

    let inside = |s: f64, t: f64| s > 0.0 && s < 1.0 && t > 0.0 && t < 1.0;

    if qa.abs() <= tol3 {
        if qb.abs() <= tol3 {
            return None;
        }
        let s = -qc / qb;
        return Some((s, t_of(s)));
    }

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let (r1, r2) = ((-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa));
    let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
    [lo, hi]
        .into_iter()
        .map(|s| (s, t_of(s)))
        .find(|&(s, t)| inside(s, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Bounds {
        Bounds::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Corner samples of an analytic field, indexed by corner.
    fn sample(bounds: Bounds, field: impl Fn(f64, f64) -> Vector2) -> [Vector2; 4] {
        Corner::ALL.map(|c| {
            let p = bounds.corner(c);
            field(p.x, p.y)
        })
    }

    #[test]
    fn bilinear_zero_at_cell_center() {
        // f = x y - 1/4, g = x - y
        let s = sample(unit(), |x, y| DVec2::new(x * y - 0.25, x - y));
        let at = locate(unit(), s).unwrap();
        assert!(at.abs_diff_eq(DVec2::new(0.5, 0.5), 1e-12), "got {at}");
    }

    #[test]
    fn linear_field_zero_in_offset_cell() {
        let b = Bounds::new(2.0, -1.0, 4.0, 1.0);
        let s = sample(b, |x, y| DVec2::new(x - 3.5, y + 0.25));
        let at = locate(b, s).unwrap();
        assert!(at.abs_diff_eq(DVec2::new(3.5, -0.25), 1e-12), "got {at}");
    }

    #[test]
    fn rotation_has_zero_at_origin_of_rotation() {
        let b = Bounds::new(-1.0, -1.0, 1.5, 1.5);
        let s = sample(b, |x, y| DVec2::new(-y, x));
        let at = locate(b, s).unwrap();
        assert!(at.length() < 1e-12, "got {at}");
    }

    #[test]
    fn zero_outside_cell_is_ignored() {
        let s = sample(unit(), |x, y| DVec2::new(x - 2.0, y - 0.5));
        assert_eq!(locate(unit(), s), None);
    }

    #[test]
    fn zero_on_cell_border_is_ignored() {
        let s = sample(unit(), |x, y| DVec2::new(x, y - 0.5));
        assert_eq!(locate(unit(), s), None);
    }

    #[test]
    fn uniform_field_has_no_zero() {
        let s = [DVec2::X; 4];
        assert_eq!(locate(unit(), s), None);
    }

    #[test]
    fn zero_field_has_no_isolated_zero() {
        assert_eq!(locate(unit(), [DVec2::ZERO; 4]), None);
    }

    #[test]
    fn parallel_components_have_no_zero() {
        // f and g vanish on parallel lines that never meet.
        let s = sample(unit(), |x, _| DVec2::new(x - 0.3, x - 0.6));
        assert_eq!(locate(unit(), s), None);
    }

    #[test]
    fn degenerate_bounds_have_no_zero() {
        let b = Bounds::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(locate(b, [DVec2::X; 4]), None);
    }

    #[test]
    fn two_zeros_resolve_to_interior_one() {
        // f = (x - 0.3)(y + 1), g = y (x + 1) - 0.6
        let s = sample(unit(), |x, y| {
            DVec2::new(x * y - 0.3 * y + x - 0.3, x * y + y - 0.6)
        });
        let at = locate(unit(), s).unwrap();
        assert!((at.x - 0.3).abs() < 1e-12, "got {at}");
        assert!((at.y - 0.6 / 1.3).abs() < 1e-12, "got {at}");
    }

    #[test]
    fn vertical_elimination_line_is_handled() {
        // g does not depend on y, so eliminating x y leaves x = const.
        let s = sample(unit(), |x, y| DVec2::new(x * y + x - 0.4, x - 0.25));
        let at = locate(unit(), s).unwrap();
        assert!(at.abs_diff_eq(DVec2::new(0.25, 0.6), 1e-12), "got {at}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn located_zero_is_interior_and_vanishes(
                zx in 0.05_f64..0.95,
                zy in 0.05_f64..0.95,
                k in 0.1_f64..3.0,
            ) {
                let field = move |x: f64, y: f64| {
                    DVec2::new(k * (x - zx) + (x - zx) * (y - zy), (y - zy) - 0.5 * (x - zx))
                };
                let s = sample(unit(), field);
                let at = locate(unit(), s);
                prop_assert!(at.is_some(), "no zero found for ({zx}, {zy})");
                let at = at.unwrap();
                prop_assert!(unit().contains(at));
                let v = field(at.x, at.y);
                prop_assert!(v.length() < 1e-9, "field {v} at {at}");
            }
        }
    }
}
