//! Sweep-order and orientation predicates.
//!
//! The sweep line moves left to right, so vertices are ordered
//! lexicographically by `(x, y)`. Every predicate here has a transposed
//! twin (the `trans_*` functions, ordered by `(y, x)`) used by the
//! intersection routine, which interpolates the two coordinates
//! independently for numerical stability.

use super::Point2;

/// Sweep-order comparison: lexicographic by `(x, y)`, inclusive.
///
/// This is a total order; two vertices compare equal in both directions
/// only when their coordinates coincide exactly, in which case the sweep
/// merges them into a single vertex before processing.
#[inline]
#[must_use]
pub fn vert_leq(a: &Point2, b: &Point2) -> bool {
    a.x < b.x || (a.x == b.x && a.y <= b.y)
}

/// Exact coordinate equality.
#[inline]
#[must_use]
pub fn vert_eq(a: &Point2, b: &Point2) -> bool {
    a.x == b.x && a.y == b.y
}

/// [`vert_leq`] with the coordinate axes transposed.
#[inline]
#[must_use]
pub fn trans_leq(a: &Point2, b: &Point2) -> bool {
    a.y < b.y || (a.y == b.y && a.x <= b.x)
}

/// Orientation test for `v` against the directed edge `uw`, where
/// `vert_leq(u, v)` and `vert_leq(v, w)`.
///
/// Returns a value whose sign matches [`edge_eval`] but which is cheaper
/// to compute: positive if `v` lies above `uw`, negative if below, zero
/// if collinear or if `uw` is degenerate (vertical in sweep order).
#[must_use]
pub fn edge_sign(u: &Point2, v: &Point2, w: &Point2) -> f64 {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > 0.0 {
        (v.y - w.y) * gap_l + (v.y - u.y) * gap_r
    } else {
        0.0
    }
}

/// Evaluates the y-coordinate of the edge `uw` at the x-coordinate of `v`
/// and returns the signed distance from the edge to `v`, where
/// `vert_leq(u, v)` and `vert_leq(v, w)`.
///
/// The interpolation is anchored at the nearer endpoint, which keeps the
/// result accurate even when `v` is very close to `u` or `w`. If `uw` is
/// vertical (and thus passes through `v`) the result is zero.
#[must_use]
pub fn edge_eval(u: &Point2, v: &Point2, w: &Point2) -> f64 {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.y - u.y) + (u.y - w.y) * (gap_l / (gap_l + gap_r))
        } else {
            (v.y - w.y) + (w.y - u.y) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// [`edge_sign`] with the coordinate axes transposed; requires
/// `trans_leq(u, v)` and `trans_leq(v, w)`.
#[must_use]
pub fn trans_sign(u: &Point2, v: &Point2, w: &Point2) -> f64 {
    let gap_l = v.y - u.y;
    let gap_r = w.y - v.y;
    if gap_l + gap_r > 0.0 {
        (v.x - w.x) * gap_l + (v.x - u.x) * gap_r
    } else {
        0.0
    }
}

/// [`edge_eval`] with the coordinate axes transposed; requires
/// `trans_leq(u, v)` and `trans_leq(v, w)`.
#[must_use]
pub fn trans_eval(u: &Point2, v: &Point2, w: &Point2) -> f64 {
    let gap_l = v.y - u.y;
    let gap_r = w.y - v.y;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.x - u.x) + (u.x - w.x) * (gap_l / (gap_l + gap_r))
        } else {
            (v.x - w.x) + (w.x - u.x) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Returns `(b*x + a*y) / (a + b)`, or `(x + y) / 2` when both weights are
/// zero. Requires `a, b >= 0` and clamps slightly negative weights.
///
/// The result is guaranteed to satisfy `min(x, y) <= r <= max(x, y)`, even
/// when `a` and `b` differ greatly in magnitude.
#[must_use]
pub fn interpolate(a: f64, x: f64, b: f64, y: f64) -> f64 {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            (x + y) / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Computes the intersection point of the edges `(o1, d1)` and `(o2, d2)`.
///
/// The strategy: find the two middle vertices in sweep order and
/// interpolate the intersection x-value from their signed distances, then
/// repeat in the transposed order for the y-value. The computed point is
/// guaranteed to lie within the bounding rectangle of each edge, which the
/// sweep relies on to make progress on degenerate inputs.
#[must_use]
pub fn edge_intersect(o1: &Point2, d1: &Point2, o2: &Point2, d2: &Point2) -> Point2 {
    let (mut o1, mut d1) = if vert_leq(o1, d1) { (o1, d1) } else { (d1, o1) };
    let (mut o2, mut d2) = if vert_leq(o2, d2) { (o2, d2) } else { (d2, o2) };
    if !vert_leq(o1, o2) {
        std::mem::swap(&mut o1, &mut o2);
        std::mem::swap(&mut d1, &mut d2);
    }

    let x = if !vert_leq(o2, d1) {
        // Technically no intersection; do our best.
        (o2.x + d1.x) / 2.0
    } else if vert_leq(d1, d2) {
        let mut z1 = edge_eval(o1, o2, d1);
        let mut z2 = edge_eval(o2, d1, d2);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.x, z2, d1.x)
    } else {
        let mut z1 = edge_sign(o1, o2, d1);
        let mut z2 = -edge_sign(o1, d2, d1);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.x, z2, d2.x)
    };

    // Now repeat the process for the y-coordinate.
    let (mut o1, mut d1) = if trans_leq(o1, d1) { (o1, d1) } else { (d1, o1) };
    let (mut o2, mut d2) = if trans_leq(o2, d2) { (o2, d2) } else { (d2, o2) };
    if !trans_leq(o1, o2) {
        std::mem::swap(&mut o1, &mut o2);
        std::mem::swap(&mut d1, &mut d2);
    }

    let y = if !trans_leq(o2, d1) {
        (o2.y + d1.y) / 2.0
    } else if trans_leq(d1, d2) {
        let mut z1 = trans_eval(o1, o2, d1);
        let mut z2 = trans_eval(o2, d1, d2);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.y, z2, d1.y)
    } else {
        let mut z1 = trans_sign(o1, o2, d1);
        let mut z2 = -trans_sign(o1, d2, d1);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.y, z2, d2.y)
    };

    Point2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vert_leq_is_total() {
        let a = Point2::new(0.0, 1.0);
        let b = Point2::new(0.0, 2.0);
        let c = Point2::new(1.0, -5.0);
        assert!(vert_leq(&a, &b));
        assert!(!vert_leq(&b, &a));
        assert!(vert_leq(&a, &c));
        assert!(vert_leq(&b, &c));
        assert!(vert_leq(&a, &a) && vert_leq(&b, &b));
    }

    #[test]
    fn edge_sign_orientation() {
        let u = Point2::new(0.0, 0.0);
        let w = Point2::new(2.0, 0.0);
        assert!(edge_sign(&u, &Point2::new(1.0, 1.0), &w) > 0.0);
        assert!(edge_sign(&u, &Point2::new(1.0, -1.0), &w) < 0.0);
        assert_relative_eq!(edge_sign(&u, &Point2::new(1.0, 0.0), &w), 0.0);
    }

    #[test]
    fn edge_sign_degenerate_is_zero() {
        let p = Point2::new(3.0, 1.0);
        assert_relative_eq!(edge_sign(&p, &p, &p), 0.0);
    }

    #[test]
    fn edge_eval_midpoint() {
        let u = Point2::new(0.0, 0.0);
        let w = Point2::new(4.0, 4.0);
        // Point two above the chord at x = 2.
        let v = Point2::new(2.0, 4.0);
        assert_relative_eq!(edge_eval(&u, &v, &w), 2.0);
    }

    #[test]
    fn interpolate_stays_in_range() {
        assert_relative_eq!(interpolate(0.0, 1.0, 0.0, 3.0), 2.0);
        assert_relative_eq!(interpolate(1.0, 1.0, 1.0, 3.0), 2.0);
        let r = interpolate(1e-300, 1.0, 1.0, 3.0);
        assert!((1.0..=3.0).contains(&r));
    }

    #[test]
    fn intersect_crossing_segments() {
        let p = edge_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 10.0),
            &Point2::new(0.0, 10.0),
            &Point2::new(10.0, 0.0),
        );
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn intersect_stays_in_bounding_boxes() {
        let p = edge_intersect(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 1.0),
            &Point2::new(1.0, 3.0),
            &Point2::new(3.0, -2.0),
        );
        assert!(p.x >= 1.0 && p.x <= 3.0);
        assert!(p.y >= -2.0 && p.y <= 3.0);
    }
}
