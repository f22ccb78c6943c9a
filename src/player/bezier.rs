use crate::foundation::core::Vec3;

/// Point of the quadratic Bezier curve `p0, c, p1` at parameter `r`.
pub fn quadratic_point(p0: Vec3, c: Vec3, p1: Vec3, r: f64) -> Vec3 {
    let s = 1.0 - r;
    p0 * (s * s) + c * (2.0 * s * r) + p1 * (r * r)
}

/// Derivative with respect to `r` of the quadratic Bezier curve `p0, c, p1`.
pub fn quadratic_derivative(p0: Vec3, c: Vec3, p1: Vec3, r: f64) -> Vec3 {
    (c - p0) * (2.0 * (1.0 - r)) + (p1 - c) * (2.0 * r)
}

/// Point of the cubic Bezier curve `p0, c1, c2, p1` at parameter `r`.
pub fn cubic_point(p0: Vec3, c1: Vec3, c2: Vec3, p1: Vec3, r: f64) -> Vec3 {
    let s = 1.0 - r;
    p0 * (s * s * s) + c1 * (3.0 * s * s * r) + c2 * (3.0 * s * r * r) + p1 * (r * r * r)
}

/// Derivative with respect to `r` of the cubic Bezier curve `p0, c1, c2, p1`.
pub fn cubic_derivative(p0: Vec3, c1: Vec3, c2: Vec3, p1: Vec3, r: f64) -> Vec3 {
    let s = 1.0 - r;
    (c1 - p0) * (3.0 * s * s) + (c2 - c1) * (6.0 * s * r) + (p1 - c2) * (3.0 * r * r)
}

/// Split a Bezier curve of any degree at `fraction` using de Casteljau subdivision.
///
/// `points` holds the start point, the control points and the end point. Returns the
/// curves covering `[0, fraction]` and `[fraction, 1]`, each with the same number of
/// points as the input. A fraction of 0 (or below) returns the input unchanged as the
/// second half and 1 (or above) returns it unchanged as the first half; the other half
/// degenerates to a single repeated point.
pub fn split_bezier_curve(points: &[Vec3], fraction: f64) -> (Vec<Vec3>, Vec<Vec3>) {
    let n = points.len();
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return (Vec::new(), Vec::new());
    };
    if fraction <= 0.0 {
        return (vec![first; n], points.to_vec());
    }
    if fraction >= 1.0 {
        return (points.to_vec(), vec![last; n]);
    }

    let mut work = points.to_vec();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    for level in 0..n {
        let len = n - level;
        left.push(work[0]);
        right.push(work[len - 1]);
        for i in 0..len - 1 {
            work[i] = work[i].lerp(work[i + 1], fraction);
        }
    }
    right.reverse();
    (left, right)
}

#[cfg(test)]
#[path = "../../tests/unit/player/bezier.rs"]
mod tests;
