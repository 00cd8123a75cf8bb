//! Bernstein-basis evaluation of linear, quadratic and cubic Bezier segments.
//!
//! All functions take the segment-local parameter `u` and clamp it to
//! `[0, 1]` first.

use super::Point3;

/// Linearly interpolates between `p0` and `p1`.
#[must_use]
pub fn lerp(p0: &Point3, p1: &Point3, u: f64) -> Point3 {
    let u = u.clamp(0.0, 1.0);
    p0 + (p1 - p0) * u
}

/// Evaluates a quadratic Bezier curve at parameter `u`.
///
/// `B(u) = (1-u)²·P0 + 2(1-u)u·P1 + u²·P2`
#[must_use]
pub fn quadratic_point(p0: &Point3, p1: &Point3, p2: &Point3, u: f64) -> Point3 {
    let u = u.clamp(0.0, 1.0);
    let mu = 1.0 - u;
    let coords = p0.coords * (mu * mu) + p1.coords * (2.0 * mu * u) + p2.coords * (u * u);
    Point3::from(coords)
}

/// Evaluates a cubic Bezier curve at parameter `u`.
///
/// `B(u) = (1-u)³·P0 + 3(1-u)²u·P1 + 3(1-u)u²·P2 + u³·P3`
#[must_use]
pub fn cubic_point(p0: &Point3, p1: &Point3, p2: &Point3, p3: &Point3, u: f64) -> Point3 {
    let u = u.clamp(0.0, 1.0);
    let mu = 1.0 - u;
    let mu2 = mu * mu;
    let u2 = u * u;
    let coords = p0.coords * (mu2 * mu)
        + p1.coords * (3.0 * mu2 * u)
        + p2.coords * (3.0 * mu * u2)
        + p3.coords * (u2 * u);
    Point3::from(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn lerp_midpoint() {
        let m = lerp(&p(0.0, 0.0, 0.0), &p(10.0, -4.0, 2.0), 0.5);
        assert!((m - p(5.0, -2.0, 1.0)).norm() < TOL);
    }

    #[test]
    fn quadratic_hits_endpoints() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 2.0, 0.0), p(2.0, 0.0, 0.0));
        assert_eq!(quadratic_point(&a, &b, &c, 0.0), a);
        assert_eq!(quadratic_point(&a, &b, &c, 1.0), c);
    }

    #[test]
    fn quadratic_midpoint_is_weighted_average() {
        // 0.25·P0 + 0.5·P1 + 0.25·P2
        let m = quadratic_point(&p(0.0, 0.0, 0.0), &p(1.0, 2.0, 0.0), &p(2.0, 0.0, 0.0), 0.5);
        assert!((m - p(1.0, 1.0, 0.0)).norm() < TOL, "m={m}");
    }

    #[test]
    fn cubic_midpoint_is_weighted_average() {
        // 0.125·P0 + 0.375·P1 + 0.375·P2 + 0.125·P3
        let m = cubic_point(
            &p(0.0, 0.0, 0.0),
            &p(0.0, 4.0, 0.0),
            &p(4.0, 4.0, 0.0),
            &p(4.0, 0.0, 0.0),
            0.5,
        );
        assert!((m - p(2.0, 3.0, 0.0)).norm() < TOL, "m={m}");
    }

    #[test]
    fn parameter_is_clamped() {
        let (a, b, c, d) = (
            p(0.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(2.0, 1.0, 0.0),
            p(3.0, 0.0, 0.0),
        );
        assert_eq!(cubic_point(&a, &b, &c, &d, -0.5), a);
        assert_eq!(cubic_point(&a, &b, &c, &d, 1.5), d);
        assert_eq!(quadratic_point(&a, &b, &d, 2.0), d);
        assert_eq!(lerp(&a, &d, 1.5), d);
        assert_eq!(lerp(&a, &d, -1.0), a);
    }
}
