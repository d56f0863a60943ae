//! Minimum-area enclosing rectangle via rotating calipers.

use imageproc::point::Point;

/// Rotated rectangle with the legacy `[-90, 0)` angle convention.
///
/// `angle_deg` is the direction of the `width` side measured from the +x axis
/// (image y pointing down), reduced modulo 90 into `[-90, 0)`. An axis-aligned
/// rectangle therefore reports `-90`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

impl RotatedRect {
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Reduce an edge direction into `[-90, 0)`.
fn legacy_angle(deg: f64) -> f64 {
    let a = deg.rem_euclid(90.0);
    if a <= 1e-9 || (90.0 - a) <= 1e-9 {
        -90.0
    } else {
        a - 90.0
    }
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Andrew's monotone chain; returns the hull counter-clockwise without repeats.
fn convex_hull(points: &[Point<i32>]) -> Vec<[f64; 2]> {
    let mut pts: Vec<[f64; 2]> = points.iter().map(|p| [p.x as f64, p.y as f64]).collect();
    pts.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<[f64; 2]> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Minimum-area rectangle enclosing `points`.
///
/// Degenerate inputs (fewer than three distinct, non-collinear points) fall back
/// to the axis-aligned extent, which may have zero width or height.
pub fn min_area_rect(points: &[Point<i32>]) -> RotatedRect {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return axis_aligned(&hull);
    }

    let n = hull.len();
    let mut best: Option<RotatedRect> = None;
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let ex = b[0] - a[0];
        let ey = b[1] - a[1];
        let len = (ex * ex + ey * ey).sqrt();
        if len < f64::EPSILON {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);
        let (vx, vy) = (-uy, ux);

        let (mut min_u, mut max_u) = (f64::MAX, f64::MIN);
        let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
        for p in &hull {
            let dx = p[0] - a[0];
            let dy = p[1] - a[1];
            let pu = dx * ux + dy * uy;
            let pv = dx * vx + dy * vy;
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let width = max_u - min_u;
        let height = max_v - min_v;
        if best.is_some_and(|r| r.area() <= width * height) {
            continue;
        }
        let cu = 0.5 * (min_u + max_u);
        let cv = 0.5 * (min_v + max_v);
        best = Some(RotatedRect {
            center: [a[0] + cu * ux + cv * vx, a[1] + cu * uy + cv * vy],
            width,
            height,
            angle_deg: legacy_angle(uy.atan2(ux).to_degrees()),
        });
    }

    best.unwrap_or_else(|| axis_aligned(&hull))
}

fn axis_aligned(pts: &[[f64; 2]]) -> RotatedRect {
    if pts.is_empty() {
        return RotatedRect {
            center: [0.0, 0.0],
            width: 0.0,
            height: 0.0,
            angle_deg: -90.0,
        };
    }
    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in pts {
        x0 = x0.min(p[0]);
        y0 = y0.min(p[1]);
        x1 = x1.max(p[0]);
        y1 = y1.max(p[1]);
    }
    RotatedRect {
        center: [0.5 * (x0 + x1), 0.5 * (y0 + y1)],
        width: x1 - x0,
        height: y1 - y0,
        angle_deg: -90.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in x0..=x1 {
            pts.push(Point::new(x, y0));
            pts.push(Point::new(x, y1));
        }
        for y in y0..=y1 {
            pts.push(Point::new(x0, y));
            pts.push(Point::new(x1, y));
        }
        pts
    }

    #[test]
    fn axis_aligned_rect_reports_minus_ninety() {
        let r = min_area_rect(&rect_outline(10, 20, 40, 80));
        assert_relative_eq!(r.angle_deg, -90.0);
        assert_relative_eq!(r.area(), 30.0 * 60.0, epsilon = 1e-9);
        assert_relative_eq!(r.center[0], 25.0, epsilon = 1e-9);
        assert_relative_eq!(r.center[1], 50.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_square_reports_its_tilt() {
        // Diamond: edges at +-45 degrees.
        let pts = [
            Point::new(50, 0),
            Point::new(100, 50),
            Point::new(50, 100),
            Point::new(0, 50),
        ];
        let r = min_area_rect(&pts);
        assert_relative_eq!(r.angle_deg, -45.0, epsilon = 1e-9);
        assert_relative_eq!(r.area(), 5000.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_points_fall_back_to_extent() {
        let pts = [Point::new(0, 5), Point::new(10, 5), Point::new(20, 5)];
        let r = min_area_rect(&pts);
        assert_relative_eq!(r.width, 20.0);
        assert_relative_eq!(r.height, 0.0);
    }

    #[test]
    fn legacy_angle_range() {
        assert_relative_eq!(legacy_angle(0.0), -90.0);
        assert_relative_eq!(legacy_angle(90.0), -90.0);
        assert_relative_eq!(legacy_angle(-10.0), -10.0);
        assert_relative_eq!(legacy_angle(10.0), -80.0);
        assert_relative_eq!(legacy_angle(170.0), -10.0);
    }
}
