//! Polygon area and Douglas-Peucker simplification.

use imageproc::point::Point;

/// Absolute shoelace area of a closed point sequence.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut acc = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (acc as f64).abs() * 0.5
}

fn dist_to_segment(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len_sq.sqrt()
}

/// Simplify the open chain `chain[first..=last]`, marking kept vertices.
fn simplify(chain: &[Point<i32>], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(first, last)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut max_d = -1.0;
        let mut max_i = lo;
        for i in lo + 1..hi {
            let d = dist_to_segment(chain[i], chain[lo], chain[hi]);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > epsilon {
            keep[max_i] = true;
            stack.push((lo, max_i));
            stack.push((max_i, hi));
        }
    }
}

/// Douglas-Peucker approximation of a closed contour.
///
/// The contour is split at its first point and the point farthest from it;
/// both halves are simplified independently. The result is returned without a
/// repeated closing vertex.
pub fn approximate_polygon(contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = contour.len();
    if n <= 2 {
        return contour.to_vec();
    }

    let start = contour[0];
    let far = (1..n)
        .max_by_key(|&i| {
            let dx = (contour[i].x - start.x) as i64;
            let dy = (contour[i].y - start.y) as i64;
            dx * dx + dy * dy
        })
        .unwrap_or(0);

    // Unroll the loop so the second half ends back at the start point.
    let mut ring = contour.to_vec();
    ring.push(start);
    let mut keep = vec![false; ring.len()];
    keep[0] = true;
    keep[far] = true;
    simplify(&ring, 0, far, epsilon, &mut keep);
    simplify(&ring, far, n, epsilon, &mut keep);

    ring.iter()
        .take(n)
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noisy_rect_outline() -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in 0..60 {
            pts.push(Point::new(x, if x % 7 == 3 { 1 } else { 0 }));
        }
        for y in 0..40 {
            pts.push(Point::new(60, y));
        }
        for x in (1..=60).rev() {
            pts.push(Point::new(x, 40));
        }
        for y in (1..=40).rev() {
            pts.push(Point::new(0, y));
        }
        pts
    }

    #[test]
    fn shoelace_area_of_square() {
        let sq = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_relative_eq!(polygon_area(&sq), 100.0);
        let rev: Vec<_> = sq.iter().rev().copied().collect();
        assert_relative_eq!(polygon_area(&rev), 100.0);
    }

    #[test]
    fn noisy_rectangle_reduces_to_quad() {
        let approx = approximate_polygon(&noisy_rect_outline(), 10.0);
        assert_eq!(approx.len(), 4, "got {:?}", approx);
    }

    #[test]
    fn small_epsilon_keeps_detail() {
        let approx = approximate_polygon(&noisy_rect_outline(), 0.5);
        assert!(approx.len() > 4);
    }

    #[test]
    fn triangle_stays_triangle() {
        let mut pts = Vec::new();
        for i in 0..50 {
            pts.push(Point::new(i, 0));
        }
        for i in 0..50 {
            pts.push(Point::new(50 - i, i));
        }
        for i in 0..50 {
            pts.push(Point::new(0, 50 - i));
        }
        let approx = approximate_polygon(&pts, 2.0);
        assert_eq!(approx.len(), 3, "got {:?}", approx);
    }
}
