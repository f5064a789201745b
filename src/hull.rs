//! Convex hulls via Andrew's monotone chain.

use crate::math::Point;
use crate::observer::{NoObserver, SweepObserver};
use crate::utils::is_on_right;

/// The convex hull of a set of points.
///
/// The hull is returned in boundary order starting from its
/// lexicographically smallest vertex (smallest `x`, then smallest `y`).
/// Collinear points on the hull boundary are dropped. Degenerate inputs
/// return what is left: a single point or the two extremes of a collinear
/// set.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    convex_hull_with_observer(points, &mut NoObserver)
}

/// Same as [`convex_hull`] with progress notifications.
pub fn convex_hull_with_observer(
    points: &[Point],
    observer: &mut dyn SweepObserver,
) -> Vec<Point> {
    let mut sorted = points.to_vec();
    // Left to right; ties resolved bottom-up so that the first point
    // starts the upper chain.
    sorted.sort_by(|a, b| {
        (a.x, -a.y)
            .partial_cmp(&(b.x, -b.y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.dedup();

    if sorted.len() <= 2 {
        for &p in &sorted {
            observer.hull_vertex(p);
        }
        return sorted;
    }

    let upper = chain(sorted.iter().copied());
    let lower = chain(sorted.iter().rev().copied());

    // The chains share their extreme points; keep them only once.
    let mut hull = upper;
    hull.extend_from_slice(&lower[1..lower.len() - 1]);

    // Rotate so the hull starts at its lexicographic minimum.
    let mut start = 0;
    for i in 1..hull.len() {
        if (hull[i].x, hull[i].y) < (hull[start].x, hull[start].y) {
            start = i;
        }
    }
    hull.rotate_left(start);

    for &p in &hull {
        observer.hull_vertex(p);
    }

    hull
}

/// One hull chain: keep only strict right turns.
fn chain(points: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::new();
    for p in points {
        out.push(p);
        while out.len() > 2 {
            let n = out.len();
            if is_on_right(out[n - 3], out[n - 2], out[n - 1]) {
                break;
            }
            out.remove(n - 2);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn interior_points_are_dropped() {
        let points = [
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(4.0, 4.0),
            point(0.0, 4.0),
            point(2.0, 2.0),
        ];
        assert_eq!(
            convex_hull(&points),
            vec![
                point(0.0, 0.0),
                point(4.0, 0.0),
                point(4.0, 4.0),
                point(0.0, 4.0),
            ]
        );
    }

    #[test]
    fn degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[point(1.0, 1.0)]), vec![point(1.0, 1.0)]);
        assert_eq!(
            convex_hull(&[point(1.0, 1.0), point(3.0, 2.0)]),
            vec![point(1.0, 1.0), point(3.0, 2.0)]
        );
        // Collinear points collapse to the two extremes.
        let collinear = [point(0.0, 0.0), point(1.0, 1.0), point(3.0, 3.0)];
        assert_eq!(
            convex_hull(&collinear),
            vec![point(0.0, 0.0), point(3.0, 3.0)]
        );
    }

    #[test]
    fn duplicates_are_ignored() {
        let points = [
            point(0.0, 0.0),
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(2.0, 4.0),
            point(4.0, 0.0),
        ];
        assert_eq!(
            convex_hull(&points),
            vec![point(0.0, 0.0), point(4.0, 0.0), point(2.0, 4.0)]
        );
    }

    #[test]
    fn all_points_inside_hull() {
        // Every input point must sit on or inside the hull, and
        // consecutive hull edges must turn the same way.
        use rand::prelude::*;
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<Point> = (0..40)
            .map(|_| point(rng.gen_range(0.0..32.0), rng.gen_range(0.0..32.0)))
            .collect();

        let hull = convex_hull(&points);
        assert!(hull.len() >= 3);
        let n = hull.len();
        for i in 0..n {
            let a = hull[i];
            let b = hull[(i + 1) % n];
            assert!(is_on_right(a, b, hull[(i + 2) % n]));
            for &p in &points {
                // On the hull boundary or strictly inside.
                assert!(!crate::utils::is_on_right(b, a, p));
            }
        }
    }
}
