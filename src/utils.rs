//! Orientation predicates and ordering helpers shared by the sweep
//! algorithms.

use crate::math::Point;
use std::cmp::Ordering;

/// Position of a point relative to a directed line.
///
/// `Right` is the positive cross product side, which visually is the
/// right-hand side when y grows downward.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
    Collinear,
}

/// Orientation of `r` relative to the line directed from `p` to `q`.
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let det = (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    if det > 0.0 {
        Orientation::Right
    } else if det < 0.0 {
        Orientation::Left
    } else {
        Orientation::Collinear
    }
}

/// Whether `r` is strictly on the right of the line directed from `p` to `q`.
#[inline]
pub fn is_on_right(p: Point, q: Point, r: Point) -> bool {
    orientation(p, q, r) == Orientation::Right
}

/// Order two positions in sweep order: `y` first, `x` to break ties.
///
/// The sweep line moves toward increasing `y`, so `Less` means "reached
/// first by the sweep".
pub fn compare_positions(a: Point, b: Point) -> Ordering {
    if a.y > b.y || (a.y == b.y && a.x > b.x) {
        return Ordering::Greater;
    }
    if a.y < b.y || (a.y == b.y && a.x < b.x) {
        return Ordering::Less;
    }

    Ordering::Equal
}

/// Whether the closed polygonal chain winds clockwise on screen
/// (y pointing down).
///
/// The last point is implicitly connected back to the first one.
pub fn is_polygon_clockwise(points: &[Point]) -> bool {
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += (b.x - a.x) * (b.y + a.y);
    }

    sum < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn orientation_sides() {
        let p = point(0.0, 0.0);
        let q = point(4.0, 0.0);
        // y grows downward: (2, 2) is below the segment, on its right.
        assert_eq!(orientation(p, q, point(2.0, 2.0)), Orientation::Right);
        assert_eq!(orientation(p, q, point(2.0, -2.0)), Orientation::Left);
        assert_eq!(orientation(p, q, point(8.0, 0.0)), Orientation::Collinear);
        assert!(is_on_right(p, q, point(2.0, 2.0)));
        assert!(!is_on_right(p, q, point(2.0, 0.0)));
    }

    #[test]
    fn orientation_antisymmetry() {
        let p = point(1.0, 2.0);
        let q = point(5.0, -1.0);
        let r = point(2.0, 4.0);
        assert_eq!(orientation(p, q, r), Orientation::Right);
        assert_eq!(orientation(q, p, r), Orientation::Left);
    }

    #[test]
    fn position_order() {
        assert_eq!(
            compare_positions(point(3.0, 1.0), point(0.0, 2.0)),
            Ordering::Less
        );
        assert_eq!(
            compare_positions(point(1.0, 2.0), point(3.0, 2.0)),
            Ordering::Less
        );
        assert_eq!(
            compare_positions(point(3.0, 2.0), point(3.0, 2.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn polygon_winding() {
        // On screen this square reads clockwise.
        let cw = [
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(4.0, 4.0),
            point(0.0, 4.0),
        ];
        assert!(is_polygon_clockwise(&cw));

        let ccw = [
            point(0.0, 0.0),
            point(0.0, 4.0),
            point(4.0, 4.0),
            point(4.0, 0.0),
        ];
        assert!(!is_polygon_clockwise(&ccw));
    }
}
