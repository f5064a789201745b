//! Line segments with exact f64 endpoints.

use crate::math::{point, Point};
use crate::utils::{compare_positions, orientation, Orientation};
use std::cmp::Ordering;

/// Tolerance used when testing whether a point produced by an intersection
/// computation lies on a segment.
const ON_SEGMENT_TOLERANCE: f64 = 1e-9;

/// A line segment between two points.
///
/// Segments are undirected: two segments with swapped endpoints compare
/// equal.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    #[inline]
    pub fn new(from: Point, to: Point) -> Self {
        Segment { from, to }
    }

    /// The endpoint the sweep line reaches first.
    #[inline]
    pub fn upper(&self) -> Point {
        if compare_positions(self.from, self.to) == Ordering::Greater {
            self.to
        } else {
            self.from
        }
    }

    /// The endpoint the sweep line reaches last.
    #[inline]
    pub fn lower(&self) -> Point {
        if compare_positions(self.from, self.to) == Ordering::Greater {
            self.from
        } else {
            self.to
        }
    }

    /// The proper intersection of two segments, if any.
    ///
    /// Only transversal crossings count: both segments must have their
    /// endpoints strictly on opposite sides of the other's supporting line.
    /// Touching endpoints, collinear overlaps and parallel segments all
    /// yield `None`.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        // A collinear endpoint is a touch, not a crossing, so each pair of
        // orientations must be strictly {Left, Right}.
        let separated = |a: Orientation, b: Orientation| {
            a != b && a != Orientation::Collinear && b != Orientation::Collinear
        };
        let this_straddles = separated(
            orientation(other.from, other.to, self.from),
            orientation(other.from, other.to, self.to),
        );
        let other_straddles = separated(
            orientation(self.from, self.to, other.from),
            orientation(self.from, self.to, other.to),
        );
        if !this_straddles || !other_straddles {
            return None;
        }

        let (x1, y1) = (self.from.x, self.from.y);
        let (x2, y2) = (self.to.x, self.to.y);
        let (x3, y3) = (other.from.x, other.from.y);
        let (x4, y4) = (other.to.x, other.to.y);

        let d = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if d == 0.0 {
            return None;
        }
        let a = x1 * y2 - y1 * x2;
        let b = x3 * y4 - y3 * x4;

        Some(point(
            ((x3 - x4) * a - (x1 - x2) * b) / d,
            ((y3 - y4) * a - (y1 - y2) * b) / d,
        ))
    }

    /// Where this segment crosses the horizontal line at height `y`, if it
    /// does so transversally.
    ///
    /// The horizontal probe only spans the segment's own x range, so
    /// vertical segments and segments with an endpoint on the line yield
    /// `None` and the caller keeps its previous key.
    pub(crate) fn sweep_key(&self, y: f64) -> Option<Point> {
        let scan = Segment::new(point(self.from.x, y), point(self.to.x, y));
        self.intersection(&scan)
    }

    /// Whether `p` lies on this segment (endpoints included), within a small
    /// tolerance of the supporting line.
    pub fn contains_point(&self, p: Point) -> bool {
        if p == self.from || p == self.to {
            return true;
        }
        let min_x = self.from.x.min(self.to.x);
        let max_x = self.from.x.max(self.to.x);
        let min_y = self.from.y.min(self.to.y);
        let max_y = self.from.y.max(self.to.y);
        if p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y {
            return false;
        }

        let d = self.to - self.from;
        let v = p - self.from;
        let cross = d.x * v.y - d.y * v.x;

        cross.abs() <= ON_SEGMENT_TOLERANCE * d.length()
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_equality() {
        let a = Segment::new(point(0.0, 0.0), point(4.0, 4.0));
        let b = Segment::new(point(4.0, 4.0), point(0.0, 0.0));
        let c = Segment::new(point(0.0, 0.0), point(4.0, 0.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn upper_and_lower() {
        let s = Segment::new(point(2.0, 5.0), point(1.0, 1.0));
        assert_eq!(s.upper(), point(1.0, 1.0));
        assert_eq!(s.lower(), point(2.0, 5.0));

        let horizontal = Segment::new(point(4.0, 2.0), point(0.0, 2.0));
        assert_eq!(horizontal.upper(), point(0.0, 2.0));
    }

    #[test]
    fn proper_crossing() {
        let a = Segment::new(point(0.0, 0.0), point(4.0, 4.0));
        let b = Segment::new(point(0.0, 4.0), point(4.0, 0.0));
        assert_eq!(a.intersection(&b), Some(point(2.0, 2.0)));
        assert_eq!(b.intersection(&a), Some(point(2.0, 2.0)));
    }

    #[test]
    fn non_crossings() {
        let a = Segment::new(point(0.0, 0.0), point(4.0, 0.0));
        // Parallel.
        let b = Segment::new(point(0.0, 1.0), point(4.0, 1.0));
        assert_eq!(a.intersection(&b), None);
        // Touching at an endpoint is not a proper crossing.
        let c = Segment::new(point(4.0, 0.0), point(4.0, 4.0));
        assert_eq!(a.intersection(&c), None);
        // Collinear overlap.
        let d = Segment::new(point(2.0, 0.0), point(6.0, 0.0));
        assert_eq!(a.intersection(&d), None);
        // Supporting lines cross but the segments do not.
        let e = Segment::new(point(10.0, 10.0), point(10.0, 12.0));
        assert_eq!(a.intersection(&e), None);
    }

    #[test]
    fn touching_is_rejected_in_both_orientations() {
        let a = Segment::new(point(0.0, 0.0), point(4.0, 0.0));
        // Shared endpoint, with the far endpoint on either side of `a`.
        let above = Segment::new(point(4.0, 0.0), point(4.0, 4.0));
        let below = Segment::new(point(4.0, 0.0), point(4.0, -4.0));
        assert_eq!(a.intersection(&above), None);
        assert_eq!(above.intersection(&a), None);
        assert_eq!(a.intersection(&below), None);
        assert_eq!(below.intersection(&a), None);
        // T junctions: an endpoint in the interior of the other segment.
        let stem_down = Segment::new(point(2.0, 0.0), point(2.0, 4.0));
        let stem_up = Segment::new(point(2.0, -4.0), point(2.0, 0.0));
        assert_eq!(a.intersection(&stem_down), None);
        assert_eq!(stem_down.intersection(&a), None);
        assert_eq!(a.intersection(&stem_up), None);
        assert_eq!(stem_up.intersection(&a), None);
    }

    #[test]
    fn sweep_keys() {
        let s = Segment::new(point(0.0, 0.0), point(4.0, 4.0));
        assert_eq!(s.sweep_key(2.0), Some(point(2.0, 2.0)));
        // An endpoint on the scan line is not a transversal crossing.
        assert_eq!(s.sweep_key(0.0), None);
        // Vertical segments have a degenerate probe.
        let v = Segment::new(point(1.0, 0.0), point(1.0, 4.0));
        assert_eq!(v.sweep_key(2.0), None);
    }

    #[test]
    fn point_containment() {
        let s = Segment::new(point(0.0, 0.0), point(4.0, 4.0));
        assert!(s.contains_point(point(2.0, 2.0)));
        assert!(s.contains_point(point(0.0, 0.0)));
        assert!(!s.contains_point(point(2.0, 3.0)));
        assert!(!s.contains_point(point(5.0, 5.0)));
    }
}
