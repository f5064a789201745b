//! Bentley-Ottmann style sweep over a set of segments, reporting all
//! proper pairwise crossings.

use crate::events::{EventKind, EventQueue, SweepEvent};
use crate::math::Point;
use crate::observer::{NoObserver, SweepObserver};
use crate::rbtree::{NodeId, RedBlackTree};
use crate::segment::Segment;
use crate::utils::{compare_positions, is_on_right};

use arrayvec::ArrayVec;
use std::cmp::Ordering;

/// Keys are evaluated slightly below the sweep line when the order at the
/// line itself is ambiguous (crossings, shared endpoints).
pub(crate) const KEY_OFFSET: f64 = 1e-6;

/// A segment currently crossed by the sweep line.
///
/// `key` is where the segment meets the sweep line, refreshed as the line
/// advances. Until the first refresh it is the segment's upper endpoint.
#[derive(Copy, Clone, Debug)]
pub(crate) struct StatusEntry {
    pub segment: Segment,
    pub key: Point,
}

impl StatusEntry {
    pub fn new(segment: Segment) -> Self {
        StatusEntry {
            segment,
            key: segment.upper(),
        }
    }

    /// Move the key to where the segment crosses the horizontal line at
    /// `line_y`. If the segment does not cross it transversally (vertical
    /// segment, endpoint on the line), the previous key is kept.
    pub fn refresh(&mut self, line_y: f64) {
        if let Some(p) = self.segment.sweep_key(line_y) {
            self.key = p;
        }
    }
}

/// Left-to-right order along the sweep line.
///
/// Two entries compare equal only when they hold the same segment
/// (endpoint order ignored), so a lookup always finds the segment it asks
/// for. Otherwise `a < b` when `b`'s key is strictly on the right of `a`'s
/// supporting line, directed from the lower endpoint up.
fn status_order(a: &StatusEntry, b: &StatusEntry) -> Ordering {
    if a.segment == b.segment {
        return Ordering::Equal;
    }
    if is_on_right(a.segment.lower(), a.segment.upper(), b.key) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// The sweep status: segments currently crossing the sweep line, ordered
/// left to right.
pub(crate) struct Status {
    tree: RedBlackTree<StatusEntry>,
}

impl Status {
    pub fn new() -> Self {
        Status {
            tree: RedBlackTree::new(),
        }
    }

    /// Re-evaluate every key against the horizontal line at `line_y`.
    ///
    /// This does not reorder anything; the caller picks a height at which
    /// the current order is still valid.
    pub fn refresh_keys(&mut self, line_y: f64) {
        for id in self.tree.in_order() {
            self.tree.key_mut(id).refresh(line_y);
        }
    }

    pub fn insert(&mut self, entry: StatusEntry) -> NodeId {
        self.tree.insert(entry, &status_order)
    }

    pub fn find(&self, segment: &Segment) -> Option<NodeId> {
        let probe = StatusEntry::new(*segment);
        self.tree.search(&probe, &status_order)
    }

    pub fn remove(&mut self, id: NodeId) -> StatusEntry {
        self.tree.remove(id)
    }

    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.successor(id)
    }

    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.predecessor(id)
    }

    pub fn swap_keys(&mut self, a: NodeId, b: NodeId) {
        self.tree.swap_keys(a, b);
    }

    #[inline]
    pub fn segment(&self, id: NodeId) -> Segment {
        self.tree.key(id).segment
    }

    pub fn in_order(&self) -> Vec<NodeId> {
        self.tree.in_order()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// The outcome of an intersection sweep.
#[derive(Clone, Debug)]
pub struct Intersections {
    /// The crossing positions, in the order the sweep reached them.
    pub points: Vec<Point>,
    /// False when the sweep lost track of its status structure on a
    /// degenerate input and stopped early. `points` then holds what was
    /// found up to that point.
    pub complete: bool,
}

/// Report all proper pairwise crossings between the given segments.
///
/// Duplicate segments are ignored. Touching endpoints and collinear
/// overlaps are not crossings. Crossings of horizontal segments are not
/// reported.
pub fn intersections(segments: &[Segment]) -> Intersections {
    intersections_with_observer(segments, &mut NoObserver)
}

/// Same as [`intersections`] with progress notifications.
pub fn intersections_with_observer(
    segments: &[Segment],
    observer: &mut dyn SweepObserver,
) -> Intersections {
    LineSweep::new(segments, observer).run()
}

struct LineSweep<'l> {
    segments: Vec<Segment>,
    queue: EventQueue,
    status: Status,
    points: Vec<Point>,
    complete: bool,
    observer: &'l mut dyn SweepObserver,
    log: bool,
}

impl<'l> LineSweep<'l> {
    fn new(segments: &[Segment], observer: &'l mut dyn SweepObserver) -> Self {
        let mut deduped: Vec<Segment> = Vec::with_capacity(segments.len());
        for s in segments {
            if s.from != s.to && !deduped.contains(s) {
                deduped.push(*s);
            }
        }

        let mut queue = EventQueue::new();
        for (i, s) in deduped.iter().enumerate() {
            queue.push(SweepEvent {
                position: s.from,
                kind: EventKind::Endpoint { segment: i },
            });
            queue.push(SweepEvent {
                position: s.to,
                kind: EventKind::Endpoint { segment: i },
            });
        }

        #[allow(unused_mut)]
        let mut log = false;
        #[cfg(debug_assertions)]
        {
            log = std::env::var("PLANE_SWEEP_LOGGING").is_ok();
        }

        LineSweep {
            segments: deduped,
            queue,
            status: Status::new(),
            points: Vec::new(),
            complete: true,
            observer,
            log,
        }
    }

    fn run(mut self) -> Intersections {
        while let Some(id) = self.queue.min() {
            let event = *self.queue.event(id);
            sweep_log!(self, "# event at {:?}", event.position);

            let ok = match event.kind {
                EventKind::Crossing { first, second } => self.crossing_event(&event, first, second),
                EventKind::Endpoint { segment } => self.endpoint_event(&event, segment),
            };
            self.observer.event_processed(event.position.y, &event);
            self.queue.remove(id);

            if !ok {
                self.complete = false;
                break;
            }
        }

        Intersections {
            points: self.points,
            complete: self.complete,
        }
    }

    /// Two segments exchange their order. Returns false when the status
    /// structure lost track of one of them, which aborts the sweep.
    fn crossing_event(&mut self, event: &SweepEvent, first: usize, second: usize) -> bool {
        self.points.push(event.position);
        self.observer.intersection_found(event.position);

        let first_node = self.status.find(&self.segments[first]);
        let second_node = self.status.find(&self.segments[second]);
        let (first_node, second_node) = match (first_node, second_node) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                sweep_log!(self, "  crossing segment missing from the status");
                return false;
            }
        };

        // Neighbors before the swap; the nodes themselves keep their
        // handles, only the two crossing entries trade places.
        let pred_1 = self.status.predecessor(first_node);
        let succ_1 = self.status.successor(first_node);
        let pred_2 = self.status.predecessor(second_node);
        let succ_2 = self.status.successor(second_node);

        self.status.swap_keys(first_node, second_node);
        self.status.refresh_keys(event.position.y + KEY_OFFSET);

        // After the swap each segment meets the other one's old neighbors.
        let mut candidates: ArrayVec<(usize, NodeId), 4> = ArrayVec::new();
        if let Some(n) = pred_1 {
            candidates.push((second, n));
        }
        if let Some(n) = succ_1 {
            candidates.push((second, n));
        }
        if let Some(n) = pred_2 {
            candidates.push((first, n));
        }
        if let Some(n) = succ_2 {
            candidates.push((first, n));
        }
        for (index, neighbor) in candidates {
            self.test_candidate_pair(event.position, index, neighbor);
        }

        true
    }

    fn endpoint_event(&mut self, event: &SweepEvent, segment: usize) -> bool {
        let s = self.segments[segment];
        let other = if event.position == s.from { s.to } else { s.from };

        if other.y > event.position.y {
            // Upper endpoint: the segment enters the status.
            self.status.refresh_keys(event.position.y);
            let node = self.status.insert(StatusEntry::new(s));
            sweep_log!(self, "  insert segment {}", segment);

            let pred = self.status.predecessor(node);
            let succ = self.status.successor(node);
            if let Some(n) = pred {
                self.test_candidate_pair(event.position, segment, n);
            }
            if let Some(n) = succ {
                self.test_candidate_pair(event.position, segment, n);
            }
        } else {
            // Lower endpoint: the segment leaves and its neighbors become
            // adjacent. Segments that never entered the status (horizontal
            // ones) are skipped.
            self.status.refresh_keys(event.position.y);
            if let Some(node) = self.status.find(&s) {
                sweep_log!(self, "  remove segment {}", segment);
                let pred = self.status.predecessor(node);
                let succ = self.status.successor(node);
                if let (Some(p), Some(n)) = (pred, succ) {
                    let pred_segment = self.status.segment(p);
                    if let Some(index) = self.segment_index(&pred_segment) {
                        self.test_candidate_pair(event.position, index, n);
                    }
                }
                self.status.remove(node);
            }
        }

        true
    }

    /// Queue a crossing between a segment and a status neighbor if it lies
    /// strictly ahead of the sweep and is not already scheduled.
    fn test_candidate_pair(&mut self, sweep_position: Point, index: usize, neighbor: NodeId) {
        let neighbor_segment = self.status.segment(neighbor);
        let neighbor_index = match self.segment_index(&neighbor_segment) {
            Some(i) => i,
            None => return,
        };
        if neighbor_index == index {
            return;
        }
        if let Some(p) = self.segments[index].intersection(&neighbor_segment) {
            if compare_positions(p, sweep_position) == Ordering::Greater
                && !self.queue.contains_position(p)
            {
                sweep_log!(self, "  queue crossing at {:?}", p);
                self.queue.push(SweepEvent {
                    position: p,
                    kind: EventKind::Crossing {
                        first: index,
                        second: neighbor_index,
                    },
                });
            }
        }
    }

    fn segment_index(&self, segment: &Segment) -> Option<usize> {
        self.segments.iter().position(|s| s == segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use rand::prelude::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(point(x1, y1), point(x2, y2))
    }

    fn brute_force(segments: &[Segment]) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if let Some(p) = segments[i].intersection(&segments[j]) {
                    if !out.contains(&p) {
                        out.push(p);
                    }
                }
            }
        }
        out
    }

    fn sorted(mut points: Vec<Point>) -> Vec<Point> {
        points.sort_by(|a, b| compare_positions(*a, *b));
        points
    }

    #[test]
    fn single_crossing() {
        let segments = [seg(0.0, 0.0, 4.0, 4.0), seg(0.0, 4.0, 4.0, 0.0)];
        let result = intersections(&segments);
        assert!(result.complete);
        assert_eq!(result.points, vec![point(2.0, 2.0)]);
    }

    #[test]
    fn no_crossings() {
        let segments = [seg(0.0, 0.0, 1.0, 4.0), seg(3.0, 0.0, 4.0, 4.0)];
        let result = intersections(&segments);
        assert!(result.complete);
        assert!(result.points.is_empty());
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        let segments = [seg(0.0, 0.0, 2.0, 4.0), seg(2.0, 4.0, 4.0, 0.0)];
        let result = intersections(&segments);
        assert!(result.complete);
        assert!(result.points.is_empty());
    }

    #[test]
    fn duplicate_segments_are_ignored() {
        let segments = [
            seg(0.0, 0.0, 4.0, 4.0),
            seg(4.0, 4.0, 0.0, 0.0),
            seg(0.0, 4.0, 4.0, 0.0),
        ];
        let result = intersections(&segments);
        assert!(result.complete);
        assert_eq!(result.points, vec![point(2.0, 2.0)]);
    }

    #[test]
    fn three_segments_pairwise() {
        // Three segments forming a triangle of crossings.
        let segments = [
            seg(0.0, 0.0, 4.0, 8.0),
            seg(4.0, 0.0, 0.0, 8.0),
            seg(0.0, 5.0, 4.0, 5.5),
        ];
        let result = intersections(&segments);
        assert!(result.complete);
        assert_eq!(
            sorted(result.points),
            sorted(brute_force(&segments))
        );
        assert_eq!(brute_force(&segments).len(), 3);
    }

    #[test]
    fn crossings_in_sweep_order() {
        let segments = [
            seg(0.0, 0.0, 0.0, 10.0),
            seg(-2.0, 2.0, 2.0, 4.0),
            seg(-2.0, 8.0, 2.0, 6.0),
        ];
        let result = intersections(&segments);
        assert!(result.complete);
        assert_eq!(result.points, vec![point(0.0, 3.0), point(0.0, 7.0)]);
    }

    #[test]
    fn concurrent_bundle_halts_with_partial_results() {
        // Four segments through (2, 2): only the first crossing discovered
        // at that position is queued, so the remaining pairs never swap and
        // the status order degrades. A fifth segment crossing the bundle
        // below has its event queued while the order is still sound; by the
        // time it is processed the lookup misses and the sweep gives up,
        // keeping the points found so far.
        let segments = [
            seg(0.0, 0.0, 4.0, 4.0),
            seg(1.0, 0.0, 3.0, 4.0),
            seg(3.0, 0.0, 1.0, 4.0),
            seg(4.0, 0.0, 0.0, 4.0),
            seg(2.53125, 1.25, 1.4375, 3.0),
        ];
        let result = intersections(&segments);
        assert!(!result.complete);
        assert_eq!(result.points.len(), 3);
        assert!(result.points.contains(&point(2.0, 2.0)));
        assert!(result.points.contains(&point(1.75, 2.5)));
    }

    #[test]
    fn matches_brute_force_on_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x1234_5678);
        for _ in 0..30 {
            let n = rng.gen_range(2..=12);
            let segments: Vec<Segment> = (0..n)
                .map(|_| {
                    seg(
                        rng.gen_range(0.0..100.0),
                        rng.gen_range(0.0..100.0),
                        rng.gen_range(0.0..100.0),
                        rng.gen_range(0.0..100.0),
                    )
                })
                .collect();

            let result = intersections(&segments);
            assert!(result.complete);
            assert_eq!(
                sorted(result.points),
                sorted(brute_force(&segments)),
                "mismatch for {:?}",
                segments
            );
        }
    }
}
