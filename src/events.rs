//! The sweep event queue.
//!
//! Events are kept in a red-black tree ordered by position (`y` first,
//! `x` second) rather than a binary heap, because the sweep needs to ask
//! whether a position is already scheduled before queuing a crossing, and
//! it removes events by handle once they are processed.

use crate::math::Point;
use crate::rbtree::{NodeId, RedBlackTree};
use crate::utils::compare_positions;
use std::cmp::Ordering;

/// What the sweep line ran into at an event position.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum EventKind {
    /// An endpoint of a segment (index into the deduplicated input).
    Endpoint { segment: usize },
    /// A crossing discovered between two segments.
    Crossing { first: usize, second: usize },
}

/// A position the sweep line stops at.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SweepEvent {
    pub position: Point,
    pub kind: EventKind,
}

fn event_order(a: &SweepEvent, b: &SweepEvent) -> Ordering {
    compare_positions(a.position, b.position)
}

pub struct EventQueue {
    tree: RedBlackTree<SweepEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            tree: RedBlackTree::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn push(&mut self, event: SweepEvent) -> NodeId {
        self.tree.insert(event, &event_order)
    }

    /// Whether some event is already scheduled at this exact position.
    pub fn contains_position(&self, position: Point) -> bool {
        let probe = SweepEvent {
            position,
            kind: EventKind::Endpoint { segment: 0 },
        };
        self.tree.search(&probe, &event_order).is_some()
    }

    /// The next event in sweep order.
    pub fn min(&self) -> Option<NodeId> {
        self.tree.min_node()
    }

    pub fn event(&self, id: NodeId) -> &SweepEvent {
        self.tree.key(id)
    }

    pub fn remove(&mut self, id: NodeId) -> SweepEvent {
        self.tree.remove(id)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn pops_in_sweep_order() {
        let mut queue = EventQueue::new();
        let positions = [
            point(3.0, 2.0),
            point(0.0, 5.0),
            point(1.0, 2.0),
            point(4.0, 0.0),
        ];
        for (i, &p) in positions.iter().enumerate() {
            queue.push(SweepEvent {
                position: p,
                kind: EventKind::Endpoint { segment: i },
            });
        }

        let mut popped = Vec::new();
        while let Some(id) = queue.min() {
            popped.push(queue.remove(id).position);
        }
        assert_eq!(
            popped,
            vec![
                point(4.0, 0.0),
                point(1.0, 2.0),
                point(3.0, 2.0),
                point(0.0, 5.0),
            ]
        );
    }

    #[test]
    fn position_lookup() {
        let mut queue = EventQueue::new();
        queue.push(SweepEvent {
            position: point(2.0, 2.0),
            kind: EventKind::Crossing { first: 0, second: 1 },
        });
        assert!(queue.contains_position(point(2.0, 2.0)));
        assert!(!queue.contains_position(point(2.0, 3.0)));
    }
}
