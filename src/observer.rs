//! Hooks for inspecting the progress of the sweep algorithms.

use crate::events::SweepEvent;
use crate::math::Point;

/// Receives notifications while an algorithm runs.
///
/// This is purely observational: implementations cannot influence the
/// computation. Useful for visualization and for debugging the sweep.
pub trait SweepObserver {
    /// The sweep line finished processing an event.
    fn event_processed(&mut self, sweep_y: f64, event: &SweepEvent) {
        let _ = (sweep_y, event);
    }

    /// A crossing was reported.
    fn intersection_found(&mut self, position: Point) {
        let _ = position;
    }

    /// A diagonal was inserted during monotone decomposition or
    /// triangulation.
    fn diagonal_inserted(&mut self, from: Point, to: Point) {
        let _ = (from, to);
    }

    /// A point was accepted on the convex hull.
    fn hull_vertex(&mut self, position: Point) {
        let _ = position;
    }
}

/// An observer that silently ignores everything.
pub struct NoObserver;

impl SweepObserver for NoObserver {}
