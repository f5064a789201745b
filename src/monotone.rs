//! Triangulation of simple polygons: decompose each bounded face into
//! y-monotone pieces, then triangulate every monotone piece with the
//! classic stack walk.
//!
//! Decomposition diagonals are inserted into the subdivision (so faces
//! stay consistent); triangulation diagonals are only reported.

use crate::dcel::{face_id, Dcel, FaceId, Index, VertexId};
use crate::error::InternalError;
use crate::math::{point, Point};
use crate::observer::{NoObserver, SweepObserver};
use crate::rbtree::NodeId;
use crate::segment::Segment;
use crate::sweep::{Status, StatusEntry, KEY_OFFSET};
use crate::utils::{compare_positions, is_on_right, is_polygon_clockwise};

use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VertexType {
    Start,
    Split,
    End,
    Merge,
    Regular,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Triangulate the polygons described by `segments`.
///
/// The segments must form the boundaries of disjoint simple polygons (in
/// any order and direction). The returned segments are the inserted
/// diagonals: every bounded face of the input, cut along these diagonals,
/// falls apart into triangles.
pub fn triangulate(segments: &[Segment]) -> Result<Vec<Segment>, InternalError> {
    triangulate_with_observer(segments, &mut NoObserver)
}

/// Same as [`triangulate`] with progress notifications.
pub fn triangulate_with_observer(
    segments: &[Segment],
    observer: &mut dyn SweepObserver,
) -> Result<Vec<Segment>, InternalError> {
    let mut dcel = Dcel::from_segments(segments, &[]);
    let mut diagonals = decompose(&mut dcel, observer)?;

    for i in 0..dcel.face_count() {
        let face = face_id(i as Index);
        // Faces with holes are not simple polygons, leave them alone.
        let skip = dcel.face(face).is_outer || !dcel.face(face).inner_edges.is_empty();
        if !skip {
            triangulate_monotone_face(&dcel, face, &mut diagonals, observer);
        }
    }

    Ok(diagonals)
}

/// Insert diagonals until every bounded face is y-monotone.
fn decompose(
    dcel: &mut Dcel,
    observer: &mut dyn SweepObserver,
) -> Result<Vec<Segment>, InternalError> {
    // The counterclockwise boundary cycles are the ones recorded as hole
    // cycles; walking them gives each polygon's vertices in
    // counterclockwise order, independent of how the input segments were
    // directed.
    let mut cycle_starts = Vec::new();
    for i in 0..dcel.face_count() {
        cycle_starts.extend_from_slice(&dcel.face(face_id(i as Index)).inner_edges);
    }

    let mut next_ccw = HashMap::new();
    let mut prev_ccw = HashMap::new();
    for &start in &cycle_starts {
        let mut e = start;
        loop {
            let next = dcel.edge(e).next;
            let u = dcel.edge(e).origin;
            let v = dcel.edge(next).origin;
            next_ccw.insert(u, v);
            prev_ccw.insert(v, u);
            e = next;
            if e == start {
                break;
            }
        }
    }

    let mut events: Vec<VertexId> = (0..dcel.vertex_count())
        .map(|i| crate::dcel::vertex_id(i as Index))
        .collect();
    events.sort_by(|&a, &b| compare_positions(dcel.position(a), dcel.position(b)));

    // Interior parity rays shoot to the right of everything.
    let mut ray_x = 0.0_f64;
    for &v in &events {
        ray_x = ray_x.max(dcel.position(v).x);
    }
    ray_x += 1.0;

    let mut decomposer = Decomposer {
        dcel,
        next_ccw,
        prev_ccw,
        crossing: Status::new(),
        helpers: Status::new(),
        helper_vertex: HashMap::new(),
        vertex_types: HashMap::new(),
        diagonals: Vec::new(),
        ray_x,
        observer,
    };

    for v in events {
        decomposer.process(v)?;
    }

    Ok(decomposer.diagonals)
}

struct Decomposer<'l> {
    dcel: &'l mut Dcel,
    next_ccw: HashMap<VertexId, VertexId>,
    prev_ccw: HashMap<VertexId, VertexId>,
    /// All polygon edges currently crossing the sweep line, for interior
    /// parity tests.
    crossing: Status,
    /// The edges bounding a monotone piece on its left, each with a helper
    /// vertex.
    helpers: Status,
    helper_vertex: HashMap<NodeId, VertexId>,
    vertex_types: HashMap<VertexId, VertexType>,
    diagonals: Vec<Segment>,
    ray_x: f64,
    observer: &'l mut dyn SweepObserver,
}

impl<'l> Decomposer<'l> {
    fn process(&mut self, v: VertexId) -> Result<(), InternalError> {
        let (next, prev) = match (self.next_ccw.get(&v), self.prev_ccw.get(&v)) {
            (Some(&n), Some(&p)) => (n, p),
            // Not on any polygon boundary.
            _ => return Ok(()),
        };

        let position = self.dcel.position(v);
        let y = position.y;
        self.crossing.refresh_keys(y + KEY_OFFSET);
        self.helpers.refresh_keys(y + KEY_OFFSET);

        let edge_next = Segment::new(position, self.dcel.position(next));
        let edge_prev = Segment::new(position, self.dcel.position(prev));
        self.toggle_crossing(edge_next, y);
        self.toggle_crossing(edge_prev, y);

        let vertex_type = self.classify(position, next, prev);
        self.vertex_types.insert(v, vertex_type);

        match vertex_type {
            VertexType::Start => {
                self.insert_helper(edge_next, y, v);
            }
            VertexType::Split => {
                let node = self.insert_helper(edge_next, y, v);
                let left = self
                    .helpers
                    .predecessor(node)
                    .ok_or(InternalError::MissingHelperEdge)?;
                let helper = self.helper(left)?;
                self.add_diagonal(v, helper)?;
                self.helper_vertex.insert(left, v);
            }
            VertexType::End => {
                let node = self.find_helper(&edge_prev)?;
                let helper = self.helper(node)?;
                if self.is_merge(helper) {
                    self.add_diagonal(v, helper)?;
                }
                self.remove_helper(node);
            }
            VertexType::Merge => {
                let node = self.find_helper(&edge_prev)?;
                let helper = self.helper(node)?;
                if self.is_merge(helper) {
                    self.add_diagonal(v, helper)?;
                }
                let left = self.helpers.predecessor(node);
                self.remove_helper(node);

                let left = left.ok_or(InternalError::MissingHelperEdge)?;
                let left_helper = self.helper(left)?;
                if self.is_merge(left_helper) {
                    self.add_diagonal(v, left_helper)?;
                }
                self.helper_vertex.insert(left, v);
            }
            VertexType::Regular => {
                // The interior is on the right of v exactly when the
                // boundary descends through it in counterclockwise order.
                let descends =
                    compare_positions(self.dcel.position(prev), position) == Ordering::Less;
                if descends {
                    let node = self.find_helper(&edge_prev)?;
                    let helper = self.helper(node)?;
                    if self.is_merge(helper) {
                        self.add_diagonal(v, helper)?;
                    }
                    self.remove_helper(node);
                    self.insert_helper(edge_next, y, v);
                } else {
                    // Find the edge directly to the left of v; the edge
                    // toward prev is inserted temporarily when needed to
                    // locate the spot.
                    let left = match self.helpers.find(&edge_prev) {
                        Some(node) => self.helpers.predecessor(node),
                        None => {
                            let probe = self.helpers.insert(entry_at(edge_prev, y));
                            let left = self.helpers.predecessor(probe);
                            self.helpers.remove(probe);
                            left
                        }
                    };
                    let left = left.ok_or(InternalError::MissingHelperEdge)?;
                    let helper = self.helper(left)?;
                    if self.is_merge(helper) {
                        self.add_diagonal(v, helper)?;
                    }
                    self.helper_vertex.insert(left, v);
                }
            }
        }

        Ok(())
    }

    fn classify(&self, position: Point, next: VertexId, prev: VertexId) -> VertexType {
        let next_after =
            compare_positions(self.dcel.position(next), position) == Ordering::Greater;
        let prev_after =
            compare_positions(self.dcel.position(prev), position) == Ordering::Greater;

        if next_after && prev_after {
            if self.interior_on_right(position) {
                VertexType::Split
            } else {
                VertexType::Start
            }
        } else if !next_after && !prev_after {
            if self.interior_on_right(position) {
                VertexType::Merge
            } else {
                VertexType::End
            }
        } else {
            VertexType::Regular
        }
    }

    /// Parity of the boundary crossings of a rightward ray from `position`.
    ///
    /// Edges incident to the position, or with an endpoint exactly at the
    /// ray height, merely touch the ray and contribute nothing.
    fn interior_on_right(&self, position: Point) -> bool {
        let ray = Segment::new(position, point(self.ray_x, position.y));
        let mut count = 0;
        for id in self.crossing.in_order() {
            if ray.intersection(&self.crossing.segment(id)).is_some() {
                count += 1;
            }
        }

        count % 2 == 1
    }

    fn toggle_crossing(&mut self, edge: Segment, y: f64) {
        if let Some(node) = self.crossing.find(&edge) {
            self.crossing.remove(node);
        } else {
            self.crossing.insert(entry_at(edge, y));
        }
    }

    fn insert_helper(&mut self, edge: Segment, y: f64, helper: VertexId) -> NodeId {
        let node = self.helpers.insert(entry_at(edge, y));
        self.helper_vertex.insert(node, helper);
        node
    }

    fn find_helper(&self, edge: &Segment) -> Result<NodeId, InternalError> {
        self.helpers
            .find(edge)
            .ok_or(InternalError::MissingHelperEdge)
    }

    fn helper(&self, node: NodeId) -> Result<VertexId, InternalError> {
        self.helper_vertex
            .get(&node)
            .copied()
            .ok_or(InternalError::MissingHelperEdge)
    }

    fn remove_helper(&mut self, node: NodeId) {
        self.helpers.remove(node);
        self.helper_vertex.remove(&node);
    }

    fn is_merge(&self, v: VertexId) -> bool {
        self.vertex_types.get(&v) == Some(&VertexType::Merge)
    }

    fn add_diagonal(&mut self, a: VertexId, b: VertexId) -> Result<(), InternalError> {
        self.dcel.add_edge(a, b)?;
        let from = self.dcel.position(a);
        let to = self.dcel.position(b);
        self.observer.diagonal_inserted(from, to);
        self.diagonals.push(Segment::new(from, to));
        Ok(())
    }
}

fn entry_at(edge: Segment, y: f64) -> StatusEntry {
    let mut entry = StatusEntry::new(edge);
    entry.refresh(y + KEY_OFFSET);
    entry
}

/// Whether the triangle `(v, last, candidate)` opens toward the polygon
/// interior for a vertex on the given chain.
fn diagonal_ok(v: Point, last: Point, candidate: Point, side: Side) -> bool {
    let right = is_on_right(v, last, candidate);
    match side {
        Side::Right => !right,
        Side::Left => right,
    }
}

/// Emit the diagonals triangulating one y-monotone face.
fn triangulate_monotone_face(
    dcel: &Dcel,
    face: FaceId,
    diagonals: &mut Vec<Segment>,
    observer: &mut dyn SweepObserver,
) {
    let cycle = dcel.face_vertices(face);
    let n = cycle.len();
    if n <= 3 {
        return;
    }

    let positions: Vec<Point> = cycle.iter().map(|&v| dcel.position(v)).collect();

    let mut top = 0;
    let mut bottom = 0;
    for i in 1..n {
        if compare_positions(positions[i], positions[top]) == Ordering::Less {
            top = i;
        }
        if compare_positions(positions[i], positions[bottom]) == Ordering::Greater {
            bottom = i;
        }
    }

    // Walking the cycle from top to bottom follows the right chain when
    // the cycle winds clockwise on screen (bounded faces always do; this
    // stays correct either way).
    let clockwise = is_polygon_clockwise(&positions);
    let (forward, backward) = if clockwise {
        (Side::Right, Side::Left)
    } else {
        (Side::Left, Side::Right)
    };
    let mut side = vec![backward; n];
    let mut i = top;
    while i != bottom {
        side[i] = forward;
        i = (i + 1) % n;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| compare_positions(positions[a], positions[b]));

    let mut emit = |a: usize, b: usize| {
        observer.diagonal_inserted(positions[a], positions[b]);
        diagonals.push(Segment::new(positions[a], positions[b]));
    };

    let mut stack: Vec<usize> = vec![order[0], order[1]];
    for k in 2..(n - 1) {
        let j = order[k];
        if side[j] != side[stack[stack.len() - 1]] {
            // Opposite chain: j sees the whole stack except its deepest
            // vertex, which it is adjacent to.
            while let Some(t) = stack.pop() {
                if stack.is_empty() {
                    break;
                }
                emit(j, t);
            }
            stack.push(order[k - 1]);
            stack.push(j);
        } else {
            // Same chain: pop as long as the diagonal stays inside.
            let mut last = match stack.pop() {
                Some(t) => t,
                None => break,
            };
            while let Some(&t) = stack.last() {
                if diagonal_ok(positions[j], positions[last], positions[t], side[j]) {
                    stack.pop();
                    emit(j, t);
                    last = t;
                } else {
                    break;
                }
            }
            stack.push(last);
            stack.push(j);
        }
    }

    // The bottom vertex sees every remaining stack vertex except the two
    // it is adjacent to (the top and bottom of the stack).
    let j = order[n - 1];
    stack.pop();
    while stack.len() > 1 {
        if let Some(t) = stack.pop() {
            emit(j, t);
        }
    }
}
