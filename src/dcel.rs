//! A doubly connected edge list (half-edge) representation of a planar
//! subdivision, built from a set of line segments.
//!
//! Edges come in twin pairs with opposite directions. Every half-edge
//! knows the next and previous half-edge along its face cycle, its origin
//! vertex and the face on its left as the cycle is walked. Cycles that
//! wind clockwise on screen bound a face's interior; counterclockwise
//! cycles are hole boundaries, attached to the face that contains them
//! (or to the unbounded face).

use crate::error::InternalError;
use crate::math::Point;
use crate::segment::Segment;
use crate::utils::{compare_positions, is_polygon_clockwise};

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;
use std::marker::PhantomData;

pub type Index = u32;
const INVALID_INDEX: Index = std::u32::MAX;

/// A strongly typed handle into one of the [`Dcel`] arenas.
pub struct Id<T> {
    handle: Index,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    #[inline]
    pub fn new(handle: Index) -> Self {
        Id {
            handle,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.handle != INVALID_INDEX
    }

    #[inline]
    pub fn to_usize(self) -> usize {
        self.handle as usize
    }
}

impl<T> Copy for Id<T> {}
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}
impl<T> Eq for Id<T> {}
impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

#[doc(hidden)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vertex_;
#[doc(hidden)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge_;
#[doc(hidden)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Face_;

pub type VertexId = Id<Vertex_>;
pub type EdgeId = Id<Edge_>;
pub type FaceId = Id<Face_>;

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v#{}", self.handle)
    }
}
impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "e#{}", self.handle)
    }
}
impl fmt::Debug for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "f#{}", self.handle)
    }
}

#[inline]
pub fn vertex_id(handle: Index) -> VertexId {
    VertexId::new(handle)
}
#[inline]
pub fn edge_id(handle: Index) -> EdgeId {
    EdgeId::new(handle)
}
#[inline]
pub fn face_id(handle: Index) -> FaceId {
    FaceId::new(handle)
}

#[inline]
pub fn no_edge() -> EdgeId {
    EdgeId::new(INVALID_INDEX)
}
#[inline]
pub fn no_face() -> FaceId {
    FaceId::new(INVALID_INDEX)
}

#[derive(Clone, Debug)]
pub struct VertexData {
    pub position: Point,
    /// Some half-edge leaving this vertex.
    pub edge: EdgeId,
}

#[derive(Clone, Debug)]
pub struct HalfEdgeData {
    pub next: EdgeId,
    pub prev: EdgeId,
    pub twin: EdgeId,
    pub origin: VertexId,
    /// The face on the left of this half-edge.
    pub face: FaceId,
}

#[derive(Clone, Debug)]
pub struct FaceData {
    /// A half-edge of the outer cycle, invalid for the unbounded face.
    pub edge: EdgeId,
    /// One half-edge per hole cycle inside this face.
    pub inner_edges: Vec<EdgeId>,
    /// True for the single unbounded face.
    pub is_outer: bool,
}

pub struct Dcel {
    vertices: Vec<VertexData>,
    edges: Vec<HalfEdgeData>,
    faces: Vec<FaceData>,
}

impl Dcel {
    pub fn new() -> Self {
        Dcel {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Build a subdivision from segments, subdividing each one at the
    /// `split_points` that lie on it (typically crossing points reported by
    /// the intersection sweep).
    pub fn from_segments(segments: &[Segment], split_points: &[Point]) -> Dcel {
        let mut dcel = Dcel::new();

        let mut sub_edges: Vec<(VertexId, VertexId)> = Vec::new();
        for segment in segments {
            if segment.from == segment.to {
                continue;
            }
            let mut chain = vec![segment.from, segment.to];
            for &p in split_points {
                if p != segment.from && p != segment.to && segment.contains_point(p) {
                    chain.push(p);
                }
            }
            // Sort along the segment.
            let origin = segment.from;
            let dir = segment.to - segment.from;
            chain.sort_by(|a, b| {
                let ta = (*a - origin).dot(dir);
                let tb = (*b - origin).dot(dir);
                ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
            });
            chain.dedup();

            for window in chain.windows(2) {
                let v1 = dcel.add_vertex(window[0]);
                let v2 = dcel.add_vertex(window[1]);
                let key = if v1.to_usize() < v2.to_usize() {
                    (v1, v2)
                } else {
                    (v2, v1)
                };
                if !sub_edges.contains(&key) {
                    sub_edges.push(key);
                    dcel.add_twin_pair(v1, v2);
                }
            }
        }

        dcel.link_next_edges();
        dcel.build_faces();

        dcel
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &VertexData {
        &self.vertices[id.to_usize()]
    }
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &HalfEdgeData {
        &self.edges[id.to_usize()]
    }
    #[inline]
    pub fn face(&self, id: FaceId) -> &FaceData {
        &self.faces[id.to_usize()]
    }

    #[inline]
    pub fn position(&self, id: VertexId) -> Point {
        self.vertices[id.to_usize()].position
    }

    /// The vertex at exactly this position, if any.
    pub fn find_vertex(&self, position: Point) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|v| v.position == position)
            .map(|i| vertex_id(i as Index))
    }

    /// Add a vertex, reusing the existing one if the position is already
    /// present.
    pub fn add_vertex(&mut self, position: Point) -> VertexId {
        if let Some(id) = self.find_vertex(position) {
            return id;
        }
        let id = vertex_id(self.vertices.len() as Index);
        self.vertices.push(VertexData {
            position,
            edge: no_edge(),
        });
        id
    }

    /// The next half-edge leaving the same origin, rotating around the
    /// vertex.
    #[inline]
    pub fn next_edge_around_vertex(&self, id: EdgeId) -> EdgeId {
        let twin = self.edges[id.to_usize()].twin;
        self.edges[twin.to_usize()].next
    }

    /// Walk the outer cycle of a face. Empty for the unbounded face.
    pub fn walk_face(&self, id: FaceId) -> FaceEdges {
        let start = self.faces[id.to_usize()].edge;
        FaceEdges {
            dcel: self,
            current: start,
            start,
            done: !start.is_valid(),
        }
    }

    /// The origins of the outer cycle of a face, in cycle order.
    pub fn face_vertices(&self, id: FaceId) -> Vec<VertexId> {
        self.walk_face(id).map(|e| self.edge(e).origin).collect()
    }

    /// Insert the two half-edges of an edge between `u` and `v`, splitting
    /// the bounded face they share.
    ///
    /// The existing face keeps the cycle through the first returned
    /// half-edge (origin `u`); a new face is created for the cycle through
    /// the second one.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<(EdgeId, EdgeId), InternalError> {
        let face = self.common_face(u, v).ok_or(InternalError::NoCommonFace)?;
        let prev_1 = self
            .edge_into_vertex_on_face(u, face)
            .ok_or(InternalError::NoCommonFace)?;
        let prev_2 = self
            .edge_into_vertex_on_face(v, face)
            .ok_or(InternalError::NoCommonFace)?;

        let he_1 = edge_id(self.edges.len() as Index);
        let he_2 = edge_id(self.edges.len() as Index + 1);
        let next_1 = self.edges[prev_2.to_usize()].next;
        let next_2 = self.edges[prev_1.to_usize()].next;

        self.edges.push(HalfEdgeData {
            next: next_1,
            prev: prev_1,
            twin: he_2,
            origin: u,
            face,
        });
        self.edges.push(HalfEdgeData {
            next: next_2,
            prev: prev_2,
            twin: he_1,
            origin: v,
            face,
        });
        self.edges[prev_1.to_usize()].next = he_1;
        self.edges[next_1.to_usize()].prev = he_1;
        self.edges[prev_2.to_usize()].next = he_2;
        self.edges[next_2.to_usize()].prev = he_2;

        // The old face keeps the cycle through he_1, the cycle through
        // he_2 becomes a new face.
        let new_face = face_id(self.faces.len() as Index);
        self.faces.push(FaceData {
            edge: he_2,
            inner_edges: Vec::new(),
            is_outer: false,
        });
        self.faces[face.to_usize()].edge = he_1;

        let mut e = he_2;
        loop {
            self.edges[e.to_usize()].face = new_face;
            e = self.edges[e.to_usize()].next;
            if e == he_2 {
                break;
            }
        }

        #[cfg(debug_assertions)]
        {
            self.assert_face_invariants(face);
            self.assert_face_invariants(new_face);
        }

        Ok((he_1, he_2))
    }

    /// The first bounded face incident to both vertices.
    ///
    /// The unbounded face does not count: a diagonal is only meaningful
    /// across a face interior.
    fn common_face(&self, u: VertexId, v: VertexId) -> Option<FaceId> {
        let mut faces_u = Vec::new();
        self.for_each_face_around_vertex(u, |f| faces_u.push(f));

        let mut found = None;
        self.for_each_face_around_vertex(v, |f| {
            if found.is_none() && !self.faces[f.to_usize()].is_outer && faces_u.contains(&f) {
                found = Some(f);
            }
        });
        found
    }

    fn for_each_face_around_vertex<F>(&self, v: VertexId, mut callback: F)
    where
        F: FnMut(FaceId),
    {
        let start = self.vertices[v.to_usize()].edge;
        if !start.is_valid() {
            return;
        }
        let mut e = start;
        let mut guard = 0;
        loop {
            callback(self.edges[e.to_usize()].face);
            e = self.next_edge_around_vertex(e);
            guard += 1;
            if e == start || guard > self.edges.len() {
                break;
            }
        }
    }

    /// A half-edge of `face` whose destination is `v`.
    fn edge_into_vertex_on_face(&self, v: VertexId, face: FaceId) -> Option<EdgeId> {
        let start = self.vertices[v.to_usize()].edge;
        if !start.is_valid() {
            return None;
        }
        let mut e = start;
        let mut guard = 0;
        loop {
            let incoming = self.edges[e.to_usize()].twin;
            if self.edges[incoming.to_usize()].face == face {
                return Some(incoming);
            }
            e = self.next_edge_around_vertex(e);
            guard += 1;
            if e == start || guard > self.edges.len() {
                return None;
            }
        }
    }

    fn add_twin_pair(&mut self, v1: VertexId, v2: VertexId) -> (EdgeId, EdgeId) {
        let h1 = edge_id(self.edges.len() as Index);
        let h2 = edge_id(self.edges.len() as Index + 1);
        self.edges.push(HalfEdgeData {
            next: no_edge(),
            prev: no_edge(),
            twin: h2,
            origin: v1,
            face: no_face(),
        });
        self.edges.push(HalfEdgeData {
            next: no_edge(),
            prev: no_edge(),
            twin: h1,
            origin: v2,
            face: no_face(),
        });
        self.vertices[v1.to_usize()].edge = h1;
        self.vertices[v2.to_usize()].edge = h2;
        (h1, h2)
    }

    /// Chain the half-edges around each vertex: the next of a half-edge
    /// arriving at a vertex is the outgoing half-edge making the largest
    /// clockwise rotation from it. The twin (angle zero) is picked only for
    /// dead ends.
    fn link_next_edges(&mut self) {
        let mut outgoing: Vec<Vec<EdgeId>> = vec![Vec::new(); self.vertices.len()];
        for i in 0..self.edges.len() {
            let e = edge_id(i as Index);
            outgoing[self.edges[i].origin.to_usize()].push(e);
        }

        for i in 0..self.edges.len() {
            let e = edge_id(i as Index);
            let twin = self.edges[i].twin;
            let head = self.edges[twin.to_usize()].origin;
            let tail_pos = self.position(self.edges[i].origin);
            let head_pos = self.position(head);

            let mut best: Option<(EdgeId, f64)> = None;
            for &candidate in &outgoing[head.to_usize()] {
                let target = self.edges[self.edges[candidate.to_usize()].twin.to_usize()].origin;
                let angle = rotation_angle(head_pos, tail_pos, self.position(target));
                match best {
                    Some((_, best_angle)) if angle < best_angle => {}
                    _ => best = Some((candidate, angle)),
                }
            }
            if let Some((next, _)) = best {
                self.edges[e.to_usize()].next = next;
                self.edges[next.to_usize()].prev = e;
            }
        }
    }

    /// Partition the half-edges into cycles and assign faces: clockwise
    /// cycles bound faces, counterclockwise cycles are attached as holes of
    /// the nearest containing face, or of the unbounded face.
    fn build_faces(&mut self) {
        let edge_count = self.edges.len();
        let mut cycles: Vec<Vec<EdgeId>> = Vec::new();
        let mut visited = vec![false; edge_count];
        for i in 0..edge_count {
            if visited[i] {
                continue;
            }
            let start = edge_id(i as Index);
            let mut cycle = Vec::new();
            let mut e = start;
            loop {
                visited[e.to_usize()] = true;
                cycle.push(e);
                e = self.edges[e.to_usize()].next;
                if e == start || cycle.len() > edge_count {
                    break;
                }
            }
            cycles.push(cycle);
        }

        let mut hole_cycles = Vec::new();
        let mut bounded: Vec<(FaceId, Vec<EdgeId>)> = Vec::new();
        for cycle in cycles {
            let points: Vec<Point> = cycle
                .iter()
                .map(|&e| self.position(self.edges[e.to_usize()].origin))
                .collect();
            if is_polygon_clockwise(&points) {
                let face = face_id(self.faces.len() as Index);
                self.faces.push(FaceData {
                    edge: cycle[0],
                    inner_edges: Vec::new(),
                    is_outer: false,
                });
                for &e in &cycle {
                    self.edges[e.to_usize()].face = face;
                }
                bounded.push((face, cycle));
            } else {
                hole_cycles.push(cycle);
            }
        }

        let outer = face_id(self.faces.len() as Index);
        self.faces.push(FaceData {
            edge: no_edge(),
            inner_edges: Vec::new(),
            is_outer: true,
        });

        for cycle in hole_cycles {
            let face = self.containing_face(&cycle, &bounded).unwrap_or(outer);
            for &e in &cycle {
                self.edges[e.to_usize()].face = face;
            }
            self.faces[face.to_usize()].inner_edges.push(cycle[0]);
        }
    }

    /// The nearest bounded face whose outer cycle contains the given hole
    /// cycle, determined by the parity of crossings of a leftward
    /// horizontal ray.
    fn containing_face(
        &self,
        cycle: &[EdgeId],
        bounded: &[(FaceId, Vec<EdgeId>)],
    ) -> Option<FaceId> {
        // Probe from the topmost vertex of the cycle so that the cycle's
        // own boundary can never produce a crossing.
        let mut probe = self.position(self.edges[cycle[0].to_usize()].origin);
        for &e in cycle {
            let p = self.position(self.edges[e.to_usize()].origin);
            if compare_positions(p, probe) == Ordering::Less {
                probe = p;
            }
        }

        let mut best: Option<(FaceId, f64)> = None;
        for (face, boundary) in bounded {
            let mut crossings = 0;
            let mut nearest = std::f64::MAX;
            for &e in boundary {
                let p1 = self.position(self.edges[e.to_usize()].origin);
                let p2 = self.position(self.edges[self.edges[e.to_usize()].twin.to_usize()].origin);
                let spans = (p1.y > probe.y && probe.y > p2.y) || (p1.y < probe.y && probe.y < p2.y);
                if !spans || (probe.x <= p1.x && probe.x <= p2.x) {
                    continue;
                }
                let t = (probe.y - p1.y) / (p2.y - p1.y);
                let x = p1.x + t * (p2.x - p1.x);
                let distance = probe.x - x;
                if distance >= 0.0 {
                    crossings += 1;
                    if distance < nearest {
                        nearest = distance;
                    }
                }
            }
            if crossings % 2 == 1 {
                match best {
                    Some((_, d)) if d <= nearest => {}
                    _ => best = Some((*face, nearest)),
                }
            }
        }

        best.map(|(face, _)| face)
    }

    #[cfg(debug_assertions)]
    pub fn assert_edge_invariants(&self, id: EdgeId) {
        let edge = self.edge(id);
        assert_eq!(id, self.edge(edge.twin).twin);
        assert_eq!(id, self.edge(edge.next).prev);
        assert_eq!(id, self.edge(edge.prev).next);
        assert_eq!(edge.origin, self.edge(self.edge(edge.prev).twin).origin);
        assert_eq!(
            self.edge(edge.next).origin,
            self.edge(edge.twin).origin
        );
    }

    #[cfg(debug_assertions)]
    pub fn assert_face_invariants(&self, id: FaceId) {
        for e in self.walk_face(id) {
            self.assert_edge_invariants(e);
            assert_eq!(self.edge(e).face, id);
        }
    }
}

impl Default for Dcel {
    fn default() -> Self {
        Self::new()
    }
}

/// Clockwise rotation at `pivot` from the direction toward `from` to the
/// direction toward `to`, in `[0, 2*PI)`.
fn rotation_angle(pivot: Point, from: Point, to: Point) -> f64 {
    let theta_1 = (pivot.x - from.x).atan2(pivot.y - from.y);
    let theta_2 = (pivot.x - to.x).atan2(pivot.y - to.y);
    let mut theta = theta_2 - theta_1;
    while theta < 0.0 {
        theta += 2.0 * PI;
    }
    while theta >= 2.0 * PI {
        theta -= 2.0 * PI;
    }
    theta
}

/// Iterator over the half-edges of a face's outer cycle.
pub struct FaceEdges<'l> {
    dcel: &'l Dcel,
    current: EdgeId,
    start: EdgeId,
    done: bool,
}

impl<'l> Iterator for FaceEdges<'l> {
    type Item = EdgeId;
    fn next(&mut self) -> Option<EdgeId> {
        if self.done {
            return None;
        }
        let result = self.current;
        self.current = self.dcel.edge(self.current).next;
        if self.current == self.start {
            self.done = true;
        }
        Some(result)
    }
}
