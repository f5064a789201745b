//! End to end checks combining the sweep, the subdivision and the
//! triangulation.

use plane_sweep::dcel::{edge_id, face_id, Dcel, Index};
use plane_sweep::{convex_hull, intersections, point, triangulate, Point, Segment};

fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
    Segment::new(point(x1, y1), point(x2, y2))
}

fn polygon(points: &[(f64, f64)]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        segments.push(seg(x1, y1, x2, y2));
    }
    segments
}

fn check_invariants(dcel: &Dcel) {
    for i in 0..dcel.edge_count() {
        dcel.assert_edge_invariants(edge_id(i as Index));
    }
    for i in 0..dcel.face_count() {
        dcel.assert_face_invariants(face_id(i as Index));
    }
}

#[test]
fn sweep_feeds_the_subdivision() {
    let segments = [
        seg(0.0, 0.0, 4.0, 4.0),
        seg(0.0, 4.0, 4.0, 0.0),
        seg(0.0, 1.0, 4.0, 2.0),
    ];

    let result = intersections(&segments);
    assert!(result.complete);
    // Three pairwise crossings enclosing a small triangle.
    assert_eq!(result.points.len(), 3);
    assert!(result.points.contains(&point(2.0, 2.0)));

    let dcel = Dcel::from_segments(&segments, &result.points);
    check_invariants(&dcel);

    // 6 endpoints plus 3 crossings.
    assert_eq!(dcel.vertex_count(), 9);
    // The central triangle is the only bounded face.
    assert_eq!(dcel.face_count(), 2);
}

#[test]
fn triangulation_covers_the_polygon() {
    let outline = [
        (0.0, 0.0),
        (3.0, 1.0),
        (6.0, 0.0),
        (7.0, 4.0),
        (3.0, 6.0),
        (-1.0, 4.0),
    ];
    let segments = polygon(&outline);
    let diagonals = triangulate(&segments).unwrap();
    assert_eq!(diagonals.len(), outline.len() - 3);

    // Diagonals connect polygon vertices.
    let vertices: Vec<Point> = outline.iter().map(|&(x, y)| point(x, y)).collect();
    for d in &diagonals {
        assert!(vertices.contains(&d.from));
        assert!(vertices.contains(&d.to));
        // And are not boundary edges.
        assert!(!segments.contains(d));
    }
}

#[test]
fn hull_of_polygon_vertices() {
    let points = [
        point(0.0, 0.0),
        point(4.0, 0.0),
        point(4.0, 4.0),
        point(0.0, 4.0),
        point(2.0, 2.0),
        point(1.0, 3.0),
    ];
    let hull = convex_hull(&points);
    assert_eq!(
        hull,
        vec![
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(4.0, 4.0),
            point(0.0, 4.0),
        ]
    );
}
