#![deny(bare_trait_objects)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

//! # Plane sweep geometry
//!
//! A small collection of plane-sweep algorithms over 2D line segments:
//!
//! - [`intersections`]: report all proper pairwise segment crossings
//!   (Bentley-Ottmann style sweep).
//! - [`Dcel`](dcel::Dcel): a half-edge (doubly connected edge list) planar
//!   subdivision built from segments, with face-splitting edge insertion.
//! - [`triangulate`]: monotone decomposition followed by stack triangulation
//!   of simple polygons.
//! - [`convex_hull`]: Andrew's monotone chain.
//!
//! ## Coordinate model
//!
//! All algorithms use screen coordinates: `x` grows to the right and `y`
//! grows *downward*. The sweep line moves top to bottom, which means
//! increasing `y`. Event positions are ordered by `y` first and `x` second.
//! Orientation tests follow the same convention: a point is on the *right*
//! of a directed line when the cross product of the direction and the
//! offset to the point is positive.
//!
//! Coordinates are `f64` and comparisons are exact. Inputs in general
//! position are handled robustly; heavily degenerate inputs (overlapping
//! collinear segments, many events sharing a coordinate) degrade gracefully
//! rather than panic, see [`Intersections::complete`].

// Logging for debugging the sweep, enabled at run time through the
// PLANE_SWEEP_LOGGING environment variable in debug builds.
#[cfg(debug_assertions)]
macro_rules! sweep_log {
    ($obj:ident, $fmt_string:expr) => {
        if $obj.log {
            println!($fmt_string);
        }
    };
    ($obj:ident, $fmt_string:expr, $($args:expr),*) => {
        if $obj.log {
            println!($fmt_string, $($args),*);
        }
    };
}

#[cfg(not(debug_assertions))]
macro_rules! sweep_log {
    ($obj:ident, $fmt_string:expr) => {
        let _ = $obj;
    };
    ($obj:ident, $fmt_string:expr, $($args:expr),*) => {
        let _ = $obj;
    };
}

pub mod dcel;
pub mod events;
pub mod hull;
pub mod math;
pub mod monotone;
pub mod observer;
pub mod rbtree;
pub mod segment;
pub mod sweep;
pub mod utils;

mod error;

pub use crate::error::InternalError;
pub use crate::events::{EventKind, SweepEvent};
pub use crate::hull::{convex_hull, convex_hull_with_observer};
pub use crate::math::{point, vector, Point, Vector};
pub use crate::monotone::{triangulate, triangulate_with_observer};
pub use crate::observer::{NoObserver, SweepObserver};
pub use crate::segment::Segment;
pub use crate::sweep::{intersections, intersections_with_observer, Intersections};
pub use crate::utils::{orientation, Orientation};
