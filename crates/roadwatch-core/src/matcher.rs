//! Point-on-road matching against rectangular segment buffers.
//!
//! A segment's buffer is the quadrilateral obtained by offsetting both
//! endpoints along the segment's normal by the tolerance, converted to degrees
//! at the first endpoint's latitude. Containment is an even-odd ray cast in
//! raw `(lng, lat)` space. The tolerance is the per-side offset, so a 50 m
//! tolerance gives a buffer roughly 100 m wide.
//!
//! The buffer is closed: points on an edge are inside. Both endpoints of a
//! segment sit on the buffer's cap edges and therefore always match.

use crate::area::RoadSegment;
use crate::geo::{meters_to_degrees, offset, Point, Segment, Vector};

/// Default per-side tolerance in meters.
pub const DEFAULT_BUFFER_METERS: f64 = 50.0;

/// Distance in degrees under which a point counts as lying on a buffer edge.
const BOUNDARY_EPSILON_DEG: f64 = 1e-12;

/// Corners of the buffer around `segment`, in ring order.
///
/// Returns `None` for degenerate segments and for tolerances that do not
/// convert to a finite degree offset.
#[must_use]
pub fn buffer_polygon(segment: &Segment, tolerance_meters: f64) -> Option<[Point; 4]> {
    if segment.is_degenerate() {
        return None;
    }

    let tolerance_deg = meters_to_degrees(tolerance_meters, segment.p1.lat());
    if !tolerance_deg.is_finite() {
        return None;
    }

    let n = segment.direction().normal(tolerance_deg);
    Some([
        offset(segment.p1, n, 1.0),
        offset(segment.p2, n, 1.0),
        offset(segment.p2, n, -1.0),
        offset(segment.p1, n, -1.0),
    ])
}

/// Whether `point` lies within `tolerance_meters` of `segment`'s line,
/// using the rectangular buffer approximation.
#[must_use]
pub fn is_inside_buffer(point: Point, segment: &Segment, tolerance_meters: f64) -> bool {
    let Some(corners) = buffer_polygon(segment, tolerance_meters) else {
        return false;
    };
    on_boundary(point, &corners) || ray_cast(point, &corners)
}

/// Every candidate whose buffer contains `point`.
///
/// Scans the full candidate list; several roads can legitimately match the
/// same point. Degenerate candidates are skipped with a warning.
#[must_use]
pub fn match_segments(
    point: Point,
    candidates: &[RoadSegment],
    tolerance_meters: f64,
) -> Vec<RoadSegment> {
    candidates
        .iter()
        .filter(|road| {
            if road.segment.is_degenerate() {
                tracing::warn!(
                    road_id = road.id,
                    point = %road.segment.p1,
                    "skipping degenerate road segment"
                );
                return false;
            }
            is_inside_buffer(point, &road.segment, tolerance_meters)
        })
        .copied()
        .collect()
}

fn ray_cast(point: Point, ring: &[Point]) -> bool {
    let (px, py) = (point.lng(), point.lat());
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng(), ring[i].lat());
        let (xj, yj) = (ring[j].lng(), ring[j].lat());
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn on_boundary(point: Point, ring: &[Point]) -> bool {
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if on_edge(point, ring[j], ring[i]) {
            return true;
        }
        j = i;
    }
    false
}

fn on_edge(point: Point, a: Point, b: Point) -> bool {
    let edge = Vector::between(a, b);
    let len = edge.length();
    if len == 0.0 {
        return Vector::between(a, point).length() <= BOUNDARY_EPSILON_DEG;
    }

    let distance_to_line = edge.cross(Vector::between(a, point)).abs() / len;
    if distance_to_line > BOUNDARY_EPSILON_DEG {
        return false;
    }

    let within = |v: f64, lo: f64, hi: f64| {
        v >= lo.min(hi) - BOUNDARY_EPSILON_DEG && v <= lo.max(hi) + BOUNDARY_EPSILON_DEG
    };
    within(point.lng(), a.lng(), b.lng()) && within(point.lat(), a.lat(), b.lat())
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
