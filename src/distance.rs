/*!
 * Distances from a place to the vertices of a fire perimeter.
 *
 * All distances are inverse geodesics on the WGS84 ellipsoid, computed with Karney's algorithm as
 * implemented by the `geo` crate. They are reported in miles.
 */
use crate::{
    error::{FireSmokeError, FireSmokeResult},
    geo::{Coord, Place},
};
use ::geo::{point, GeodesicDistance};

/// Conversion factor from meters to miles.
///
/// This is the truncated value historical results were computed with, don't replace it with a
/// more precise one.
pub const METERS_TO_MILES: f64 = 0.00062137;

/// The closest vertex of a ring to a place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// Distance from the place in miles.
    pub distance_miles: f64,
    /// The vertex.
    pub point: Coord,
    /// The index of the vertex in the ring.
    pub index: usize,
}

/// Ellipsoidal distance in miles between two coordinates.
pub fn geodesic_distance_miles(from: Coord, to: Coord) -> f64 {
    let from = point!(x: from.lon, y: from.lat);
    let to = point!(x: to.lon, y: to.lat);

    from.geodesic_distance(&to) * METERS_TO_MILES
}

/// Distances in miles from the place to each vertex in the ring, in ring order.
pub fn vertex_distances(place: &Place, ring: &[Coord]) -> Vec<f64> {
    let origin = place.location();
    ring.iter()
        .map(|&vertex| geodesic_distance_miles(origin, vertex))
        .collect()
}

/// Find the vertex in the ring closest to the place.
///
/// If several vertices are the same distance away, the first one in the ring wins.
pub fn nearest_point(place: &Place, ring: &[Coord]) -> FireSmokeResult<NearestPoint> {
    let mut nearest: Option<NearestPoint> = None;

    for (index, (&point, distance_miles)) in ring
        .iter()
        .zip(vertex_distances(place, ring))
        .enumerate()
    {
        let closer = match nearest {
            Some(ref incumbent) => distance_miles < incumbent.distance_miles,
            None => true,
        };

        if closer {
            nearest = Some(NearestPoint {
                distance_miles,
                point,
                index,
            });
        }
    }

    nearest.ok_or(FireSmokeError::EmptyRing {
        points: 0,
        required: 1,
    })
}

/// The mean distance in miles from the place to the vertices of a closed ring.
///
/// The first vertex is dropped before averaging because it is repeated as the closing vertex.
/// That leaves every distinct vertex counted once.
///
/// The ring needs at least 2 vertices so at least one is left to average. Shorter rings are an
/// [EmptyRing](FireSmokeError::EmptyRing) error. A 2 vertex ring averages only its second vertex.
pub fn mean_distance(place: &Place, ring: &[Coord]) -> FireSmokeResult<f64> {
    if ring.len() < 2 {
        return Err(FireSmokeError::EmptyRing {
            points: ring.len(),
            required: 2,
        });
    }

    let distances = vertex_distances(place, ring);
    let remaining = &distances[1..];

    Ok(remaining.iter().sum::<f64>() / remaining.len() as f64)
}
