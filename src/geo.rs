/*!
 * Geographic types.
 *
 * Perimeters come in as planar coordinates in a projected coordinate system and are converted to
 * geodetic latitude / longitude (WGS84, WKID 4326) before any distances are calculated. See the
 * [projection] module for the conversion.
 */
use crate::error::{FireSmokeError, FireSmokeResult};
use serde::{Deserialize, Serialize};

pub mod projection;

/// A geodetic coordinate, decimal degrees (WKID 4326).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Determine if these coordinates are close to each other.
    ///
    /// The eps parameter is the maximum distance between points in the same units as the
    /// coordinates that two points can have and still be considered close.
    pub fn is_close(&self, other: Coord, eps: f64) -> bool {
        let lat_diff = self.lat - other.lat;
        let lon_diff = self.lon - other.lon;
        let distance_squared = lat_diff * lat_diff + lon_diff * lon_diff;

        distance_squared <= (eps * eps)
    }
}

/// A planar coordinate in meters in the source projection.
///
/// Serialized as a two element array, `[x, y]`, which is how the perimeter datasets list them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for ProjectedPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        ProjectedPoint { x, y }
    }
}

impl From<ProjectedPoint> for [f64; 2] {
    fn from(pnt: ProjectedPoint) -> Self {
        [pnt.x, pnt.y]
    }
}

/// A named location that fire distances are measured from.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    name: String,
    location: Coord,
}

impl Place {
    /// Create a new place.
    ///
    /// The name ends up as part of an output field name (`average_distance_from_<name>`), so it
    /// may not be empty or contain whitespace.
    pub fn new<S: Into<String>>(name: S, lat: f64, lon: f64) -> FireSmokeResult<Self> {
        let name = name.into();

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(FireSmokeError::config(format!(
                "invalid place name: '{}'",
                name
            )));
        }

        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(FireSmokeError::config(format!(
                "latitude out of range (-90.0 to 90.0): {}",
                lat
            )));
        }

        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(FireSmokeError::config(format!(
                "longitude out of range (-180.0 to 180.0): {}",
                lon
            )));
        }

        Ok(Place {
            name,
            location: Coord { lat, lon },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Coord {
        self.location
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coord_is_close() {
        let left = Coord {
            lat: 45.5,
            lon: -120.0,
        };
        let right = Coord {
            lat: 45.5000002,
            lon: -120.0000002,
        };

        assert!(left.is_close(left, 1.0e-6));
        assert!(left.is_close(right, 1.0e-6));
        assert!(!left.is_close(right, 1.0e-8));
    }

    #[test]
    fn test_place_validation() {
        let sf = Place::new("Sioux_Falls", 43.54, -96.73).unwrap();
        assert_eq!(sf.name(), "Sioux_Falls");
        assert_eq!(sf.location().lat, 43.54);

        assert!(Place::new("", 43.54, -96.73).is_err());
        assert!(Place::new("Sioux Falls", 43.54, -96.73).is_err());
        assert!(Place::new("Nowhere", 91.0, 0.0).is_err());
        assert!(Place::new("Nowhere", 0.0, -180.5).is_err());
        assert!(Place::new("Nowhere", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_projected_point_serde() {
        let pnt: ProjectedPoint = serde_json::from_str("[1.5, -2.0]").unwrap();
        assert_eq!(pnt, ProjectedPoint { x: 1.5, y: -2.0 });
        assert_eq!(serde_json::to_string(&pnt).unwrap(), "[1.5,-2.0]");
    }
}
