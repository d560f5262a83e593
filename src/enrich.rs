/*!
 * Attach distance and area information to fire records.
 */
use crate::{
    distance::mean_distance,
    error::{FireSmokeError, FireSmokeResult},
    fire::FireRecord,
    geo::{projection::Projection, Place},
};

/// The result of enriching a record.
///
/// The record is always returned. If something went wrong, the fields that couldn't be calculated
/// are missing and the reason is in `error`.
#[derive(Debug, Clone)]
pub struct Enriched {
    pub record: FireRecord,
    pub error: Option<FireSmokeError>,
}

/// Calculate the area in square miles and the mean distance from the place for a copy of the
/// record.
///
/// The distance uses the first ring of the geometry only. A bad geometry leaves the distance
/// missing rather than failing, so one bad record can't spoil a batch.
pub fn enrich(record: &FireRecord, place: &Place, projection: &Projection) -> Enriched {
    let mut record = record.clone();

    record.shape_area_miles = record.area_sq_miles();

    match average_distance(&record, place, projection) {
        Ok(dist) => {
            record.average_distance = Some(dist);
            Enriched {
                record,
                error: None,
            }
        }
        Err(err) => {
            log::debug!(target: "enrich", "record {}: {}", record.id, err);
            record.average_distance = None;
            Enriched {
                record,
                error: Some(err),
            }
        }
    }
}

fn average_distance(
    record: &FireRecord,
    place: &Place,
    projection: &Projection,
) -> FireSmokeResult<f64> {
    let geometry = record
        .rings
        .as_ref()
        .ok_or_else(|| FireSmokeError::MissingGeometry {
            msg: "record has no geometry".to_owned(),
        })?;

    let ring = geometry.primary_ring()?;
    let ring = projection.project_to_geodetic(&ring)?;

    mean_distance(place, &ring)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        error::ErrorKind,
        fire::Geometry,
        geo::{Coord, ProjectedPoint},
    };

    fn sioux_falls() -> Place {
        Place::new("Sioux_Falls", 43.54, -96.73).unwrap()
    }

    fn projected_ring(proj: &Projection, coords: &[Coord]) -> Vec<ProjectedPoint> {
        proj.project_from_geodetic(coords).unwrap()
    }

    #[test]
    fn test_enrich_uses_first_ring() {
        let place = sioux_falls();
        let proj = Projection::north_america_albers();

        let near = [
            Coord {
                lat: 44.0,
                lon: -96.0,
            },
            Coord {
                lat: 44.2,
                lon: -96.0,
            },
            Coord {
                lat: 44.2,
                lon: -95.8,
            },
            Coord {
                lat: 44.0,
                lon: -96.0,
            },
        ];
        let far = [
            Coord {
                lat: 48.0,
                lon: -90.0,
            },
            Coord {
                lat: 48.2,
                lon: -90.0,
            },
            Coord {
                lat: 48.2,
                lon: -89.8,
            },
            Coord {
                lat: 48.0,
                lon: -90.0,
            },
        ];

        let mut record = FireRecord::new(1, 2005);
        record.shape_area = Some(1.0e6);
        record.rings = Some(Geometry::Rings(vec![
            projected_ring(&proj, &near),
            projected_ring(&proj, &far),
        ]));

        let Enriched { record: out, error } = enrich(&record, &place, &proj);
        assert!(error.is_none());

        let expected = mean_distance(
            &place,
            &proj
                .project_to_geodetic(&projected_ring(&proj, &near))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(out.average_distance, Some(expected));
        assert_eq!(out.shape_area_miles, record.area_sq_miles());

        // The input is untouched.
        assert_eq!(record.average_distance, None);
    }

    #[test]
    fn test_enrich_missing_geometry() {
        let place = sioux_falls();
        let proj = Projection::north_america_albers();

        let mut record = FireRecord::new(2, 2005);
        record.shape_area = Some(2.0e6);

        let Enriched { record: out, error } = enrich(&record, &place, &proj);
        assert_eq!(out.average_distance, None);
        assert!(out.shape_area_miles.is_some());
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::MissingGeometry));

        record.rings = Some(Geometry::Encoded("not a ring".to_owned()));
        let Enriched { record: out, error } = enrich(&record, &place, &proj);
        assert_eq!(out.average_distance, None);
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::MissingGeometry));
    }

    #[test]
    fn test_enrich_bad_ring() {
        let place = sioux_falls();
        let proj = Projection::north_america_albers();

        let mut record = FireRecord::new(3, 2005);
        record.rings = Some(Geometry::Rings(vec![vec![ProjectedPoint { x: 0.0, y: 0.0 }]]));
        let Enriched { record: out, error } = enrich(&record, &place, &proj);
        assert_eq!(out.average_distance, None);
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::EmptyRing));

        record.rings = Some(Geometry::Rings(vec![vec![
            ProjectedPoint { x: 0.0, y: 0.0 },
            ProjectedPoint {
                x: f64::NAN,
                y: 0.0,
            },
        ]]));
        let Enriched { record: out, error } = enrich(&record, &place, &proj);
        assert_eq!(out.average_distance, None);
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Projection));
    }

    #[test]
    fn test_enrich_clears_stale_distance() {
        let place = sioux_falls();
        let proj = Projection::north_america_albers();

        let mut record = FireRecord::new(4, 2005);
        record.average_distance = Some(10.0);

        let Enriched { record: out, .. } = enrich(&record, &place, &proj);
        assert_eq!(out.average_distance, None);
    }
}
