/*!
 * A crude estimate of how much smoke from a fire reaches the place.
 *
 * The estimate is the burned area divided by the square of the distance. Bigger fires make more
 * smoke and it spreads out evenly as it travels. Wind, terrain, and fuel type are all ignored.
 */
use crate::fire::FireRecord;

/// Smoke impact score, square miles of burned area per square mile of distance.
///
/// Missing if the area or distance is missing, or if the distance is zero. Never NaN or infinite.
pub fn smoke_impact(record: &FireRecord) -> Option<f64> {
    let area = record.shape_area_miles?;
    let distance = record.average_distance?;

    if distance == 0.0 {
        return None;
    }

    Some(area / (distance * distance)).filter(|score| score.is_finite())
}

/// Attach the smoke impact score to a copy of the record.
pub fn score(record: &FireRecord) -> FireRecord {
    let mut record = record.clone();
    record.smoke_impact = smoke_impact(&record);
    record
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(area: Option<f64>, distance: Option<f64>) -> FireRecord {
        let mut record = FireRecord::new(1, 2010);
        record.shape_area_miles = area;
        record.average_distance = distance;
        record
    }

    #[test]
    fn test_smoke_impact() {
        assert_eq!(smoke_impact(&record(Some(50.0), Some(10.0))), Some(0.5));
        assert_eq!(smoke_impact(&record(Some(0.0), Some(10.0))), Some(0.0));
    }

    #[test]
    fn test_zero_distance_is_missing() {
        assert_eq!(smoke_impact(&record(Some(50.0), Some(0.0))), None);
        assert_eq!(smoke_impact(&record(Some(0.0), Some(0.0))), None);
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(smoke_impact(&record(None, Some(10.0))), None);
        assert_eq!(smoke_impact(&record(Some(50.0), None)), None);
    }

    #[test]
    fn test_tiny_distance_never_infinite() {
        assert_eq!(smoke_impact(&record(Some(1.0e300), Some(1.0e-300))), None);
    }

    #[test]
    fn test_score_copies() {
        let orig = record(Some(8.0), Some(2.0));
        let scored = score(&orig);

        assert_eq!(scored.smoke_impact, Some(2.0));
        assert_eq!(orig.smoke_impact, None);
    }
}
