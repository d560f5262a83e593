pub use crate::dates::{extract_dates, DateExtractor, DateKind, Extracted, ListedFireDates};
pub use crate::distance::{
    geodesic_distance_miles, mean_distance, nearest_point, vertex_distances, NearestPoint,
    METERS_TO_MILES,
};
pub use crate::enrich::{enrich, Enriched};
pub use crate::error::{ErrorKind, FireSmokeError, FireSmokeResult};
pub use crate::filter::{FilterCriteria, MonthDay, Rejection, Season};
pub use crate::fire::{FireRecord, Geometry, SQ_METERS_TO_SQ_MILES};
pub use crate::geo::{
    projection::{Projection, NORTH_AMERICA_ALBERS_WKID},
    Coord, Place, ProjectedPoint,
};
pub use crate::pipeline::{FailureReport, Pipeline, RecordFailure, StageOutput};
pub use crate::smoke::{score, smoke_impact};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod dates;
mod distance;
mod enrich;
mod error;
mod filter;
mod fire;
mod geo;
mod pipeline;
mod smoke;
