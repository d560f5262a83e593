/*!
 * A wildfire perimeter record and the fields derived from it.
 */
use crate::{
    error::{FireSmokeError, FireSmokeResult},
    geo::{Place, ProjectedPoint},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Square meters to square miles.
pub const SQ_METERS_TO_SQ_MILES: f64 = 3.861_021_585_4e-7;

/// The perimeter of a fire as it was ingested.
///
/// Rings are ordered the way the source dataset lists them, the primary (outer) ring first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    /// Already decoded rings of projected coordinates.
    Rings(Vec<Vec<ProjectedPoint>>),
    /// The nested coordinate lists as text, e.g. `"[[[x, y], [x, y], ...]]"`.
    Encoded(String),
    /// Anything else, kept as it was found so one bad record doesn't stop a batch from loading.
    Invalid(Value),
}

impl Geometry {
    /// Decode the rings if necessary.
    pub fn rings(&self) -> FireSmokeResult<Vec<Vec<ProjectedPoint>>> {
        match self {
            Self::Rings(rings) => Ok(rings.clone()),
            Self::Encoded(text) => {
                serde_json::from_str(text).map_err(|err| FireSmokeError::MissingGeometry {
                    msg: format!("unable to decode rings: {}", err),
                })
            }
            Self::Invalid(val) => Err(FireSmokeError::MissingGeometry {
                msg: format!("rings are not lists of [x, y] pairs: {}", val),
            }),
        }
    }

    /// The ring used for distance calculations.
    ///
    /// This is the first ring listed. The dataset lists the outer ring of the largest piece of a
    /// fire first, it is not checked here.
    pub fn primary_ring(&self) -> FireSmokeResult<Vec<ProjectedPoint>> {
        self.rings()?
            .into_iter()
            .next()
            .ok_or_else(|| FireSmokeError::MissingGeometry {
                msg: "geometry has no rings".to_owned(),
            })
    }
}

/// A single fire and everything calculated about it.
///
/// Derived fields start out missing and are filled in by the stages of a
/// [Pipeline](crate::Pipeline). Stages never modify a record in place, they return a new copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    #[serde(rename = "OBJECTID")]
    pub id: u64,
    #[serde(rename = "Fire_Year")]
    pub fire_year: i32,
    /// Area of the fire in square meters.
    #[serde(rename = "Shape_Area", default)]
    pub shape_area: Option<f64>,
    #[serde(rename = "Listed_Fire_Dates", default)]
    pub listed_fire_dates: Option<String>,
    #[serde(default)]
    pub rings: Option<Geometry>,

    #[serde(rename = "Shape_Area_miles", default)]
    pub shape_area_miles: Option<f64>,
    /// Mean distance to the place in miles.
    #[serde(default)]
    pub average_distance: Option<f64>,
    #[serde(default)]
    pub discovery_date: Option<NaiveDate>,
    #[serde(default)]
    pub prescribed_start: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub smoke_impact: Option<f64>,

    /// Every other field of the input, passed through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl FireRecord {
    /// Create a record with no geometry, dates, or attributes.
    pub fn new(id: u64, fire_year: i32) -> Self {
        FireRecord {
            id,
            fire_year,
            shape_area: None,
            listed_fire_dates: None,
            rings: None,
            shape_area_miles: None,
            average_distance: None,
            discovery_date: None,
            prescribed_start: None,
            end_date: None,
            smoke_impact: None,
            attributes: Map::new(),
        }
    }

    /// The area in square miles, if the area is known and sensible.
    pub fn area_sq_miles(&self) -> Option<f64> {
        self.shape_area
            .filter(|area| area.is_finite() && *area >= 0.0)
            .map(|area| area * SQ_METERS_TO_SQ_MILES)
    }

    /// Name of the distance field in the output.
    pub fn distance_field_name(place: &Place) -> String {
        format!("average_distance_from_{}", place.name())
    }

    /// Build the output row for this record.
    ///
    /// Contains the input attributes and all of the derived fields. Missing values are `null`.
    pub fn egress_row(&self, place: &Place) -> Map<String, Value> {
        let mut row = self.attributes.clone();

        let date = |d: Option<NaiveDate>| {
            d.map(|d| Value::String(d.to_string()))
                .unwrap_or(Value::Null)
        };

        row.insert("OBJECTID".to_owned(), Value::from(self.id));
        row.insert("Fire_Year".to_owned(), Value::from(self.fire_year));
        row.insert("Shape_Area".to_owned(), number(self.shape_area));
        row.insert(
            "Listed_Fire_Dates".to_owned(),
            self.listed_fire_dates
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        row.insert("Shape_Area_miles".to_owned(), number(self.shape_area_miles));
        row.insert(
            Self::distance_field_name(place),
            number(self.average_distance),
        );
        row.insert("discovery_date".to_owned(), date(self.discovery_date));
        row.insert("prescribed_start".to_owned(), date(self.prescribed_start));
        row.insert("end_date".to_owned(), date(self.end_date));
        row.insert("smoke_impact".to_owned(), number(self.smoke_impact));

        row
    }
}

/// JSON has no representation for NaN or infinity, those become null along with missing values.
fn number(val: Option<f64>) -> Value {
    val.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
