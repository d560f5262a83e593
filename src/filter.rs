/*!
 * Decide which fires are relevant to smoke at a place.
 *
 * A fire is kept if it burned in the years of interest, close enough to the place, and during the
 * fire season. Sparse historical records often lack dates, so a missing date never disqualifies a
 * fire, it is assumed to have happened during the season.
 */
use crate::{
    error::{FireSmokeError, FireSmokeResult},
    fire::FireRecord,
};
use chrono::{Datelike, NaiveDate};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// A month and day, ignoring the year.
///
/// Ordered by packing into the integer `month * 100 + day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay(u32);

impl MonthDay {
    pub fn new(month: u32, day: u32) -> FireSmokeResult<Self> {
        // 2000 is a leap year, so February 29th is allowed.
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(FireSmokeError::config(format!(
                "invalid month-day: {:02}-{:02}",
                month, day
            )));
        }

        Ok(MonthDay(month * 100 + day))
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        MonthDay(date.month() * 100 + date.day())
    }

    pub fn packed(&self) -> u32 {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.0 / 100
    }

    pub fn day(&self) -> u32 {
        self.0 % 100
    }
}

impl FromStr for MonthDay {
    type Err = FireSmokeError;

    /// Parse from "MM-DD".
    fn from_str(s: &str) -> FireSmokeResult<Self> {
        let bad = || FireSmokeError::config(format!("invalid month-day, expected MM-DD: {}", s));

        let (month, day) = s.trim().split_once('-').ok_or_else(bad)?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        let day: u32 = day.parse().map_err(|_| bad())?;

        Self::new(month, day)
    }
}

impl Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{:02}-{:02}", self.month(), self.day())
    }
}

/// The fire season, a window of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Season {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl Season {
    pub fn new(start: MonthDay, end: MonthDay) -> Self {
        Season { start, end }
    }

    /// Parse a season from two "MM-DD" strings.
    pub fn parse(start: &str, end: &str) -> FireSmokeResult<Self> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    /// Is the month-day within the season, inclusive on both ends.
    ///
    /// A season that starts later in the year than it ends wraps across the new year.
    pub fn contains(&self, md: MonthDay) -> bool {
        if self.start <= self.end {
            self.start <= md && md <= self.end
        } else {
            md >= self.start || md <= self.end
        }
    }
}

impl Default for Season {
    /// May 1st through October 31st.
    fn default() -> Self {
        Season {
            start: MonthDay(501),
            end: MonthDay(1031),
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} to {}", self.start, self.end)
    }
}

pub const DEFAULT_FIRST_YEAR: i32 = 1961;
pub const DEFAULT_LAST_YEAR: i32 = 2021;
pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 650.0;

/// Prescribed burns that started before this are assumed to be over before the season starts.
pub fn default_prescribed_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 4, 25).unwrap_or(NaiveDate::MIN)
}

/// Everything a record is checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCriteria {
    first_year: i32,
    last_year: i32,
    max_distance_miles: f64,
    season: Season,
    prescribed_cutoff: NaiveDate,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
            season: Season::default(),
            prescribed_cutoff: default_prescribed_cutoff(),
        }
    }
}

impl FilterCriteria {
    pub fn new(
        first_year: i32,
        last_year: i32,
        max_distance_miles: f64,
        season: Season,
        prescribed_cutoff: NaiveDate,
    ) -> FireSmokeResult<Self> {
        Self::default()
            .with_years(first_year, last_year)?
            .with_max_distance(max_distance_miles)
            .map(|c| c.with_season(season))
            .map(|c| c.with_prescribed_cutoff(prescribed_cutoff))
    }

    /// Set the inclusive range of fire years.
    pub fn with_years(mut self, first_year: i32, last_year: i32) -> FireSmokeResult<Self> {
        if first_year > last_year {
            return Err(FireSmokeError::config(format!(
                "first year ({}) is after last year ({})",
                first_year, last_year
            )));
        }
        self.first_year = first_year;
        self.last_year = last_year;
        Ok(self)
    }

    pub fn with_max_distance(mut self, max_distance_miles: f64) -> FireSmokeResult<Self> {
        if !max_distance_miles.is_finite() || max_distance_miles < 0.0 {
            return Err(FireSmokeError::config(format!(
                "invalid maximum distance: {}",
                max_distance_miles
            )));
        }
        self.max_distance_miles = max_distance_miles;
        Ok(self)
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = season;
        self
    }

    pub fn with_prescribed_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.prescribed_cutoff = cutoff;
        self
    }

    pub fn years(&self) -> (i32, i32) {
        (self.first_year, self.last_year)
    }

    pub fn max_distance_miles(&self) -> f64 {
        self.max_distance_miles
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn prescribed_cutoff(&self) -> NaiveDate {
        self.prescribed_cutoff
    }

    pub fn in_year_range(&self, record: &FireRecord) -> bool {
        (self.first_year..=self.last_year).contains(&record.fire_year)
    }

    /// A record with no distance can't be shown to be close enough, so it fails.
    pub fn within_distance(&self, record: &FireRecord) -> bool {
        record
            .average_distance
            .map(|dist| dist <= self.max_distance_miles)
            .unwrap_or(false)
    }

    pub fn discovered_in_season(&self, record: &FireRecord) -> bool {
        record
            .discovery_date
            .map(|date| self.season.contains(MonthDay::of(&date)))
            .unwrap_or(true)
    }

    pub fn ended_in_season(&self, record: &FireRecord) -> bool {
        record
            .end_date
            .map(|date| MonthDay::of(&date) >= self.season.start)
            .unwrap_or(true)
    }

    pub fn prescribed_after_cutoff(&self, record: &FireRecord) -> bool {
        record
            .prescribed_start
            .map(|date| date >= self.prescribed_cutoff)
            .unwrap_or(true)
    }

    /// Check a record against every criterion.
    pub fn passes_filter(&self, record: &FireRecord) -> bool {
        self.rejection(record).is_none()
    }

    /// The first criterion the record fails, if any.
    pub fn rejection(&self, record: &FireRecord) -> Option<Rejection> {
        if !self.in_year_range(record) {
            Some(Rejection::Year)
        } else if !self.within_distance(record) {
            Some(Rejection::Distance)
        } else if !self.discovered_in_season(record) {
            Some(Rejection::Discovery)
        } else if !self.ended_in_season(record) {
            Some(Rejection::End)
        } else if !self.prescribed_after_cutoff(record) {
            Some(Rejection::Prescribed)
        } else {
            None
        }
    }
}

/// Why a record was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
pub enum Rejection {
    #[strum(serialize = "outside year range")]
    Year,
    #[strum(serialize = "too far away")]
    Distance,
    #[strum(serialize = "discovered out of season")]
    Discovery,
    #[strum(serialize = "ended before season")]
    End,
    #[strum(serialize = "prescribed burn before cutoff")]
    Prescribed,
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn passing_record() -> FireRecord {
        let mut record = FireRecord::new(1, 2000);
        record.average_distance = Some(100.0);
        record
    }

    #[test]
    fn test_month_day_parse() {
        let md: MonthDay = "05-01".parse().unwrap();
        assert_eq!(md.packed(), 501);
        assert_eq!(md.to_string(), "05-01");

        let md: MonthDay = "2-29".parse().unwrap();
        assert_eq!(md.packed(), 229);

        assert!("13-01".parse::<MonthDay>().is_err());
        assert!("04-31".parse::<MonthDay>().is_err());
        assert!("0501".parse::<MonthDay>().is_err());
        assert!("May-01".parse::<MonthDay>().is_err());
    }

    #[test]
    fn test_month_day_of_ignores_year() {
        assert_eq!(MonthDay::of(&ymd(1975, 7, 4)), MonthDay::of(&ymd(2020, 7, 4)));
        assert_eq!(MonthDay::of(&ymd(1975, 12, 31)).packed(), 1231);
    }

    #[test]
    fn test_season_contains() {
        let season = Season::parse("05-01", "10-31").unwrap();
        assert!(season.contains(MonthDay::new(5, 1).unwrap()));
        assert!(season.contains(MonthDay::new(10, 31).unwrap()));
        assert!(!season.contains(MonthDay::new(4, 30).unwrap()));
        assert!(!season.contains(MonthDay::new(11, 1).unwrap()));

        let winter = Season::parse("11-15", "02-15").unwrap();
        assert!(winter.contains(MonthDay::new(12, 25).unwrap()));
        assert!(winter.contains(MonthDay::new(1, 10).unwrap()));
        assert!(!winter.contains(MonthDay::new(7, 1).unwrap()));
    }

    #[test]
    fn test_season_boundary() {
        let criteria = FilterCriteria::default();

        let mut record = passing_record();
        record.discovery_date = Some(ymd(1999, 5, 1));
        record.fire_year = 1999;
        assert!(criteria.discovered_in_season(&record));
        assert!(criteria.passes_filter(&record));

        record.discovery_date = Some(ymd(1999, 4, 30));
        assert!(!criteria.discovered_in_season(&record));
        assert_eq!(criteria.rejection(&record), Some(Rejection::Discovery));
    }

    #[test]
    fn test_missing_dates_pass() {
        let criteria = FilterCriteria::default();

        let mut record = passing_record();
        record.end_date = Some(ymd(2000, 3, 1));
        assert!(criteria.discovered_in_season(&record));
        assert!(!criteria.ended_in_season(&record));

        let record = passing_record();
        assert!(criteria.discovered_in_season(&record));
        assert!(criteria.ended_in_season(&record));
        assert!(criteria.prescribed_after_cutoff(&record));
        assert!(criteria.passes_filter(&record));
    }

    #[test]
    fn test_end_date_check() {
        let criteria = FilterCriteria::default();
        let mut record = passing_record();

        record.end_date = Some(ymd(2000, 5, 1));
        assert!(criteria.ended_in_season(&record));

        record.end_date = Some(ymd(2000, 4, 30));
        assert!(!criteria.ended_in_season(&record));
        assert_eq!(criteria.rejection(&record), Some(Rejection::End));

        record.end_date = Some(ymd(2000, 12, 1));
        assert!(criteria.ended_in_season(&record));
    }

    #[test]
    fn test_prescribed_cutoff() {
        let criteria = FilterCriteria::default();
        let mut record = passing_record();

        record.prescribed_start = Some(ymd(2015, 3, 1));
        assert!(!criteria.prescribed_after_cutoff(&record));

        record.prescribed_start = Some(ymd(2021, 4, 25));
        assert!(criteria.prescribed_after_cutoff(&record));
    }

    #[test]
    fn test_year_range_and_distance() {
        let criteria = FilterCriteria::default();

        let mut record = passing_record();
        record.fire_year = 1961;
        assert!(criteria.in_year_range(&record));
        record.fire_year = 2021;
        assert!(criteria.in_year_range(&record));
        record.fire_year = 1960;
        assert_eq!(criteria.rejection(&record), Some(Rejection::Year));

        let mut record = passing_record();
        record.average_distance = Some(650.0);
        assert!(criteria.within_distance(&record));
        record.average_distance = Some(650.0001);
        assert!(!criteria.within_distance(&record));
        record.average_distance = None;
        assert_eq!(criteria.rejection(&record), Some(Rejection::Distance));
    }

    #[test]
    fn test_caller_supplied_distance() {
        let wide = FilterCriteria::default().with_max_distance(1800.0).unwrap();
        let narrow = FilterCriteria::default();

        let mut record = passing_record();
        record.average_distance = Some(1200.0);

        assert!(wide.passes_filter(&record));
        assert!(!narrow.passes_filter(&record));
    }

    #[test]
    fn test_bad_criteria() {
        assert!(FilterCriteria::default().with_years(2000, 1999).is_err());
        assert!(FilterCriteria::default().with_max_distance(-1.0).is_err());
        assert!(FilterCriteria::default()
            .with_max_distance(f64::NAN)
            .is_err());

        let criteria = FilterCriteria::new(
            1980,
            1990,
            300.0,
            Season::parse("06-01", "09-30").unwrap(),
            ymd(1985, 1, 1),
        )
        .unwrap();
        assert_eq!(criteria.years(), (1980, 1990));
        assert_eq!(criteria.max_distance_miles(), 300.0);
        assert_eq!(criteria.season().start.packed(), 601);
        assert_eq!(criteria.prescribed_cutoff(), ymd(1985, 1, 1));
    }
}
