/*!
 * Pull typed calendar dates out of the free text date annotation on a fire record.
 *
 * The annotation is a best effort summary of every date the source agencies listed for a fire,
 * for example:
 *
 * ```text
 * Listed Wildfire Discovery Date(s): 2001-07-03 (1) | Listed Wildfire Controlled Date(s): 2001-07-10 (1)
 * ```
 *
 * Each kind of date is extracted independently so that a problem with one never prevents finding
 * the others.
 */
use crate::{
    error::{FireSmokeError, FireSmokeResult},
    fire::FireRecord,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::{EnumIter, IntoStaticStr};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The kinds of dates found in the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, strum::Display)]
pub enum DateKind {
    #[strum(serialize = "discovery")]
    Discovery,
    #[strum(serialize = "prescribed start")]
    PrescribedStart,
    #[strum(serialize = "controlled/end")]
    End,
}

/// Something that can find dates in a free text annotation.
pub trait DateExtractor {
    /// Find the date of the given kind.
    ///
    /// Returns `Ok(None)` if the annotation doesn't list a date of this kind, and an error if it
    /// lists one that is not a valid date.
    fn extract(&self, kind: DateKind, text: &str) -> FireSmokeResult<Option<NaiveDate>>;

    /// The discovery date, if present and valid.
    fn discovery_date(&self, text: &str) -> Option<NaiveDate> {
        self.extract(DateKind::Discovery, text).ok().flatten()
    }

    /// The start date of a prescribed burn, if present and valid.
    fn prescribed_start(&self, text: &str) -> Option<NaiveDate> {
        self.extract(DateKind::PrescribedStart, text).ok().flatten()
    }

    /// The date the fire was controlled or ended, if present and valid.
    fn end_date(&self, text: &str) -> Option<NaiveDate> {
        self.extract(DateKind::End, text).ok().flatten()
    }
}

/// Extracts dates using the labels of the `Listed_Fire_Dates` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListedFireDates;

static DISCOVERY_RE: Lazy<Regex> = Lazy::new(|| label_regex(r"Wildfire Discovery"));
static PRESCRIBED_START_RE: Lazy<Regex> = Lazy::new(|| label_regex(r"Prescribed Fire Start"));
static CONTROLLED_RE: Lazy<Regex> = Lazy::new(|| label_regex(r"Wildfire Controlled"));
static PRESCRIBED_END_RE: Lazy<Regex> = Lazy::new(|| label_regex(r"Prescribed Fire End"));

/// A label followed by the first date listed after it.
///
/// Only the shape of the date is matched here, validation happens when it is parsed so that a
/// malformed value can be reported. Digits are ASCII only, and the whole run of digits is taken so
/// a day like `031` is reported instead of being cut short.
fn label_regex(label: &str) -> Regex {
    let pattern = format!(
        r"Listed {} Date\(s\):\s*([0-9]{{4}}-[0-9]+-[0-9]+)\b",
        label
    );
    Regex::new(&pattern).expect("date label patterns are static and valid")
}

impl ListedFireDates {
    /// Labels to try for each kind, in order of preference.
    fn patterns(kind: DateKind) -> Vec<&'static Regex> {
        match kind {
            DateKind::Discovery => vec![&*DISCOVERY_RE],
            DateKind::PrescribedStart => vec![&*PRESCRIBED_START_RE],
            DateKind::End => vec![&*CONTROLLED_RE, &*PRESCRIBED_END_RE],
        }
    }
}

impl DateExtractor for ListedFireDates {
    fn extract(&self, kind: DateKind, text: &str) -> FireSmokeResult<Option<NaiveDate>> {
        let found = Self::patterns(kind)
            .into_iter()
            .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)));

        match found {
            Some(m) => NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT)
                .map(Some)
                .map_err(|_| FireSmokeError::DateParse {
                    kind,
                    text: m.as_str().to_owned(),
                }),
            None => Ok(None),
        }
    }
}

/// The result of extracting dates from a record.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub record: FireRecord,
    pub errors: Vec<FireSmokeError>,
}

/// Fill in the discovery, prescribed start, and end dates of a copy of the record.
///
/// Dates that are not listed or are malformed are left missing. Malformed ones are also returned
/// as errors so they can be counted.
pub fn extract_dates<E: DateExtractor + ?Sized>(record: &FireRecord, extractor: &E) -> Extracted {
    let mut record = record.clone();
    let mut errors = vec![];

    let text = record.listed_fire_dates.clone().unwrap_or_default();

    let mut get = |kind: DateKind| match extractor.extract(kind, &text) {
        Ok(date) => date,
        Err(err) => {
            log::debug!(target: "dates", "record {}: {}", record.id, err);
            errors.push(err);
            None
        }
    };

    let discovery = get(DateKind::Discovery);
    let prescribed = get(DateKind::PrescribedStart);
    let end = get(DateKind::End);

    record.discovery_date = discovery;
    record.prescribed_start = prescribed;
    record.end_date = end;

    Extracted { record, errors }
}
