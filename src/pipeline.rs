/*!
 * Run the stages over a whole collection of fire records.
 *
 * Each stage takes a slice of records and returns new records, it never modifies its input. The
 * output of any stage is a valid input to the next one, so a run can be stopped, the records
 * saved, and the run picked up again later.
 *
 * Per-record failures never stop a run. They are collected into a [FailureReport] instead.
 */
use crate::{
    dates::{extract_dates, DateExtractor, Extracted, ListedFireDates},
    enrich::{enrich, Enriched},
    error::{ErrorKind, FireSmokeError},
    filter::{FilterCriteria, Rejection},
    fire::FireRecord,
    geo::{projection::Projection, Place},
    smoke::score,
};
use crossbeam_channel::{bounded, unbounded};
use log::{debug, info, warn};
use rustc_hash::FxHashMap as HashMap;
use strum::IntoEnumIterator;

const CHANNEL_SIZE: usize = 256;

/*-------------------------------------------------------------------------------------------------
 *                                       Failure Reports
 *-----------------------------------------------------------------------------------------------*/
/// A failure associated with a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub id: u64,
    pub error: FireSmokeError,
}

/// Everything that went wrong with individual records during a run.
#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    counts: HashMap<ErrorKind, usize>,
    failures: Vec<RecordFailure>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: u64, error: FireSmokeError) {
        *self.counts.entry(error.kind()).or_insert(0) += 1;
        self.failures.push(RecordFailure { id, error });
    }

    /// Combine another report into this one.
    pub fn merge(&mut self, other: FailureReport) {
        for (kind, count) in other.counts {
            *self.counts.entry(kind).or_insert(0) += count;
        }
        self.failures.extend(other.failures);
    }

    /// The number of failures of a given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[RecordFailure] {
        &self.failures
    }

    /// Log the number of failures of each kind.
    pub fn log_summary(&self) {
        if self.is_empty() {
            info!(target: "pipeline", "No record failures.");
            return;
        }

        warn!(target: "pipeline", "{} record failures:", self.total());
        for kind in ErrorKind::iter() {
            let count = self.count(kind);
            if count > 0 {
                warn!(target: "pipeline", "    {:>16} - {}", Into::<&'static str>::into(kind), count);
            }
        }
    }
}

/// The records produced by a stage along with any failures.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub records: Vec<FireRecord>,
    pub report: FailureReport,
}

impl StageOutput {
    fn collect<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (FireRecord, Vec<FireSmokeError>)>,
    {
        let mut out = StageOutput::default();

        for (record, errors) in outcomes {
            for err in errors {
                out.report.add(record.id, err);
            }
            out.records.push(record);
        }

        out
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                          Pipeline
 *-----------------------------------------------------------------------------------------------*/
/// Everything needed to process a collection of fire records for one place.
///
/// All of the configuration is read-only while the pipeline runs, so record level work can be
/// split across threads.
#[derive(Debug, Clone)]
pub struct Pipeline<E = ListedFireDates> {
    place: Place,
    criteria: FilterCriteria,
    projection: Projection,
    extractor: E,
    threads: usize,
}

impl Pipeline<ListedFireDates> {
    pub fn new(place: Place, criteria: FilterCriteria, projection: Projection) -> Self {
        Pipeline {
            place,
            criteria,
            projection,
            extractor: ListedFireDates,
            threads: 1,
        }
    }
}

impl<E> Pipeline<E>
where
    E: DateExtractor + Sync,
{
    /// Use a different date extractor.
    pub fn with_extractor<F: DateExtractor + Sync>(self, extractor: F) -> Pipeline<F> {
        Pipeline {
            place: self.place,
            criteria: self.criteria,
            projection: self.projection,
            extractor,
            threads: self.threads,
        }
    }

    /// Set the number of worker threads for the record level stages. Values less than 2 process
    /// records on the calling thread.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Attach area and distance to every record.
    pub fn enrich(&self, records: &[FireRecord]) -> StageOutput {
        let outcomes = self.map_records(records, |record| {
            let Enriched { record, error } = enrich(record, &self.place, &self.projection);
            (record, error.into_iter().collect())
        });

        let out = StageOutput::collect(outcomes);
        debug!(target: "enrich", "enriched {} records, {} failures", out.records.len(), out.report.total());
        out
    }

    /// Attach discovery, prescribed start, and end dates to every record.
    pub fn extract_dates(&self, records: &[FireRecord]) -> StageOutput {
        let outcomes = self.map_records(records, |record| {
            let Extracted { record, errors } = extract_dates(record, &self.extractor);
            (record, errors)
        });

        let out = StageOutput::collect(outcomes);
        debug!(target: "dates", "dated {} records, {} failures", out.records.len(), out.report.total());
        out
    }

    /// Keep only the records that pass every criterion, in their original order.
    pub fn filter(&self, records: &[FireRecord]) -> StageOutput {
        let mut rejected: HashMap<Rejection, usize> = HashMap::default();

        let kept: Vec<FireRecord> = records
            .iter()
            .filter(|record| match self.criteria.rejection(record) {
                Some(reason) => {
                    *rejected.entry(reason).or_insert(0) += 1;
                    false
                }
                None => true,
            })
            .cloned()
            .collect();

        info!(target: "filter", "kept {} of {} records", kept.len(), records.len());
        for reason in Rejection::iter() {
            if let Some(count) = rejected.get(&reason) {
                debug!(target: "filter", "    {:>30} - {}", Into::<&'static str>::into(reason), count);
            }
        }

        StageOutput {
            records: kept,
            report: FailureReport::new(),
        }
    }

    /// Attach the smoke impact score to every record.
    pub fn score(&self, records: &[FireRecord]) -> StageOutput {
        StageOutput {
            records: records.iter().map(score).collect(),
            report: FailureReport::new(),
        }
    }

    /// Run every stage in order.
    pub fn run(&self, records: &[FireRecord]) -> StageOutput {
        info!(target: "pipeline", "processing {} records for {}", records.len(), self.place.name());

        let mut report = FailureReport::new();

        let enriched = self.enrich(records);
        report.merge(enriched.report);

        let dated = self.extract_dates(&enriched.records);
        report.merge(dated.report);

        let filtered = self.filter(&dated.records);
        report.merge(filtered.report);

        let scored = self.score(&filtered.records);
        report.merge(scored.report);

        StageOutput {
            records: scored.records,
            report,
        }
    }

    /// Apply `func` to every record, possibly on worker threads, keeping the original order.
    fn map_records<T, F>(&self, records: &[FireRecord], func: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&FireRecord) -> T + Sync,
    {
        if self.threads < 2 || records.len() < 2 {
            return records.iter().map(&func).collect();
        }

        let (to_workers, from_dispatch) = bounded::<(usize, &FireRecord)>(CHANNEL_SIZE);
        let (to_collector, from_workers) = unbounded::<(usize, T)>();

        let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None)
            .take(records.len())
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..self.threads {
                let from_dispatch = from_dispatch.clone();
                let to_collector = to_collector.clone();
                let func = &func;

                let spawned = std::thread::Builder::new()
                    .name("firesmoke-worker".to_owned())
                    .spawn_scoped(scope, move || {
                        for (idx, record) in from_dispatch {
                            if to_collector.send((idx, func(record))).is_err() {
                                break;
                            }
                        }
                    });

                if let Err(err) = spawned {
                    warn!(target: "pipeline", "unable to start worker thread: {}", err);
                }
            }

            // Only the workers hold these now, so the channels close when they are done.
            drop(from_dispatch);
            drop(to_collector);

            for item in records.iter().enumerate() {
                if to_workers.send(item).is_err() {
                    break;
                }
            }
            drop(to_workers);

            for (idx, result) in from_workers {
                results[idx] = Some(result);
            }
        });

        // Anything a worker didn't get to is done here.
        results
            .into_iter()
            .zip(records)
            .map(|(result, record)| result.unwrap_or_else(|| func(record)))
            .collect()
    }
}
