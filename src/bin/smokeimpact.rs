use clap::Parser;
use firesmoke::{FilterCriteria, FireRecord, Pipeline, Place, Projection, Season, StageOutput};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    fmt::{self, Display},
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Estimate the smoke impact of wildfires on a place.
///
/// Reads a JSON array of fire perimeter records, calculates the distance from each fire to the
/// place, filters them by year, distance, and fire season, and scores the remaining fires by their
/// potential smoke impact.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "smokeimpact")]
#[clap(author, version, about)]
struct SmokeImpactOptions {
    /// The path to a JSON file with an array of fire records.
    ///
    /// If this is not specified, then the program will check for it in the "FIRESMOKE_INPUT"
    /// environment variable.
    #[clap(env = "FIRESMOKE_INPUT")]
    input: PathBuf,

    /// The path to write the results to. If not specified, they go to standard output.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// The name of the place, used in the output field names.
    #[clap(long)]
    place_name: String,

    /// Latitude of the place in decimal degrees.
    #[clap(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the place in decimal degrees.
    #[clap(long, allow_hyphen_values = true)]
    lon: f64,

    /// The first fire year to keep.
    #[clap(long, default_value_t = 1961)]
    first_year: i32,

    /// The last fire year to keep.
    #[clap(long, default_value_t = 2021)]
    last_year: i32,

    /// Start of the fire season, MM-DD.
    #[clap(long, default_value = "05-01")]
    season_start: String,

    /// End of the fire season, MM-DD.
    #[clap(long, default_value = "10-31")]
    season_end: String,

    /// Fires farther away than this, in miles, are dropped.
    #[clap(short, long, default_value_t = 650.0)]
    max_distance: f64,

    /// Prescribed burns that started before this date (YYYY-MM-DD) are dropped.
    #[clap(long, default_value = "2021-04-25")]
    prescribed_cutoff: chrono::NaiveDate,

    /// The WKID of the projection the perimeters are in.
    #[clap(long, default_value_t = firesmoke::NORTH_AMERICA_ALBERS_WKID)]
    wkid: u32,

    /// Run only one stage and write the raw records so a later run can pick up from there.
    ///
    /// One of enrich, dates, filter, score, or all.
    #[clap(long, default_value_t = Stage::All)]
    stage: Stage,

    /// The number of worker threads.
    #[clap(short, long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum Stage {
    Enrich,
    Dates,
    Filter,
    Score,
    All,
}

impl Display for SmokeImpactOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "            Input: {}", self.input.display())?;
        match self.output {
            Some(ref output) => writeln!(f, "           Output: {}", output.display())?,
            None => writeln!(f, "           Output: stdout")?,
        }
        writeln!(
            f,
            "            Place: {} ({:.4}, {:.4})",
            self.place_name, self.lat, self.lon
        )?;
        writeln!(f, "            Years: {} - {}", self.first_year, self.last_year)?;
        writeln!(f, "           Season: {} to {}", self.season_start, self.season_end)?;
        writeln!(f, "     Max Distance: {:.0} miles", self.max_distance)?;
        writeln!(f, "Prescribed Cutoff: {}", self.prescribed_cutoff)?;
        writeln!(f, "      Source WKID: {}", self.wkid)?;
        writeln!(f, "            Stage: {}", self.stage)?;
        writeln!(f, "          Threads: {}", self.threads)?;
        writeln!(f, "\n")?;

        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> Result<(), Box<dyn Error>> {
    let opts = SmokeImpactOptions::parse();

    SimpleLogger::new()
        .with_level(if opts.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()?;

    if opts.verbose {
        info!(target: "startup", "{}", opts);
    }

    // Configuration problems would fail every record the same way, so stop before reading data.
    let place = Place::new(opts.place_name.as_str(), opts.lat, opts.lon)?;
    let projection = Projection::from_wkid(opts.wkid)?;
    let season = Season::parse(&opts.season_start, &opts.season_end)?;
    let criteria = FilterCriteria::new(
        opts.first_year,
        opts.last_year,
        opts.max_distance,
        season,
        opts.prescribed_cutoff,
    )?;

    let pipeline = Pipeline::new(place, criteria, projection).with_threads(opts.threads);

    let records: Vec<FireRecord> =
        serde_json::from_reader(BufReader::new(File::open(&opts.input)?))?;
    info!(target: "startup", "loaded {} records from {}", records.len(), opts.input.display());

    let StageOutput { records, report } = match opts.stage {
        Stage::Enrich => pipeline.enrich(&records),
        Stage::Dates => pipeline.extract_dates(&records),
        Stage::Filter => pipeline.filter(&records),
        Stage::Score => pipeline.score(&records),
        Stage::All => pipeline.run(&records),
    };

    report.log_summary();
    info!(target: "summary", "{} records out", records.len());

    let mut out: Box<dyn Write> = match opts.output {
        Some(ref path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    if opts.stage == Stage::All {
        let rows: Vec<_> = records
            .iter()
            .map(|record| record.egress_row(pipeline.place()))
            .collect();
        serde_json::to_writer_pretty(&mut out, &rows)?;
    } else {
        serde_json::to_writer_pretty(&mut out, &records)?;
    }
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
