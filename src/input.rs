//! CSV readers for survey exports, metadata tables, and earlier reports
//!
//! Every reader checks the header row first and reports missing columns by
//! name, so a wrongly exported sheet fails before any row is parsed.

use crate::error::{CatexError, Result};
use crate::matcher::{PreviousRow, SummaryRecord, SUMMARY_COLUMNS};
use crate::metadata::{Range, SpanInfo, SurveyMetadata, ZoneBoundary};
use crate::prepare::RawReading;
use crate::report::{ExceptionRecord, ExceptionTables, EXCEPTION_COLUMNS};
use crate::csv_output::SURVEY_FILE;
use crate::survey::{Category, SurveyContext, TrackType, SURVEY_COLUMNS};
use crate::trend::CatenaryReading;
use chrono::NaiveDate;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// `DD.MM.YYYY` dates in the DATAC `Date` column
const DATAC_DATE: &str = r"^\d{2}\.\d{2}\.\d{4}$";

const DATAC_COLUMNS: [&str; 17] = [
    "Date", "KM", "LOCATION", "STG1c", "STG2c", "STG3c", "STG4c", "RWH1mm", "RWH2mm", "RWH3mm",
    "RWH4mm", "WHGT1c", "WHGT2c", "WHGT3c", "WHGT4c", "LINE", "TRACK",
];

pub const TRACK_TYPE_FILE: &str = "track_types.csv";
pub const ZONE_FILE: &str = "zones.csv";
pub const SPAN_FILE: &str = "spans.csv";
pub const LANDMARK_FILE: &str = "landmarks.csv";

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> CatexError + '_ {
    move |source| CatexError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| CatexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn reader<R: io::Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn require_columns(headers: &csv::StringRecord, columns: &[&str], path: &Path) -> Result<()> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CatexError::malformed(format!(
            "{}: missing column(s) {}",
            path.display(),
            missing.join(", ")
        )))
    }
}

fn parse_rows<T: DeserializeOwned, R: io::Read>(
    input: R,
    columns: &[&str],
    path: &Path,
) -> Result<Vec<T>> {
    let mut rdr = reader(input, b',');
    let headers = rdr.headers().map_err(csv_error(path))?.clone();
    require_columns(&headers, columns, path)?;

    rdr.records()
        .filter(|record| !matches!(record, Ok(r) if r.iter().all(str::is_empty)))
        .map(|record| {
            record
                .and_then(|r| r.deserialize(Some(&headers)))
                .map_err(csv_error(path))
        })
        .collect()
}

fn read_rows<T: DeserializeOwned>(path: &Path, columns: &[&str]) -> Result<Vec<T>> {
    parse_rows(open(path)?, columns, path)
}

/// A DATAC export: survey date, line/track as recorded, and the readings
#[derive(Debug, Clone, PartialEq)]
pub struct Datac {
    pub date: NaiveDate,
    pub line: Option<String>,
    pub track: Option<String>,
    pub readings: Vec<RawReading>,
}

#[derive(Debug, Deserialize)]
struct DatacRow {
    #[serde(rename = "LINE")]
    line: String,
    #[serde(rename = "TRACK")]
    track: String,
    #[serde(rename = "KM")]
    km: f64,
    #[serde(rename = "LOCATION")]
    location: f64,
    #[serde(rename = "STG1c")]
    stg1: f64,
    #[serde(rename = "STG2c")]
    stg2: f64,
    #[serde(rename = "STG3c")]
    stg3: f64,
    #[serde(rename = "STG4c")]
    stg4: f64,
    #[serde(rename = "RWH1mm")]
    rwh1: f64,
    #[serde(rename = "RWH2mm")]
    rwh2: f64,
    #[serde(rename = "RWH3mm")]
    rwh3: f64,
    #[serde(rename = "RWH4mm")]
    rwh4: f64,
    #[serde(rename = "WHGT1c")]
    whgt1: f64,
    #[serde(rename = "WHGT2c")]
    whgt2: f64,
    #[serde(rename = "WHGT3c")]
    whgt3: f64,
    #[serde(rename = "WHGT4c")]
    whgt4: f64,
}

impl From<DatacRow> for RawReading {
    fn from(row: DatacRow) -> Self {
        RawReading {
            km: row.km,
            location: row.location,
            stagger: [row.stg1, row.stg2, row.stg3, row.stg4],
            wear: [row.rwh1, row.rwh2, row.rwh3, row.rwh4],
            height: [row.whgt1, row.whgt2, row.whgt3, row.whgt4],
        }
    }
}

/// Parse a `;`-delimited DATAC export
///
/// Header names lose their spaces, repeated header rows are skipped, and
/// the survey date is the first `Date` cell matching `DD.MM.YYYY`.
pub fn parse_datac<R: io::Read>(input: R, path: &Path) -> Result<Datac> {
    let date_pattern = Regex::new(DATAC_DATE).map_err(|e| CatexError::malformed(e.to_string()))?;

    let mut rdr = reader(input, b';');
    let headers: csv::StringRecord = rdr
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .map(|h| h.replace(' ', ""))
        .collect();
    require_columns(&headers, &DATAC_COLUMNS, path)?;
    let km_column = headers.iter().position(|h| h == "KM");
    let date_column = headers.iter().position(|h| h == "Date");

    let mut date = None;
    let mut line = None;
    let mut track = None;
    let mut readings = Vec::new();

    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error(path))?;
        if km_column.and_then(|c| record.get(c)) == Some("KM") {
            continue;
        }

        if date.is_none() {
            if let Some(cell) = date_column.and_then(|c| record.get(c)) {
                if date_pattern.is_match(cell) {
                    date = NaiveDate::parse_from_str(cell, "%d.%m.%Y").ok();
                }
            }
        }

        let row: DatacRow = record.deserialize(Some(&headers)).map_err(|e| {
            CatexError::malformed(format!("{}: row {}: {e}", path.display(), index + 2))
        })?;
        if line.is_none() && !row.line.is_empty() {
            line = Some(row.line.clone());
            track = Some(row.track.clone());
        }
        readings.push(RawReading::from(row));
    }

    let date = date.ok_or_else(|| {
        CatexError::malformed(format!(
            "{}: no DD.MM.YYYY survey date in the Date column",
            path.display()
        ))
    })?;
    info!(file = %path.display(), %date, readings = readings.len(), "read DATAC export");

    Ok(Datac {
        date,
        line,
        track,
        readings,
    })
}

pub fn read_datac(path: &Path) -> Result<Datac> {
    parse_datac(open(path)?, path)
}

#[derive(Debug, Deserialize)]
struct TrackTypeRow {
    #[serde(rename = "track type")]
    track_type: TrackType,
    #[serde(rename = "Track Type startM")]
    from_m: f64,
    #[serde(rename = "Track Type endM")]
    to_m: f64,
}

#[derive(Debug, Deserialize)]
struct ZoneRow {
    #[serde(rename = "Class")]
    class: String,
    #[serde(rename = "Up Track From")]
    up_from_m: f64,
    #[serde(rename = "Up Track To")]
    up_to_m: f64,
    #[serde(rename = "Down Track From")]
    down_from_m: f64,
    #[serde(rename = "Down Track To")]
    down_to_m: f64,
}

#[derive(Debug, Deserialize)]
struct SpanRow {
    #[serde(rename = "Overlap FromM")]
    from_m: f64,
    #[serde(rename = "Overlap ToM")]
    to_m: f64,
    #[serde(rename = "Overlap")]
    overlap: String,
    #[serde(rename = "Tension Length")]
    tension_length: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LandmarkRow {
    #[serde(rename = "Landmark FromM")]
    from_m: f64,
    #[serde(rename = "Landmark ToM")]
    to_m: f64,
    #[serde(rename = "Landmark")]
    landmark: String,
}

pub fn read_track_types(path: &Path) -> Result<Vec<Range<TrackType>>> {
    let rows: Vec<TrackTypeRow> =
        read_rows(path, &["track type", "Track Type startM", "Track Type endM"])?;
    Ok(rows
        .into_iter()
        .map(|r| Range::from_metres(r.from_m, r.to_m, r.track_type))
        .collect())
}

pub fn read_zones(path: &Path) -> Result<Vec<ZoneBoundary>> {
    let rows: Vec<ZoneRow> = read_rows(
        path,
        &[
            "Class",
            "Up Track From",
            "Up Track To",
            "Down Track From",
            "Down Track To",
        ],
    )?;
    Ok(rows
        .into_iter()
        .map(|r| ZoneBoundary::from_metres(r.class, r.up_from_m, r.up_to_m, r.down_from_m, r.down_to_m))
        .collect())
}

/// Tension-length spans; also the ranges of the wear summary
pub fn read_spans(path: &Path) -> Result<Vec<Range<SpanInfo>>> {
    let rows: Vec<SpanRow> =
        read_rows(path, &["Overlap FromM", "Overlap ToM", "Overlap", "Tension Length"])?;
    Ok(rows
        .into_iter()
        .map(|r| {
            Range::from_metres(
                r.from_m,
                r.to_m,
                SpanInfo {
                    overlap: r.overlap,
                    tension_length: r.tension_length,
                },
            )
        })
        .collect())
}

pub fn read_landmarks(path: &Path) -> Result<Vec<Range<String>>> {
    let rows: Vec<LandmarkRow> = read_rows(path, &["Landmark FromM", "Landmark ToM", "Landmark"])?;
    Ok(rows
        .into_iter()
        .map(|r| Range::from_metres(r.from_m, r.to_m, r.landmark))
        .collect())
}

/// Load the metadata directory of one section
///
/// `track_types.csv` is required; zones, spans and landmarks are optional.
pub fn read_metadata(dir: &Path) -> Result<SurveyMetadata> {
    let optional = |name: &str| {
        let path = dir.join(name);
        if path.exists() {
            Some(path)
        } else {
            debug!(file = %path.display(), "optional metadata table absent");
            None
        }
    };

    let metadata = SurveyMetadata {
        track_types: read_track_types(&dir.join(TRACK_TYPE_FILE))?,
        zones: optional(ZONE_FILE).map(|p| read_zones(&p)).transpose()?.unwrap_or_default(),
        spans: optional(SPAN_FILE).map(|p| read_spans(&p)).transpose()?.unwrap_or_default(),
        landmarks: optional(LANDMARK_FILE)
            .map(|p| read_landmarks(&p))
            .transpose()?
            .unwrap_or_default(),
    };
    debug!(
        track_types = metadata.track_types.len(),
        zones = metadata.zones.len(),
        spans = metadata.spans.len(),
        landmarks = metadata.landmarks.len(),
        "loaded metadata"
    );
    Ok(metadata)
}

pub fn read_exception_table(path: &Path) -> Result<Vec<ExceptionRecord>> {
    read_rows(path, &EXCEPTION_COLUMNS)
}

/// Read every category table of a report directory
pub fn read_report_dir(dir: &Path) -> Result<ExceptionTables> {
    let mut tables = ExceptionTables::new();
    for category in Category::ALL {
        let path = dir.join(format!("{}.csv", category.file_stem()));
        tables.insert(category, read_exception_table(&path)?);
    }
    Ok(tables)
}

/// Survey context stored alongside a report's tables
pub fn read_survey_context(dir: &Path) -> Result<SurveyContext> {
    let path = dir.join(SURVEY_FILE);
    let mut rows: Vec<SurveyContext> = read_rows(&path, &SURVEY_COLUMNS)?;
    if rows.len() != 1 {
        return Err(CatexError::malformed(format!(
            "{}: expected one survey row, found {}",
            path.display(),
            rows.len()
        )));
    }
    Ok(rows.remove(0))
}

pub fn read_summary(path: &Path) -> Result<Vec<SummaryRecord>> {
    // ACTION is optional on read
    read_rows(path, &SUMMARY_COLUMNS[..SUMMARY_COLUMNS.len() - 1])
}

pub fn parse_previous<R: io::Read>(input: R, path: &Path) -> Result<Vec<PreviousRow>> {
    let mut rdr = reader(input, b',');
    let headers = rdr.headers().map_err(csv_error(path))?.clone();
    require_columns(&headers, &["ID"], path)?;

    let id_column = headers.iter().position(|h| h == "ID");
    let mut columns: Vec<(usize, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            h.strip_prefix("Previous ")
                .and_then(|k| k.parse::<usize>().ok())
                .map(|k| (k, i))
        })
        .collect();
    columns.sort_unstable();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_error(path))?;
        let Some(id) = id_column.and_then(|c| record.get(c)).filter(|id| !id.is_empty()) else {
            continue;
        };
        let previous = columns
            .iter()
            .map(|&(_, i)| record.get(i).filter(|c| !c.is_empty()).map(str::to_string))
            .collect();
        rows.push(PreviousRow {
            id: id.to_string(),
            previous,
        });
    }
    Ok(rows)
}

pub fn read_previous(path: &Path) -> Result<Vec<PreviousRow>> {
    parse_previous(open(path)?, path)
}

#[derive(Debug, Deserialize)]
struct CatenaryRow {
    #[serde(rename = "CHAINAGE")]
    chainage: f64,
    #[serde(rename = "WireWear1", alias = "RWH1mm")]
    wear1: f64,
    #[serde(rename = "WireWear2", alias = "RWH2mm")]
    wear2: f64,
    #[serde(rename = "WireWear3", alias = "RWH3mm")]
    wear3: f64,
    #[serde(rename = "WireWear4", alias = "RWH4mm")]
    wear4: f64,
}

pub fn parse_catenary<R: io::Read>(input: R, path: &Path) -> Result<Vec<CatenaryReading>> {
    let mut rdr = reader(input, b',');
    let headers = rdr.headers().map_err(csv_error(path))?.clone();
    let channels = ["1", "2", "3", "4"];
    let missing: Vec<String> = channels
        .iter()
        .filter(|n| {
            !headers
                .iter()
                .any(|h| h == format!("WireWear{n}") || h == format!("RWH{n}mm"))
        })
        .map(|n| format!("WireWear{n}"))
        .collect();
    require_columns(&headers, &["CHAINAGE"], path)?;
    if !missing.is_empty() {
        return Err(CatexError::malformed(format!(
            "{}: missing column(s) {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let rows: Vec<CatenaryRow> = rdr
        .records()
        .filter(|record| !matches!(record, Ok(r) if r.iter().all(str::is_empty)))
        .map(|record| {
            record
                .and_then(|r| r.deserialize(Some(&headers)))
                .map_err(csv_error(path))
        })
        .collect::<Result<_>>()?;

    Ok(rows
        .into_iter()
        .map(|r| CatenaryReading {
            location_m: r.chainage,
            wear: [r.wear1, r.wear2, r.wear3, r.wear4],
        })
        .collect())
}

pub fn read_catenary(path: &Path) -> Result<Vec<CatenaryReading>> {
    parse_catenary(open(path)?, path)
}
