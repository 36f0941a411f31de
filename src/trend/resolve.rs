// Resolving historical observations for one exception

use crate::error::{CatexError, Result};
use crate::matcher::SummaryRecord;
use crate::report::ExceptionRecord;
use crate::survey::{Category, ExceptionId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One value observed on one survey date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Wire wear table of an earlier exception report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorReport {
    pub records: Vec<ExceptionRecord>,
}

impl PriorReport {
    pub fn new(records: Vec<ExceptionRecord>) -> Self {
        Self { records }
    }

    /// Survey date, taken from the first row's identifier
    pub fn date(&self) -> Result<NaiveDate> {
        let first = self.records.first().ok_or_else(|| {
            CatexError::malformed("cannot date an empty exception report")
        })?;
        Ok(first.id.parse::<ExceptionId>()?.date)
    }

    /// The single row with this identifier
    pub fn by_id(&self, id: &str) -> Result<&ExceptionRecord> {
        let mut hits = self.records.iter().filter(|r| r.id == id);
        match (hits.next(), hits.count()) {
            (Some(record), 0) => Ok(record),
            (first, rest) => Err(CatexError::AmbiguousMatch {
                id: id.to_string(),
                found: usize::from(first.is_some()) + rest,
            }),
        }
    }

    /// Worst (thinnest) representative value among rows overlapping `[start_m, end_m]`
    pub fn worst_overlapping(&self, start_m: f64, end_m: f64) -> Option<f64> {
        let extremum = Category::WireWear.extremum();
        self.records
            .iter()
            .filter(|r| r.start_m <= end_m && r.end_m >= start_m)
            .map(|r| r.max_value)
            .reduce(|worst, v| if extremum.is_worse(v, worst) { v } else { worst })
    }
}

/// Raw catenary wire thickness at one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatenaryReading {
    /// Chainage in metres
    pub location_m: f64,
    pub wear: [f64; 4],
}

impl CatenaryReading {
    /// Thinnest of the four channels, as in an exception's `maxValue`
    pub fn worst(&self) -> f64 {
        Category::WireWear.reduce(self.wear)
    }
}

/// Closest reading to `location_m`, if one lies within `max_distance` metres
pub fn nearest_reading(
    readings: &[CatenaryReading],
    location_m: f64,
    max_distance: f64,
) -> Option<&CatenaryReading> {
    readings
        .iter()
        .map(|r| ((r.location_m - location_m).abs(), r))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, r)| r)
}

/// An older survey: its date, exception report and raw catenary readings
///
/// The date is carried separately so a survey without wire wear exceptions
/// still resolves through its catenary readings.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSurvey {
    pub date: NaiveDate,
    pub report: PriorReport,
    pub catenary: Vec<CatenaryReading>,
}

impl HistoricalSurvey {
    pub fn new(date: NaiveDate, report: PriorReport, catenary: Vec<CatenaryReading>) -> Self {
        Self {
            date,
            report,
            catenary,
        }
    }
}

/// Look up a matched predecessor by exact identifier
///
/// The report must be the survey the identifier was issued for.
pub fn resolve_predecessor(report: &PriorReport, id: &str) -> Result<Observation> {
    let parsed: ExceptionId = id.parse()?;
    let record = report.by_id(id)?;
    let report_date = report.date()?;
    if report_date != parsed.date {
        return Err(CatexError::malformed(format!(
            "{id} is dated {} but its report is dated {report_date}",
            parsed.date
        )));
    }

    Ok(Observation {
        date: parsed.date,
        value: record.max_value,
    })
}

/// Resolve an older survey's value over the exception's interval
///
/// Prefers overlapping exceptions of that survey, then the nearest raw
/// catenary reading to the representative location. An empty exception
/// table goes straight to the catenary readings.
pub fn resolve_history(
    survey: &HistoricalSurvey,
    latest: &SummaryRecord,
    max_distance: f64,
) -> Result<Observation> {
    let date = survey.date;
    if !survey.report.records.is_empty() {
        let report_date = survey.report.date()?;
        if report_date != date {
            return Err(CatexError::malformed(format!(
                "survey dated {date} carries exceptions dated {report_date}"
            )));
        }
    }

    if let Some(value) = survey.report.worst_overlapping(latest.start_m, latest.end_m) {
        return Ok(Observation { date, value });
    }

    let reading = nearest_reading(&survey.catenary, latest.max_location, max_distance)
        .ok_or_else(|| {
            CatexError::missing(format!(
                "no {date} observation for {} near {} m",
                latest.id, latest.max_location
            ))
        })?;
    debug!(id = %latest.id, %date, location = reading.location_m, "fell back to catenary reading");

    Ok(Observation {
        date,
        value: reading.worst(),
    })
}
