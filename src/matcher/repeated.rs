// Repeat report over a series of consecutive survey reports

use super::{match_series, TrackedException};
use crate::error::{CatexError, Result};
use crate::report::{ExceptionRecord, ExceptionTables};
use crate::survey::{Category, Level, TrackType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

pub const MIN_REPORTS: usize = 2;
pub const MAX_REPORTS: usize = 12;

/// Column order of the repeat summary table
pub const SUMMARY_COLUMNS: [&str; 11] = [
    "id",
    "startM",
    "endM",
    "length",
    "exception type",
    "maxValue",
    "maxLocation",
    "Tension Length",
    "track type",
    "level",
    "ACTION",
];

/// Category order of the summary table
const SUMMARY_ORDER: [Category; 5] = [
    Category::StaggerLeft,
    Category::StaggerRight,
    Category::WireWear,
    Category::HighHeight,
    Category::LowHeight,
];

/// One row of the repeat summary
///
/// `action` is left empty for the reviewer to fill in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: String,
    #[serde(rename = "startM")]
    pub start_m: f64,
    #[serde(rename = "endM")]
    pub end_m: f64,
    pub length: f64,
    #[serde(rename = "exception type")]
    pub exception_type: String,
    #[serde(rename = "maxValue")]
    pub max_value: f64,
    #[serde(rename = "maxLocation")]
    pub max_location: f64,
    #[serde(rename = "Tension Length")]
    pub tension_length: Option<String>,
    #[serde(rename = "track type")]
    pub track_type: TrackType,
    pub level: Level,
    #[serde(rename = "ACTION", default)]
    pub action: String,
}

impl From<&ExceptionRecord> for SummaryRecord {
    fn from(record: &ExceptionRecord) -> Self {
        Self {
            id: record.id.clone(),
            start_m: record.start_m,
            end_m: record.end_m,
            length: record.length,
            exception_type: record.exception_type.clone(),
            max_value: record.max_value,
            max_location: record.max_location,
            tension_length: record.tension_length.clone(),
            track_type: record.track_type,
            level: record.level,
            action: String::new(),
        }
    }
}

/// Matched ids of one summary row, `Previous 1` (oldest) first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousRow {
    pub id: String,
    pub previous: Vec<Option<String>>,
}

impl PreviousRow {
    /// Previous id `k` (1-based)
    pub fn get(&self, k: usize) -> Option<&str> {
        k.checked_sub(1)
            .and_then(|i| self.previous.get(i))
            .and_then(|p| p.as_deref())
    }
}

/// Summary of exceptions repeating across every compared report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatSummary {
    pub reports: usize,
    pub rows: Vec<SummaryRecord>,
    pub previous: Vec<PreviousRow>,
}

impl RepeatSummary {
    /// `Previous 1` .. `Previous n-1`
    pub fn previous_columns(&self) -> Vec<String> {
        previous_columns(self.reports.saturating_sub(1))
    }
}

pub fn previous_columns(count: usize) -> Vec<String> {
    (1..=count).map(|k| format!("Previous {k}")).collect()
}

fn table(report: &ExceptionTables, category: Category) -> Vec<ExceptionRecord> {
    report
        .get(&category)
        .map(|rows| {
            rows.iter()
                .filter(|r| !(category.is_stagger() && r.in_overlap()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Build the repeat summary from reports ordered oldest to newest
pub fn summarize(reports: &[ExceptionTables]) -> Result<RepeatSummary> {
    if !(MIN_REPORTS..=MAX_REPORTS).contains(&reports.len()) {
        return Err(CatexError::malformed(format!(
            "repeat summary needs {MIN_REPORTS}..={MAX_REPORTS} reports, got {}",
            reports.len()
        )));
    }
    let hops = reports.len() - 1;

    let mut tracked: Vec<TrackedException> = Vec::new();
    for category in SUMMARY_ORDER {
        let tables: Vec<Vec<ExceptionRecord>> =
            reports.iter().map(|report| table(report, category)).collect();
        let matched = match_series(&tables);
        info!(%category, repeats = matched.len(), "matched category across reports");
        tracked.extend(matched);
    }

    if let Some(latest) = reports.last() {
        for category in [Category::StaggerLeft, Category::StaggerRight] {
            tracked.extend(
                table(latest, category)
                    .into_iter()
                    .filter(|r| r.level == Level::L3)
                    .map(TrackedException::new),
            );
        }
    }

    let mut seen = HashSet::new();
    tracked.retain(|t| seen.insert(t.record.id.clone()));

    let rows = tracked.iter().map(|t| SummaryRecord::from(&t.record)).collect();
    let previous = tracked
        .iter()
        .map(|t| {
            let mut cells: Vec<Option<String>> = t.previous.iter().cloned().map(Some).collect();
            cells.resize(hops, None);
            PreviousRow {
                id: t.record.id.clone(),
                previous: cells,
            }
        })
        .collect();

    Ok(RepeatSummary {
        reports: reports.len(),
        rows,
        previous,
    })
}
