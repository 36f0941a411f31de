// Wire wear L2 trend review
//
// Each unreviewed L2 wire wear exception in a repeat summary gets up to six
// observations: the latest survey, its two matched predecessors, and up to
// three older surveys. A straight line through them decides whether the L2
// is real, needs a site check, or can be dismissed.

mod fit;
mod resolve;

pub use fit::{fit_line, LinearFit};
pub use resolve::{
    nearest_reading, resolve_history, resolve_predecessor, CatenaryReading, HistoricalSurvey,
    Observation, PriorReport,
};

use crate::config::TrendConfig;
use crate::error::{CatexError, Result};
use crate::matcher::{PreviousRow, SummaryRecord};
use crate::report::sort_by_sequence;
use crate::survey::{Category, ExceptionId, Level};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Latest survey, two matched predecessors, three older surveys
pub const TREND_POINTS: usize = 6;
pub const MAX_HISTORY: usize = TREND_POINTS - 3;

/// Review outcome for one exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDecision {
    #[serde(rename = "no action required")]
    NoActionRequired,
    #[serde(rename = "verify on site")]
    VerifyOnSite,
    #[serde(rename = "confirmed valid L2")]
    ConfirmedValidL2,
}

impl TrendDecision {
    pub fn decide(below_floor: bool, off_trend: bool) -> Self {
        match (below_floor, off_trend) {
            (false, _) => TrendDecision::NoActionRequired,
            (true, true) => TrendDecision::VerifyOnSite,
            (true, false) => TrendDecision::ConfirmedValidL2,
        }
    }
}

impl fmt::Display for TrendDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDecision::NoActionRequired => f.write_str("no action required"),
            TrendDecision::VerifyOnSite => f.write_str("verify on site"),
            TrendDecision::ConfirmedValidL2 => f.write_str("confirmed valid L2"),
        }
    }
}

/// Trend review of one exception
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub record: SummaryRecord,
    /// Observed values, latest first, aligned with [`TrendTable::dates`]
    pub values: Vec<f64>,
    /// Fitted values at each observation's day offset
    pub trend_points: [Option<f64>; TREND_POINTS],
    pub fit: LinearFit,
    /// Fitted day-0 value is at or below the confirmation floor
    pub logic1: bool,
    /// Latest reading is further than the tolerance from the day-0 fit
    pub logic2: bool,
    pub result: TrendDecision,
}

/// Trend review of every candidate in a repeat summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendTable {
    /// Survey dates, latest first
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TrendRow>,
}

/// Earlier surveys available to the review, nearest first
#[derive(Debug, Clone, Copy)]
pub struct TrendHistory<'a> {
    /// Report matched as the last `Previous` column
    pub nearest: &'a PriorReport,
    /// Report matched as the column before it
    pub second: &'a PriorReport,
    /// Up to three older surveys, most recent first
    pub older: &'a [HistoricalSurvey],
}

/// Unreviewed L2 wire wear rows
pub fn candidates(summary: &[SummaryRecord]) -> Vec<&SummaryRecord> {
    summary
        .iter()
        .filter(|r| {
            r.exception_type == Category::WireWear.exception_type()
                && r.level == Level::L2
                && r.action.trim().is_empty()
        })
        .collect()
}

fn predecessors<'a>(previous: &'a [PreviousRow], id: &str) -> Result<(&'a str, &'a str)> {
    let row = previous
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| CatexError::missing(format!("{id} has no row in the previous table")))?;

    let chain: Vec<&str> = row.previous.iter().flatten().map(String::as_str).collect();
    match chain.as_slice() {
        [.., second, nearest] => Ok((*nearest, *second)),
        _ => Err(CatexError::missing(format!(
            "{id} needs two matched predecessors, found {}",
            chain.len()
        ))),
    }
}

fn days_between(latest: NaiveDate, earlier: NaiveDate) -> f64 {
    (latest - earlier).num_days() as f64
}

/// Review every candidate of a repeat summary
pub fn analyze(
    summary: &[SummaryRecord],
    previous: &[PreviousRow],
    history: TrendHistory<'_>,
    config: &TrendConfig,
) -> Result<TrendTable> {
    if history.older.len() > MAX_HISTORY {
        return Err(CatexError::malformed(format!(
            "at most {MAX_HISTORY} older surveys are supported, got {}",
            history.older.len()
        )));
    }

    let candidates = candidates(summary);
    info!(
        candidates = candidates.len(),
        older = history.older.len(),
        "reviewing wire wear L2 trends"
    );

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut rows = Vec::with_capacity(candidates.len());

    for record in candidates {
        let latest_date = record.id.parse::<ExceptionId>()?.date;
        let (nearest_id, second_id) = predecessors(previous, &record.id)?;

        let mut observations = vec![
            Observation {
                date: latest_date,
                value: record.max_value,
            },
            resolve_predecessor(history.nearest, nearest_id)?,
            resolve_predecessor(history.second, second_id)?,
        ];
        for survey in history.older {
            observations.push(resolve_history(survey, record, config.fallback_max_distance)?);
        }

        let row_dates: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
        if dates.is_empty() {
            dates = row_dates;
        } else if dates != row_dates {
            return Err(CatexError::malformed(format!(
                "{} resolves to survey dates {row_dates:?}, expected {dates:?}",
                record.id
            )));
        }

        let points: Vec<(f64, f64)> = observations
            .iter()
            .map(|o| (days_between(latest_date, o.date), o.value))
            .collect();
        let fit = fit_line(&points)?;

        let mut trend_points = [None; TREND_POINTS];
        for (slot, (days, _)) in trend_points.iter_mut().zip(&points) {
            *slot = Some(fit.at(*days));
        }

        let day0 = fit.at(0.0);
        let logic1 = day0 <= config.confirmation_floor;
        let logic2 = (record.max_value - day0).abs() > config.tolerance;
        let result = TrendDecision::decide(logic1, logic2);
        debug!(id = %record.id, slope = fit.slope, day0, %result, "trend reviewed");

        rows.push(TrendRow {
            record: record.clone(),
            values: points.iter().map(|(_, v)| *v).collect(),
            trend_points,
            fit,
            logic1,
            logic2,
            result,
        });
    }

    sort_by_sequence(&mut rows, |r| r.record.id.as_str());
    Ok(TrendTable { dates, rows })
}
