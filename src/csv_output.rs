//! CSV output for exception, repeat, trend and wear tables
//!
//! Header rows are written explicitly so empty tables still carry their
//! full column set.

use crate::matcher::{RepeatSummary, SUMMARY_COLUMNS};
use crate::report::{ExceptionRecord, ExceptionReport, EXCEPTION_COLUMNS};
use crate::survey::{Category, SurveyContext, SURVEY_COLUMNS};
use crate::trend::{TrendTable, TREND_POINTS};
use crate::wear_summary::{WearStats, WEAR_SUMMARY_COLUMNS};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const REJECTED_HEIGHTS_FILE: &str = "rejected_heights.csv";
pub const SURVEY_FILE: &str = "survey.csv";
pub const SUMMARY_FILE: &str = "repeated_summary.csv";
pub const PREVIOUS_FILE: &str = "previous.csv";

fn headerless<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(out)
}

fn write_table<W: Write, T: Serialize>(out: W, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = headerless(out);
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_exceptions<W: Write>(out: W, rows: &[ExceptionRecord]) -> Result<()> {
    write_table(out, &EXCEPTION_COLUMNS, rows)
}

pub fn write_rejected_heights<W: Write>(out: W, locations_m: &[f64]) -> Result<()> {
    let mut writer = headerless(out);
    writer.write_record(["location"])?;
    for location in locations_m {
        writer.write_record([location.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_survey<W: Write>(out: W, context: &SurveyContext) -> Result<()> {
    write_table(out, &SURVEY_COLUMNS, std::slice::from_ref(context))
}

/// Write the survey context, one CSV per category, and the rejected heights into `dir`
pub fn write_report_dir(report: &ExceptionReport, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(SURVEY_FILE);
    write_survey(create(&path)?, &report.context)
        .with_context(|| format!("failed to write {}", path.display()))?;
    for category in Category::ALL {
        let path = dir.join(format!("{}.csv", category.file_stem()));
        write_exceptions(create(&path)?, report.table(category))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    let path = dir.join(REJECTED_HEIGHTS_FILE);
    write_rejected_heights(create(&path)?, &report.rejected_heights)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write every category into one table, in category order
pub fn write_report<W: Write>(out: W, report: &ExceptionReport) -> Result<()> {
    let rows: Vec<&ExceptionRecord> = Category::ALL
        .iter()
        .flat_map(|&c| report.table(c))
        .collect();
    write_table(out, &EXCEPTION_COLUMNS, &rows)
}

pub fn write_summary<W: Write>(out: W, summary: &RepeatSummary) -> Result<()> {
    write_table(out, &SUMMARY_COLUMNS, &summary.rows)
}

pub fn write_previous<W: Write>(out: W, summary: &RepeatSummary) -> Result<()> {
    let mut writer = headerless(out);
    let mut header = vec!["ID".to_string()];
    header.extend(summary.previous_columns());
    writer.write_record(&header)?;

    for row in &summary.previous {
        let mut record = vec![row.id.clone()];
        record.extend(row.previous.iter().map(|p| p.clone().unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_repeat_dir(summary: &RepeatSummary, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    write_summary(create(&dir.join(SUMMARY_FILE))?, summary)?;
    write_previous(create(&dir.join(PREVIOUS_FILE))?, summary)
}

/// Header of the trend table for the given survey dates
pub fn trend_columns(table: &TrendTable) -> Vec<String> {
    let mut columns: Vec<String> = SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(table.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()));
    columns.extend((1..=TREND_POINTS).map(|k| format!("trd pt {k}")));
    columns.extend(["logic1", "logic2", "result"].map(String::from));
    columns
}

pub fn write_trend<W: Write>(out: W, table: &TrendTable) -> Result<()> {
    let mut writer = headerless(out);
    writer.write_record(trend_columns(table))?;

    for row in &table.rows {
        let r = &row.record;
        let mut record = vec![
            r.id.clone(),
            r.start_m.to_string(),
            r.end_m.to_string(),
            r.length.to_string(),
            r.exception_type.clone(),
            r.max_value.to_string(),
            r.max_location.to_string(),
            r.tension_length.clone().unwrap_or_default(),
            r.track_type.to_string(),
            r.level.to_string(),
            r.action.clone(),
        ];
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.extend(row.trend_points.iter().map(|p| cell(*p)));
        record.extend([
            row.logic1.to_string(),
            row.logic2.to_string(),
            row.result.to_string(),
        ]);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_wear_summary<W: Write>(out: W, stats: &[WearStats]) -> Result<()> {
    write_table(out, &WEAR_SUMMARY_COLUMNS, stats)
}
