//! Exception report: one annotated table per category for one survey

use crate::annotate::annotate;
use crate::config::CatexConfig;
use crate::detector::Detector;
use crate::error::Result;
use crate::metadata::SurveyMetadata;
use crate::prepare::{prepare, RawReading};
use crate::survey::{Category, ExceptionId, Level, SurveyContext, TrackType};
use crate::threshold::ThresholdSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Column order of exception tables
pub const EXCEPTION_COLUMNS: [&str; 12] = [
    "id",
    "exception type",
    "level",
    "startM",
    "endM",
    "length",
    "maxValue",
    "maxLocation",
    "track type",
    "Overlap",
    "Tension Length",
    "Landmark",
];

/// One exception as reported, locations in metres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub id: String,
    #[serde(rename = "exception type")]
    pub exception_type: String,
    pub level: Level,
    #[serde(rename = "startM")]
    pub start_m: f64,
    #[serde(rename = "endM")]
    pub end_m: f64,
    pub length: f64,
    #[serde(rename = "maxValue")]
    pub max_value: f64,
    #[serde(rename = "maxLocation")]
    pub max_location: f64,
    #[serde(rename = "track type")]
    pub track_type: TrackType,
    #[serde(rename = "Overlap")]
    pub overlap: Option<String>,
    #[serde(rename = "Tension Length")]
    pub tension_length: Option<String>,
    #[serde(rename = "Landmark")]
    pub landmark: String,
}

impl ExceptionRecord {
    /// Inside an overlap span
    pub fn in_overlap(&self) -> bool {
        self.overlap.as_deref() == Some("Y")
    }
}

/// Sequence number at the end of an identifier, if it parses
pub fn sequence_of(id: &str) -> Option<usize> {
    id.parse::<ExceptionId>().ok().map(|parsed| parsed.index)
}

/// Stable sort by identifier sequence number; unparseable ids go last
pub fn sort_by_sequence<T>(rows: &mut [T], id: impl Fn(&T) -> &str) {
    rows.sort_by_key(|row| sequence_of(id(row)).unwrap_or(usize::MAX));
}

/// Exception tables keyed by category
pub type ExceptionTables = BTreeMap<Category, Vec<ExceptionRecord>>;

/// All exception tables of one survey
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionReport {
    pub context: SurveyContext,
    pub tables: ExceptionTables,
    /// Locations (m) whose height readings were discarded
    pub rejected_heights: Vec<f64>,
}

impl ExceptionReport {
    /// Run the full detection pipeline for one survey
    pub fn generate(
        readings: &[RawReading],
        metadata: &SurveyMetadata,
        thresholds: &ThresholdSet,
        context: SurveyContext,
        config: &CatexConfig,
    ) -> Result<Self> {
        let prepared = prepare(readings, metadata, &context, config);
        let detector = Detector::new(thresholds, &context, config);
        let decimals = config.location_decimals.saturating_sub(3);

        let mut tables = ExceptionTables::new();
        for category in Category::ALL {
            let merged = detector.detect(category, prepared.samples(category))?;
            let mut records = annotate(merged, metadata, decimals);
            sort_by_sequence(&mut records, |r| r.id.as_str());
            info!(%category, exceptions = records.len(), "detected exceptions");
            tables.insert(category, records);
        }

        let rejected_heights = prepared
            .rejected_heights
            .iter()
            .map(|km| km * 1000.0)
            .collect();

        Ok(Self {
            context,
            tables,
            rejected_heights,
        })
    }

    pub fn table(&self, category: Category) -> &[ExceptionRecord] {
        self.tables.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ExceptionRecord {
        ExceptionRecord {
            id: id.to_string(),
            exception_type: "Wire Wear".to_string(),
            level: Level::L2,
            start_m: 0.0,
            end_m: 0.0,
            length: 0.0,
            max_value: 10.0,
            max_location: 0.0,
            track_type: TrackType::Tangent,
            overlap: None,
            tension_length: None,
            landmark: "typical".to_string(),
        }
    }

    #[test]
    fn test_sort_by_sequence_is_numeric() {
        let mut rows = vec![
            record("20240101_EAL_LMC_UP_W10"),
            record("20240101_EAL_LMC_UP_W2"),
            record("garbage"),
            record("20240101_EAL_LMC_UP_W0"),
        ];
        sort_by_sequence(&mut rows, |r| r.id.as_str());
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "20240101_EAL_LMC_UP_W0",
                "20240101_EAL_LMC_UP_W2",
                "20240101_EAL_LMC_UP_W10",
                "garbage"
            ]
        );
    }

    #[test]
    fn test_overlap_flag() {
        let mut r = record("x");
        assert!(!r.in_overlap());
        r.overlap = Some("Y".to_string());
        assert!(r.in_overlap());
    }

    #[test]
    fn test_missing_table_is_empty() {
        let report = ExceptionReport {
            context: SurveyContext::new(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                "EAL",
                "LMC",
                "UP",
            ),
            tables: ExceptionTables::new(),
            rejected_heights: Vec::new(),
        };
        assert!(report.table(Category::WireWear).is_empty());
        assert_eq!(report.total(), 0);
    }
}
