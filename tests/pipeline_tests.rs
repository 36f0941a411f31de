//! End-to-end library tests: detection, report round trip, repeat matching, trend review

use catex::config::CatexConfig;
use catex::csv_output;
use catex::input;
use catex::matcher;
use catex::metadata::{Range, SpanInfo, SurveyMetadata, ZoneBoundary};
use catex::prepare::RawReading;
use catex::report::ExceptionReport;
use catex::survey::{Category, Level, SurveyContext, TrackType};
use catex::threshold::ThresholdSet;
use catex::trend::{self, PriorReport, TrendDecision, TrendHistory};
use chrono::NaiveDate;
use tempfile::TempDir;

const THRESHOLDS: &str = include_str!("../thresholds.example.toml");

fn reading(km: f64, location: f64, wear: f64) -> RawReading {
    RawReading {
        km,
        location,
        stagger: [0.0; 4],
        wear: [wear, 11.5, 11.5, 11.5],
        height: [0.0; 4],
    }
}

fn tangent_everywhere() -> SurveyMetadata {
    SurveyMetadata {
        track_types: vec![Range::from_metres(0.0, 50_000.0, TrackType::Tangent)],
        ..Default::default()
    }
}

fn context(y: i32, m: u32, d: u32, section: &str) -> SurveyContext {
    SurveyContext::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), "EAL", section, "UP")
}

fn generate(readings: &[RawReading], metadata: &SurveyMetadata, ctx: SurveyContext) -> ExceptionReport {
    let thresholds = ThresholdSet::from_toml_str(THRESHOLDS).unwrap();
    ExceptionReport::generate(readings, metadata, &thresholds, ctx, &CatexConfig::default()).unwrap()
}

#[test]
fn test_runs_two_metres_apart_merge() {
    let mut readings: Vec<RawReading> = (0..=10).map(|m| reading(1.0, m as f64, 9.9)).collect();
    readings.push(reading(1.0, 11.0, 11.0));
    readings.extend((12..=20).map(|m| reading(1.0, m as f64, 9.7)));

    let report = generate(&readings, &tangent_everywhere(), context(2024, 3, 2, "LMC"));
    let wear = report.table(Category::WireWear);

    assert_eq!(wear.len(), 1);
    assert_eq!(wear[0].id, "20240302_EAL_LMC_UP_W0");
    assert_eq!(wear[0].start_m, 1000.0);
    assert_eq!(wear[0].end_m, 1020.0);
    assert_eq!(wear[0].max_value, 9.7);
    assert_eq!(wear[0].max_location, 1012.0);
    assert_eq!(wear[0].level, Level::L2);
}

#[test]
fn test_runs_beyond_chain_length_stay_apart() {
    let mut readings: Vec<RawReading> = (0..=10).map(|m| reading(1.0, m as f64, 9.9)).collect();
    readings.push(reading(1.0, 11.0, 11.0));
    readings.push(reading(1.0, 12.1, 9.9));
    readings.extend((13..=20).map(|m| reading(1.0, m as f64, 9.9)));

    let report = generate(&readings, &tangent_everywhere(), context(2024, 3, 2, "LMC"));
    let wear = report.table(Category::WireWear);

    assert_eq!(wear.len(), 2);
    assert_eq!((wear[0].start_m, wear[0].end_m), (1000.0, 1010.0));
    assert_eq!((wear[1].start_m, wear[1].end_m), (1012.1, 1020.0));
    assert_eq!(wear[1].id, "20240302_EAL_LMC_UP_W1");
}

#[test]
fn test_zone_bounds_override_line_default() {
    let mut metadata = tangent_everywhere();
    metadata.zones = vec![ZoneBoundary::from_metres("SCL", 2000.0, 2100.0, 2100.0, 2000.0)];

    let readings = vec![
        reading(1.0, 50.0, 9.9),
        reading(1.0, 51.0, 11.0),
        reading(2.0, 50.0, 9.9),
        reading(2.0, 51.0, 11.0),
        reading(2.0, 52.0, 9.7),
    ];
    let report = generate(&readings, &metadata, context(2024, 3, 2, "TUM-HUH"));
    let wear = report.table(Category::WireWear);

    // 9.9 is L2 on the line default (10.2) but clear of the SCL L2 bound (9.8)
    assert_eq!(wear.len(), 2);
    assert_eq!(wear[0].max_location, 1050.0);
    assert_eq!(wear[1].max_location, 2052.0);
    assert!(wear.iter().all(|r| r.level == Level::L2));
}

#[test]
fn test_unzoned_section_ignores_zones() {
    let mut metadata = tangent_everywhere();
    metadata.zones = vec![ZoneBoundary::from_metres("SCL", 2000.0, 2100.0, 2100.0, 2000.0)];

    let readings = vec![reading(2.0, 50.0, 9.9)];
    let report = generate(&readings, &metadata, context(2024, 3, 2, "LMC"));
    assert_eq!(report.table(Category::WireWear).len(), 1);
}

#[test]
fn test_annotation_rejection_and_untyped_locations() {
    let mut metadata = SurveyMetadata {
        track_types: vec![Range::from_metres(1000.0, 1030.0, TrackType::Curve)],
        ..Default::default()
    };
    metadata.spans = vec![Range::from_metres(
        1000.0,
        1030.0,
        SpanInfo {
            overlap: "N".to_string(),
            tension_length: Some("T1".to_string()),
        },
    )];
    metadata.landmarks = vec![Range::from_metres(1005.0, 1015.0, "Platform".to_string())];

    let mut low = reading(1.0, 20.0, 11.5);
    low.height = [-2000.0, 0.0, 0.0, 0.0];
    let readings = vec![
        reading(1.0, 12.0, 9.2),
        low,
        // outside every track-type range
        reading(1.0, 40.0, 5.0),
    ];
    let report = generate(&readings, &metadata, context(2024, 3, 2, "LMC"));

    let wear = report.table(Category::WireWear);
    assert_eq!(wear.len(), 1);
    assert_eq!(wear[0].level, Level::L1);
    assert_eq!(wear[0].track_type, TrackType::Curve);
    assert_eq!(wear[0].tension_length.as_deref(), Some("T1"));
    assert_eq!(wear[0].overlap.as_deref(), Some("N"));
    assert_eq!(wear[0].landmark, "Platform");

    assert_eq!(report.rejected_heights, vec![1020.0]);
    assert!(report.table(Category::LowHeight).is_empty());
}

/// Wear patch at 12000-12003 m with a given remaining thickness
fn worn_survey(wear: f64, left_stagger: f64) -> Vec<RawReading> {
    let mut readings: Vec<RawReading> = (0..=3).map(|m| reading(12.0, m as f64, wear)).collect();
    readings.extend((4..=12).map(|m| reading(12.0, m as f64, 11.5)));
    readings[10].stagger = [left_stagger, 0.0, 0.0, 0.0];
    readings
}

#[test]
fn test_three_surveys_to_confirmed_trend() {
    let metadata = tangent_everywhere();
    let surveys = [
        (context(2024, 1, 1, "LMC"), worn_survey(10.1, 0.0)),
        (context(2024, 2, 1, "LMC"), worn_survey(10.0, 0.0)),
        (context(2024, 3, 2, "LMC"), worn_survey(9.9, 230.0)),
    ];

    // Round trip every report through its CSV directory
    let tmp = TempDir::new().unwrap();
    let mut tables = Vec::new();
    for (i, (ctx, readings)) in surveys.iter().enumerate() {
        let report = generate(readings, &metadata, ctx.clone());
        let dir = tmp.path().join(format!("r{i}"));
        csv_output::write_report_dir(&report, &dir).unwrap();
        tables.push(input::read_report_dir(&dir).unwrap());
    }

    let summary = matcher::summarize(&tables).unwrap();
    assert_eq!(summary.reports, 3);
    assert_eq!(summary.previous_columns(), vec!["Previous 1", "Previous 2"]);

    let ids: Vec<&str> = summary.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["20240302_EAL_LMC_UP_W0", "20240302_EAL_LMC_UP_SL0"]);
    assert_eq!(
        summary.previous[0].previous,
        vec![
            Some("20240101_EAL_LMC_UP_W0".to_string()),
            Some("20240201_EAL_LMC_UP_W0".to_string())
        ]
    );
    assert_eq!(summary.previous[1].previous, vec![None, None]);
    assert_eq!(summary.rows[1].level, Level::L3);

    // Previous table survives a CSV round trip too
    let previous_path = tmp.path().join("previous.csv");
    csv_output::write_previous(std::fs::File::create(&previous_path).unwrap(), &summary).unwrap();
    let previous = input::read_previous(&previous_path).unwrap();

    let nearest = PriorReport::new(tables[1][&Category::WireWear].clone());
    let second = PriorReport::new(tables[0][&Category::WireWear].clone());
    let history = TrendHistory {
        nearest: &nearest,
        second: &second,
        older: &[],
    };
    let table = trend::analyze(&summary.rows, &previous, history, &CatexConfig::default().trend).unwrap();

    assert_eq!(
        table.dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ]
    );
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.values, vec![9.9, 10.0, 10.1]);
    assert!(row.logic1);
    assert!(!row.logic2);
    assert_eq!(row.result, TrendDecision::ConfirmedValidL2);
    assert!(row.fit.slope > 0.0);
}

#[test]
fn test_stagger_in_overlap_is_not_summarized() {
    let mut metadata = tangent_everywhere();
    metadata.spans = vec![Range::from_metres(
        12000.0,
        12020.0,
        SpanInfo {
            overlap: "Y".to_string(),
            tension_length: None,
        },
    )];

    let reports: Vec<_> = [(2024, 1, 1), (2024, 2, 1)]
        .into_iter()
        .map(|(y, m, d)| generate(&worn_survey(11.5, 320.0), &metadata, context(y, m, d, "LMC")).tables)
        .collect();
    assert_eq!(reports[1][&Category::StaggerLeft].len(), 1);

    let summary = matcher::summarize(&reports).unwrap();
    assert!(summary.rows.is_empty());
}
