//! Span and landmark annotation
//!
//! Attaches the overlap flag, tension length, and landmark containing each
//! exception's representative location, and converts the record to metres.

use crate::detector::MergedException;
use crate::metadata::SurveyMetadata;
use crate::report::ExceptionRecord;
use std::collections::HashSet;

/// Landmark label for locations outside every landmark range
pub const DEFAULT_LANDMARK: &str = "typical";

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Annotate merged exceptions and convert them to metre-based records
///
/// `decimals` is the number of decimal places kept on metre values.
/// Records with an identifier already seen are dropped.
pub fn annotate(
    exceptions: Vec<MergedException>,
    metadata: &SurveyMetadata,
    decimals: u32,
) -> Vec<ExceptionRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(exceptions.len());

    for exception in exceptions {
        if !seen.insert(exception.id.clone()) {
            continue;
        }

        let span = metadata.span_at(exception.rep_location);
        let landmark = metadata
            .landmark_at(exception.rep_location)
            .unwrap_or(DEFAULT_LANDMARK);

        let start_m = round_to(exception.start * 1000.0, decimals);
        let end_m = round_to(exception.end * 1000.0, decimals);

        records.push(ExceptionRecord {
            exception_type: exception.category.exception_type().to_string(),
            level: exception.level,
            start_m,
            end_m,
            length: round_to(end_m - start_m, decimals),
            max_value: exception.rep_value,
            max_location: round_to(exception.rep_location * 1000.0, decimals),
            track_type: exception.track_type,
            overlap: span.map(|s| s.overlap.clone()),
            tension_length: span.and_then(|s| s.tension_length.clone()),
            landmark: landmark.to_string(),
            id: exception.id,
        });
    }

    records
}
