//! Remaining wire thickness statistics per tension length
//!
//! All four wear channels of every catenary reading inside a tension length
//! are pooled. Ranges sharing a label pool together, so a tension length
//! split across several ranges reports once.

use crate::metadata::Range;
use crate::trend::CatenaryReading;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trueno::Vector;

/// Column order of the wear summary table
pub const WEAR_SUMMARY_COLUMNS: [&str; 6] = [
    "Tension Length",
    "count",
    "mean",
    "mean-1sd",
    "mean-2sd",
    "mean-3sd",
];

/// Pooled wear statistics for one tension length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearStats {
    #[serde(rename = "Tension Length")]
    pub tension_length: String,
    pub count: usize,
    pub mean: f64,
    #[serde(rename = "mean-1sd")]
    pub minus_1sd: f64,
    #[serde(rename = "mean-2sd")]
    pub minus_2sd: f64,
    #[serde(rename = "mean-3sd")]
    pub minus_3sd: f64,
}

impl WearStats {
    /// Samples arrive narrowed to f32 for trueno (about 1e-6 mm); the
    /// statistics are widened back to f64.
    fn from_samples(tension_length: &str, samples: &[f32]) -> Self {
        let v = Vector::from_slice(samples);
        let n = samples.len();
        let mean = v.mean().unwrap_or(0.0) as f64;

        // trueno reports population variance
        let population = v.variance().unwrap_or(0.0) as f64;
        let sd = if n > 1 {
            (population * n as f64 / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            tension_length: tension_length.to_string(),
            count: n,
            mean,
            minus_1sd: mean - sd,
            minus_2sd: mean - 2.0 * sd,
            minus_3sd: mean - 3.0 * sd,
        }
    }
}

/// Summarise readings per tension-length label, in first-appearance order
pub fn summarize_wear(readings: &[CatenaryReading], ranges: &[Range<String>]) -> Vec<WearStats> {
    let mut labels: Vec<&str> = Vec::new();
    for range in ranges {
        if !labels.contains(&range.value.as_str()) {
            labels.push(&range.value);
        }
    }

    labels
        .into_iter()
        .filter_map(|label| {
            let samples: Vec<f32> = readings
                .iter()
                .filter(|r| {
                    let km = r.location_m / 1000.0;
                    ranges
                        .iter()
                        .any(|range| range.value == label && range.contains(km))
                })
                .flat_map(|r| r.wear.iter().map(|&w| w as f32))
                .collect();

            if samples.is_empty() {
                debug!(tension_length = label, "no catenary readings in tension length");
                return None;
            }
            Some(WearStats::from_samples(label, &samples))
        })
        .collect()
}
