//! JSON output format
//!
//! Every command wraps its result in the same versioned envelope.

use crate::matcher::RepeatSummary;
use crate::report::ExceptionReport;
use crate::trend::TrendTable;
use crate::wear_summary::WearStats;
use serde::Serialize;

pub const FORMAT: &str = "catex-json-v1";

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<T> {
    /// Crate version that produced the file
    pub version: String,
    /// Format name
    pub format: String,
    /// Command that produced `data`
    pub command: String,
    pub data: T,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn new(command: &str, data: T) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: FORMAT.to_string(),
            command: command.to_string(),
            data,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn report_json(report: &ExceptionReport) -> anyhow::Result<String> {
    JsonOutput::new("generate", report).to_json()
}

pub fn repeat_json(summary: &RepeatSummary) -> anyhow::Result<String> {
    JsonOutput::new("repeated", summary).to_json()
}

pub fn trend_json(table: &TrendTable) -> anyhow::Result<String> {
    JsonOutput::new("trend", table).to_json()
}

pub fn wear_json(stats: &[WearStats]) -> anyhow::Result<String> {
    JsonOutput::new("wear-summary", stats).to_json()
}
