//! Survey vocabulary: exception categories, severity levels, track types,
//! the survey context, and exception identifiers.
//!
//! Identifiers follow `{YYYYMMDD}_{line}_{section}_{track}_{code}{n}`, for
//! example `20240613_EAL_LMC_UP_W3`, with `n` a 0-based sequence number
//! unique per category within one survey.

use crate::error::{CatexError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which end of the value range is the bad end for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Lower is worse (wire wear, low height, right stagger)
    Min,
    /// Upper is worse (high height, left stagger)
    Max,
}

impl Extremum {
    /// True if `candidate` is strictly worse than `incumbent`
    pub fn is_worse(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Extremum::Min => candidate < incumbent,
            Extremum::Max => candidate > incumbent,
        }
    }
}

/// Exception category, one per reducer over the four measurement channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WireWear,
    LowHeight,
    HighHeight,
    StaggerLeft,
    StaggerRight,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::WireWear,
        Category::LowHeight,
        Category::HighHeight,
        Category::StaggerLeft,
        Category::StaggerRight,
    ];

    /// Two-letter (or one-letter) code used in exception identifiers
    pub fn code(self) -> &'static str {
        match self {
            Category::WireWear => "W",
            Category::LowHeight => "LH",
            Category::HighHeight => "HH",
            Category::StaggerLeft => "SL",
            Category::StaggerRight => "SR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Label written to the `exception type` column
    pub fn exception_type(self) -> &'static str {
        match self {
            Category::WireWear => "Wire Wear",
            Category::LowHeight => "Low Height",
            Category::HighHeight => "High Height",
            Category::StaggerLeft | Category::StaggerRight => "Stagger",
        }
    }

    /// Threshold family this category reads its bounds from
    pub fn kind(self) -> ExceptionKind {
        match self {
            Category::WireWear => ExceptionKind::WireWear,
            Category::LowHeight => ExceptionKind::LowHeight,
            Category::HighHeight => ExceptionKind::HighHeight,
            Category::StaggerLeft | Category::StaggerRight => ExceptionKind::Stagger,
        }
    }

    pub fn extremum(self) -> Extremum {
        match self {
            Category::WireWear | Category::LowHeight | Category::StaggerRight => Extremum::Min,
            Category::HighHeight | Category::StaggerLeft => Extremum::Max,
        }
    }

    /// Reduce the four channel readings at one location to the category value
    pub fn reduce(self, channels: [f64; 4]) -> f64 {
        match self.extremum() {
            Extremum::Min => channels.into_iter().fold(f64::INFINITY, f64::min),
            Extremum::Max => channels.into_iter().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Tier whose breach decides whether an exception exists at all
    pub fn detection_tier(self) -> Level {
        match self.kind() {
            ExceptionKind::Stagger => Level::L3,
            _ => Level::L2,
        }
    }

    /// Stem of the per-category table file inside a report directory
    pub fn file_stem(self) -> &'static str {
        match self {
            Category::WireWear => "wear",
            Category::LowHeight => "low_height",
            Category::HighHeight => "high_height",
            Category::StaggerLeft => "stagger_left",
            Category::StaggerRight => "stagger_right",
        }
    }

    pub fn is_stagger(self) -> bool {
        self.kind() == ExceptionKind::Stagger
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::WireWear => "wire wear",
            Category::LowHeight => "low height",
            Category::HighHeight => "high height",
            Category::StaggerLeft => "stagger left",
            Category::StaggerRight => "stagger right",
        };
        f.write_str(label)
    }
}

/// Threshold family as written in threshold tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    WireWear,
    LowHeight,
    HighHeight,
    Stagger,
}

/// Severity tier, L1 most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    L1,
    L2,
    L3,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::L1 => f.write_str("L1"),
            Level::L2 => f.write_str("L2"),
            Level::L3 => f.write_str("L3"),
        }
    }
}

/// Track curvature at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackType {
    #[serde(alias = "tangent")]
    Tangent,
    #[serde(alias = "curve")]
    Curve,
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackType::Tangent => f.write_str("Tangent"),
            TrackType::Curve => f.write_str("Curve"),
        }
    }
}

/// Column order of the survey context table in a report directory
pub const SURVEY_COLUMNS: [&str; 4] = ["date", "line", "section", "track"];

/// Identity of one measurement sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyContext {
    pub date: NaiveDate,
    pub line: String,
    pub section: String,
    pub track: String,
}

impl SurveyContext {
    pub fn new(
        date: NaiveDate,
        line: impl Into<String>,
        section: impl Into<String>,
        track: impl Into<String>,
    ) -> Self {
        Self {
            date,
            line: line.into(),
            section: section.into(),
            track: track.into(),
        }
    }

    /// `YYYYMMDD` form of the survey date
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Down-track zone boundaries run from high chainage to low
    pub fn is_descending(&self) -> bool {
        self.track.eq_ignore_ascii_case("DN")
    }

    pub fn exception_id(&self, category: Category, index: usize) -> String {
        format!(
            "{}_{}_{}_{}_{}{}",
            self.date_stamp(),
            self.line,
            self.section,
            self.track,
            category.code(),
            index
        )
    }
}

/// Parsed exception identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionId {
    pub date: NaiveDate,
    pub category: Category,
    pub index: usize,
}

impl FromStr for ExceptionId {
    type Err = CatexError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || CatexError::malformed(format!("invalid exception id '{s}'"));

        if s.split('_').count() < 3 {
            return Err(bad());
        }
        let stamp = s.get(..8).ok_or_else(bad)?;
        if !stamp.bytes().all(|b| b.is_ascii_digit()) || s.as_bytes().get(8) != Some(&b'_') {
            return Err(bad());
        }
        let date = NaiveDate::parse_from_str(stamp, "%Y%m%d").map_err(|_| bad())?;

        let (_, tail) = s.rsplit_once('_').ok_or_else(bad)?;
        let split = tail.find(|c: char| c.is_ascii_digit()).ok_or_else(bad)?;
        let (code, digits) = tail.split_at(split);
        let category = Category::from_code(code).ok_or_else(bad)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let index = digits.parse().map_err(|_| bad())?;

        Ok(ExceptionId {
            date,
            category,
            index,
        })
    }
}
