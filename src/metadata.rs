//! Chainage lookup tables for one line/section/track
//!
//! Tables arrive in metres and are held in kilometres, the unit of prepared
//! samples. Every range is inclusive at both ends.

use crate::survey::TrackType;
use serde::{Deserialize, Serialize};

/// A labelled chainage range in km
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub from: f64,
    pub to: f64,
    pub value: T,
}

impl<T> Range<T> {
    pub fn from_metres(from_m: f64, to_m: f64, value: T) -> Self {
        Self {
            from: from_m / 1000.0,
            to: to_m / 1000.0,
            value,
        }
    }

    pub fn contains(&self, location: f64) -> bool {
        self.from <= location && location <= self.to
    }
}

/// Zone boundary with separate up-track and down-track chainages (km)
///
/// Down-track boundaries are recorded from the higher chainage to the lower,
/// so containment is checked as `to <= location <= from` on that track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBoundary {
    pub class: String,
    pub up_from: f64,
    pub up_to: f64,
    pub down_from: f64,
    pub down_to: f64,
}

impl ZoneBoundary {
    pub fn from_metres(
        class: impl Into<String>,
        up_from_m: f64,
        up_to_m: f64,
        down_from_m: f64,
        down_to_m: f64,
    ) -> Self {
        Self {
            class: class.into(),
            up_from: up_from_m / 1000.0,
            up_to: up_to_m / 1000.0,
            down_from: down_from_m / 1000.0,
            down_to: down_to_m / 1000.0,
        }
    }

    pub fn contains(&self, location: f64, descending: bool) -> bool {
        if descending {
            self.down_to <= location && location <= self.down_from
        } else {
            self.up_from <= location && location <= self.up_to
        }
    }
}

/// Overlap flag and tension length label of a catenary span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanInfo {
    /// `Y` inside an overlap span, `N` otherwise
    pub overlap: String,
    pub tension_length: Option<String>,
}

/// All lookup tables needed to prepare and annotate one survey
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyMetadata {
    pub track_types: Vec<Range<TrackType>>,
    /// Applied in order; a later boundary overrides an earlier one
    pub zones: Vec<ZoneBoundary>,
    pub spans: Vec<Range<SpanInfo>>,
    pub landmarks: Vec<Range<String>>,
}

impl SurveyMetadata {
    /// First track-type range containing the location
    pub fn track_type_at(&self, location: f64) -> Option<TrackType> {
        self.track_types
            .iter()
            .find(|r| r.contains(location))
            .map(|r| r.value)
    }

    /// Last zone boundary containing the location
    pub fn zone_at(&self, location: f64, descending: bool) -> Option<&str> {
        self.zones
            .iter()
            .rev()
            .find(|z| z.contains(location, descending))
            .map(|z| z.class.as_str())
    }

    pub fn span_at(&self, location: f64) -> Option<&SpanInfo> {
        self.spans
            .iter()
            .find(|r| r.contains(location))
            .map(|r| &r.value)
    }

    pub fn landmark_at(&self, location: f64) -> Option<&str> {
        self.landmarks
            .iter()
            .find(|r| r.contains(location))
            .map(|r| r.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> SurveyMetadata {
        SurveyMetadata {
            track_types: vec![
                Range::from_metres(1000.0, 1500.0, TrackType::Tangent),
                Range::from_metres(1500.0, 2000.0, TrackType::Curve),
            ],
            zones: vec![
                ZoneBoundary::from_metres("MOL", 1000.0, 3000.0, 3000.0, 1000.0),
                ZoneBoundary::from_metres("SCL", 1800.0, 2200.0, 2200.0, 1800.0),
            ],
            spans: vec![Range::from_metres(
                1200.0,
                1300.0,
                SpanInfo {
                    overlap: "Y".to_string(),
                    tension_length: Some("T12".to_string()),
                },
            )],
            landmarks: vec![Range::from_metres(1250.0, 1260.0, "bridge".to_string())],
        }
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let r = Range::from_metres(1000.0, 1500.0, ());
        assert!(r.contains(1.0));
        assert!(r.contains(1.5));
        assert!(!r.contains(1.50001));
    }

    #[test]
    fn test_first_track_type_wins_on_shared_boundary() {
        let m = metadata();
        assert_eq!(m.track_type_at(1.5), Some(TrackType::Tangent));
        assert_eq!(m.track_type_at(1.6), Some(TrackType::Curve));
        assert_eq!(m.track_type_at(2.5), None);
    }

    #[test]
    fn test_later_zone_overrides() {
        let m = metadata();
        assert_eq!(m.zone_at(1.2, false), Some("MOL"));
        assert_eq!(m.zone_at(1.9, false), Some("SCL"));
        assert_eq!(m.zone_at(3.5, false), None);
    }

    #[test]
    fn test_down_track_zone_is_checked_descending() {
        let zone = ZoneBoundary::from_metres("SCL", 100.0, 200.0, 900.0, 700.0);
        assert!(zone.contains(0.8, true));
        assert!(!zone.contains(0.8, false));
        assert!(zone.contains(0.15, false));
        assert!(!zone.contains(0.15, true));
    }

    #[test]
    fn test_span_and_landmark_lookup() {
        let m = metadata();
        let span = m.span_at(1.25).unwrap();
        assert_eq!(span.overlap, "Y");
        assert_eq!(span.tension_length.as_deref(), Some("T12"));
        assert_eq!(m.landmark_at(1.255), Some("bridge"));
        assert!(m.span_at(1.4).is_none());
        assert!(m.landmark_at(1.4).is_none());
    }
}
