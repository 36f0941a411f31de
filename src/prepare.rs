//! Sample preparation
//!
//! Collapses raw four-channel readings into one value per location per
//! category, drops implausible heights, and tags each location with its
//! zone and track type.

use crate::config::CatexConfig;
use crate::metadata::SurveyMetadata;
use crate::survey::{Category, SurveyContext, TrackType};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One raw row of a DATAC export
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Kilometre post
    pub km: f64,
    /// Metres past the kilometre post
    pub location: f64,
    pub stagger: [f64; 4],
    pub wear: [f64; 4],
    /// Height channels relative to the datum (see `height_offset_mm`)
    pub height: [f64; 4],
}

/// Category value at one location
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Chainage in km
    pub location: f64,
    pub value: f64,
    pub zone: Option<String>,
    pub track_type: TrackType,
}

/// Output of preparation: one location-ordered series per category
#[derive(Debug, Clone, Default)]
pub struct PreparedSurvey {
    series: BTreeMap<Category, Vec<Sample>>,
    /// Locations (km) dropped from the height series by the sanity floor
    pub rejected_heights: Vec<f64>,
    /// Locations (km) outside every track-type range
    pub untyped_locations: Vec<f64>,
}

impl PreparedSurvey {
    pub fn samples(&self, category: Category) -> &[Sample] {
        self.series.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy)]
struct LocationExtremes {
    stagger_max: f64,
    stagger_min: f64,
    wear_min: f64,
    height_min: f64,
    height_max: f64,
}

impl LocationExtremes {
    fn new() -> Self {
        Self {
            stagger_max: f64::NEG_INFINITY,
            stagger_min: f64::INFINITY,
            wear_min: f64::INFINITY,
            height_min: f64::INFINITY,
            height_max: f64::NEG_INFINITY,
        }
    }

    fn absorb(&mut self, reading: &RawReading, height_offset: f64) {
        self.stagger_max = self
            .stagger_max
            .max(Category::StaggerLeft.reduce(reading.stagger));
        self.stagger_min = self
            .stagger_min
            .min(Category::StaggerRight.reduce(reading.stagger));
        self.wear_min = self.wear_min.min(Category::WireWear.reduce(reading.wear));

        let height = reading.height.map(|h| h + height_offset);
        self.height_min = self.height_min.min(Category::LowHeight.reduce(height));
        self.height_max = self.height_max.max(Category::HighHeight.reduce(height));
    }

    fn value(&self, category: Category) -> f64 {
        match category {
            Category::WireWear => self.wear_min,
            Category::LowHeight => self.height_min,
            Category::HighHeight => self.height_max,
            Category::StaggerLeft => self.stagger_max,
            Category::StaggerRight => self.stagger_min,
        }
    }
}

/// Chainage in km, rounded to `decimals` places, as an integer key
fn chainage_key(reading: &RawReading, scale: f64) -> i64 {
    ((reading.km + reading.location * 0.001) * scale).round() as i64
}

/// Prepare one survey's readings for detection
pub fn prepare(
    readings: &[RawReading],
    metadata: &SurveyMetadata,
    ctx: &SurveyContext,
    config: &CatexConfig,
) -> PreparedSurvey {
    let scale = 10f64.powi(config.location_decimals as i32);

    let mut by_location: BTreeMap<i64, LocationExtremes> = BTreeMap::new();
    for reading in readings {
        by_location
            .entry(chainage_key(reading, scale))
            .or_insert_with(LocationExtremes::new)
            .absorb(reading, config.height_offset_mm);
    }

    let zoned = !config.is_unzoned(&ctx.section);
    let descending = ctx.is_descending();
    let mut prepared = PreparedSurvey::default();

    for (key, extremes) in &by_location {
        let location = *key as f64 / scale;

        let Some(track_type) = metadata.track_type_at(location) else {
            prepared.untyped_locations.push(location);
            continue;
        };
        let zone = if zoned {
            metadata.zone_at(location, descending).map(str::to_string)
        } else {
            None
        };
        let height_ok = extremes.height_min >= config.height_floor_mm;
        if !height_ok {
            prepared.rejected_heights.push(location);
        }

        for category in Category::ALL {
            let is_height = matches!(category, Category::LowHeight | Category::HighHeight);
            if is_height && !height_ok {
                continue;
            }
            prepared
                .series
                .entry(category)
                .or_default()
                .push(Sample {
                    location,
                    value: extremes.value(category),
                    zone: zone.clone(),
                    track_type,
                });
        }
    }

    if !prepared.rejected_heights.is_empty() {
        warn!(
            count = prepared.rejected_heights.len(),
            floor_mm = config.height_floor_mm,
            "dropped locations with implausible contact-wire height"
        );
    }
    if !prepared.untyped_locations.is_empty() {
        debug!(
            count = prepared.untyped_locations.len(),
            "dropped locations outside every track-type range"
        );
    }
    info!(
        readings = readings.len(),
        locations = by_location.len(),
        "prepared survey samples"
    );

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Range, ZoneBoundary};
    use chrono::NaiveDate;

    fn reading(km: f64, location: f64, stagger: [f64; 4], wear: [f64; 4], height: [f64; 4]) -> RawReading {
        RawReading {
            km,
            location,
            stagger,
            wear,
            height,
        }
    }

    fn ctx(section: &str, track: &str) -> SurveyContext {
        SurveyContext::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "EAL",
            section,
            track,
        )
    }

    fn metadata() -> SurveyMetadata {
        SurveyMetadata {
            track_types: vec![Range::from_metres(1000.0, 1010.0, TrackType::Curve)],
            zones: vec![ZoneBoundary::from_metres("SCL", 1000.0, 1005.0, 1010.0, 1005.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_reducers_span_rows_and_channels() {
        let readings = vec![
            reading(1.0, 2.0, [10.0, -20.0, 5.0, 0.0], [11.0, 10.5, 12.0, 11.8], [0.0, 10.0, -5.0, 3.0]),
            reading(1.0, 2.0, [30.0, -5.0, 0.0, 0.0], [10.9, 10.7, 12.0, 11.0], [20.0, 0.0, 0.0, 0.0]),
        ];
        let prepared = prepare(&readings, &metadata(), &ctx("TUM-HUH", "UP"), &CatexConfig::default());

        let left = prepared.samples(Category::StaggerLeft);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].location, 1.002);
        assert_eq!(left[0].value, 30.0);
        assert_eq!(prepared.samples(Category::StaggerRight)[0].value, -20.0);
        assert_eq!(prepared.samples(Category::WireWear)[0].value, 10.5);
        assert_eq!(prepared.samples(Category::LowHeight)[0].value, 5295.0);
        assert_eq!(prepared.samples(Category::HighHeight)[0].value, 5320.0);
    }

    #[test]
    fn test_height_floor_drops_location_from_height_series_only() {
        let readings = vec![
            reading(1.0, 1.0, [0.0; 4], [11.0; 4], [0.0, 0.0, -2000.0, 0.0]),
            reading(1.0, 2.0, [0.0; 4], [11.0; 4], [0.0; 4]),
        ];
        let prepared = prepare(&readings, &metadata(), &ctx("LMC", "UP"), &CatexConfig::default());

        assert_eq!(prepared.rejected_heights, vec![1.001]);
        assert_eq!(prepared.samples(Category::LowHeight).len(), 1);
        assert_eq!(prepared.samples(Category::HighHeight).len(), 1);
        assert_eq!(prepared.samples(Category::WireWear).len(), 2);
    }

    #[test]
    fn test_untyped_locations_are_dropped() {
        let readings = vec![
            reading(1.0, 5.0, [0.0; 4], [11.0; 4], [0.0; 4]),
            reading(1.0, 50.0, [0.0; 4], [11.0; 4], [0.0; 4]),
        ];
        let prepared = prepare(&readings, &metadata(), &ctx("LMC", "UP"), &CatexConfig::default());
        assert_eq!(prepared.untyped_locations, vec![1.05]);
        assert_eq!(prepared.samples(Category::WireWear).len(), 1);
    }

    #[test]
    fn test_zone_assignment_respects_direction_and_unzoned_sections() {
        let readings = vec![
            reading(1.0, 3.0, [0.0; 4], [11.0; 4], [0.0; 4]),
            reading(1.0, 8.0, [0.0; 4], [11.0; 4], [0.0; 4]),
        ];
        let config = CatexConfig::default();

        let up = prepare(&readings, &metadata(), &ctx("TUM-HUH", "UP"), &config);
        let zones: Vec<_> = up.samples(Category::WireWear).iter().map(|s| s.zone.clone()).collect();
        assert_eq!(zones, vec![Some("SCL".to_string()), None]);

        let down = prepare(&readings, &metadata(), &ctx("TUM-HUH", "DN"), &config);
        let zones: Vec<_> = down.samples(Category::WireWear).iter().map(|s| s.zone.clone()).collect();
        assert_eq!(zones, vec![None, Some("SCL".to_string())]);

        let unzoned = prepare(&readings, &metadata(), &ctx("LMC", "UP"), &config);
        assert!(unzoned.samples(Category::WireWear).iter().all(|s| s.zone.is_none()));
    }

    #[test]
    fn test_samples_are_location_ordered() {
        let readings = vec![
            reading(1.0, 9.0, [0.0; 4], [11.0; 4], [0.0; 4]),
            reading(1.0, 1.0, [0.0; 4], [11.0; 4], [0.0; 4]),
            reading(1.0, 4.0, [0.0; 4], [11.0; 4], [0.0; 4]),
        ];
        let prepared = prepare(&readings, &metadata(), &ctx("LMC", "UP"), &CatexConfig::default());
        let locations: Vec<f64> = prepared.samples(Category::WireWear).iter().map(|s| s.location).collect();
        assert_eq!(locations, vec![1.001, 1.004, 1.009]);
    }

    #[test]
    fn test_empty_category_has_no_samples() {
        let prepared = PreparedSurvey::default();
        assert!(prepared.samples(Category::HighHeight).is_empty());
    }
}
