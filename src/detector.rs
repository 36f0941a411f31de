//! Per-category exception detection
//!
//! Flags each prepared sample against its detection tier, groups the flags
//! into chained runs, then grades every merged run from its representative
//! value and assigns its identifier.

use crate::config::CatexConfig;
use crate::error::Result;
use crate::grouping::{group_samples, RunKey};
use crate::prepare::Sample;
use crate::survey::{Category, Level, SurveyContext, TrackType};
use crate::threshold::{Classifier, ThresholdSet};
use serde::Serialize;
use tracing::debug;

/// A graded exception, locations in km
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedException {
    pub id: String,
    pub category: Category,
    pub level: Level,
    pub start: f64,
    pub end: f64,
    pub rep_value: f64,
    pub rep_location: f64,
    pub zone: Option<String>,
    pub track_type: TrackType,
}

impl MergedException {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Detects exceptions for one survey
#[derive(Debug, Clone, Copy)]
pub struct Detector<'a> {
    thresholds: &'a ThresholdSet,
    ctx: &'a SurveyContext,
    config: &'a CatexConfig,
}

impl<'a> Detector<'a> {
    pub fn new(thresholds: &'a ThresholdSet, ctx: &'a SurveyContext, config: &'a CatexConfig) -> Self {
        Self {
            thresholds,
            ctx,
            config,
        }
    }

    /// Detect one category over its location-ordered samples
    ///
    /// Identifiers are numbered from 0 in start order.
    pub fn detect(&self, category: Category, samples: &[Sample]) -> Result<Vec<MergedException>> {
        let classifier = Classifier::new(self.thresholds, &self.ctx.section, category);

        let keys = samples
            .iter()
            .map(|sample| {
                Ok(RunKey {
                    breach: classifier.detects(sample)?,
                    partition: category.is_stagger().then_some(sample.track_type),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let runs = group_samples(
            samples,
            &keys,
            category.extremum(),
            self.config.chain_length,
        );
        debug!(%category, samples = samples.len(), exceptions = runs.len(), "grouped breaches");

        runs.into_iter()
            .enumerate()
            .map(|(index, run)| {
                let flags = classifier.classify_value(
                    run.rep_value,
                    run.zone.as_deref(),
                    run.track_type,
                    run.rep_location,
                )?;

                Ok(MergedException {
                    id: self.ctx.exception_id(category, index),
                    category,
                    level: flags.severity(category),
                    start: run.start,
                    end: run.end,
                    rep_value: run.rep_value,
                    rep_location: run.rep_location,
                    zone: run.zone,
                    track_type: run.track_type,
                })
            })
            .collect()
    }
}
