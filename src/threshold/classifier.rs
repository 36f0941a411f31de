use super::table::{Bound, Scope, ThresholdSet};
use crate::error::Result;
use crate::prepare::Sample;
use crate::survey::{Category, ExceptionKind, Level, TrackType};

/// Breach flag per severity tier
///
/// Tiers a category does not define stay `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierFlags {
    l1: bool,
    l2: bool,
    l3: bool,
}

impl TierFlags {
    pub fn get(&self, tier: Level) -> bool {
        match tier {
            Level::L1 => self.l1,
            Level::L2 => self.l2,
            Level::L3 => self.l3,
        }
    }

    fn set(&mut self, tier: Level, value: bool) {
        match tier {
            Level::L1 => self.l1 = value,
            Level::L2 => self.l2 = value,
            Level::L3 => self.l3 = value,
        }
    }

    /// Final severity of a value already known to breach the detection tier
    ///
    /// Height and wear exceptions are L1 when the L1 bound is breached and
    /// L2 otherwise. Stagger exceptions are L1, then L2 inside the L2 band,
    /// then L3.
    pub fn severity(&self, category: Category) -> Level {
        if self.l1 {
            return Level::L1;
        }
        match category.kind() {
            ExceptionKind::Stagger if self.l2 => Level::L2,
            ExceptionKind::Stagger => Level::L3,
            _ => Level::L2,
        }
    }
}

/// Tiers carried by each threshold family, most severe first
fn tiers(kind: ExceptionKind) -> &'static [Level] {
    match kind {
        ExceptionKind::Stagger => &[Level::L1, Level::L2, Level::L3],
        _ => &[Level::L1, Level::L2],
    }
}

/// Tier predicate for one value
///
/// Wear and low height breach at or below `max`; high height at or above
/// `min`. Stagger compares its magnitude (right stagger is stored negative)
/// against `min`, and the L2 band is half-open `[min, max)`.
pub fn breaches(category: Category, tier: Level, bound: &Bound, value: f64) -> bool {
    match category.kind() {
        ExceptionKind::WireWear | ExceptionKind::LowHeight => {
            bound.max.is_some_and(|max| value <= max)
        }
        ExceptionKind::HighHeight => bound.min.is_some_and(|min| value >= min),
        ExceptionKind::Stagger => {
            let magnitude = if category == Category::StaggerRight {
                -value
            } else {
                value
            };
            let reached = bound.min.is_some_and(|min| magnitude >= min);
            match tier {
                Level::L2 => reached && bound.max.map_or(true, |max| magnitude < max),
                _ => reached,
            }
        }
    }
}

/// Classifies values of one category measured within one section
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    thresholds: &'a ThresholdSet,
    section: &'a str,
    category: Category,
}

impl<'a> Classifier<'a> {
    pub fn new(thresholds: &'a ThresholdSet, section: &'a str, category: Category) -> Self {
        Self {
            thresholds,
            section,
            category,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn classify(&self, sample: &Sample) -> Result<TierFlags> {
        self.classify_value(
            sample.value,
            sample.zone.as_deref(),
            sample.track_type,
            sample.location,
        )
    }

    /// Flag every tier of the category for a value at `location` (km)
    pub fn classify_value(
        &self,
        value: f64,
        zone: Option<&str>,
        track_type: TrackType,
        location: f64,
    ) -> Result<TierFlags> {
        let scope = Scope {
            zone,
            section: self.section,
            track_type,
        };
        let kind = self.category.kind();
        let mut flags = TierFlags::default();

        for &tier in tiers(kind) {
            if let Some(bound) = self.thresholds.require(kind, tier, &scope, location)? {
                flags.set(tier, breaches(self.category, tier, &bound, value));
            }
        }

        Ok(flags)
    }

    /// Whether a sample breaches the tier that opens an exception
    pub fn detects(&self, sample: &Sample) -> Result<bool> {
        let scope = Scope {
            zone: sample.zone.as_deref(),
            section: self.section,
            track_type: sample.track_type,
        };
        let tier = self.category.detection_tier();
        let bound = self
            .thresholds
            .require(self.category.kind(), tier, &scope, sample.location)?;

        Ok(bound.is_some_and(|b| breaches(self.category, tier, &b, sample.value)))
    }
}
