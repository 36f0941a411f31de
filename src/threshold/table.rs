use crate::error::{CatexError, Result};
use crate::survey::{ExceptionKind, Level, TrackType};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Class name of the line-wide default entries
pub const DEFAULT_CLASS: &str = "both";

/// One row of a threshold table
///
/// An entry with neither `min` nor `max` marks the tier as not applied for
/// its class; the lookup stops there instead of falling back.
///
/// # Example TOML
/// ```toml
/// [[threshold]]
/// class = "SCL"
/// exception = "wire_wear"
/// tier = "L2"
/// max = 9.8
///
/// [[threshold]]
/// class = "KSL"
/// track_type = "curve"
/// exception = "stagger"
/// tier = "L2"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_type: Option<TrackType>,
    pub exception: ExceptionKind,
    pub tier: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Numeric bounds of one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Outcome of a precedence lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    Applies(Bound),
    NotApplied,
    Missing,
}

/// Where a value was measured, for threshold selection
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub zone: Option<&'a str>,
    pub section: &'a str,
    pub track_type: TrackType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    class: String,
    track_type: Option<TrackType>,
    kind: ExceptionKind,
    tier: Level,
}

/// Threshold table of one line, indexed for precedence lookups
#[derive(Debug, Clone, Default)]
pub struct ThresholdSet {
    entries: HashMap<Key, Option<Bound>>,
}

#[derive(Deserialize)]
struct ThresholdFile {
    #[serde(default)]
    threshold: Vec<ThresholdEntry>,
}

impl ThresholdSet {
    /// Load a threshold table from a TOML file of `[[threshold]]` entries
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read thresholds file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid thresholds in {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ThresholdFile =
            toml::from_str(content).context("Failed to parse TOML threshold definitions")?;
        Ok(Self::from_entries(file.threshold)?)
    }

    /// Index entries, rejecting duplicates and bounds of the wrong shape
    pub fn from_entries(entries: Vec<ThresholdEntry>) -> Result<Self> {
        let mut indexed = HashMap::with_capacity(entries.len());

        for entry in entries {
            let bound = validate_entry(&entry)?;
            let key = Key {
                class: entry.class.clone(),
                track_type: entry.track_type,
                kind: entry.exception,
                tier: entry.tier,
            };
            if indexed.insert(key, bound).is_some() {
                return Err(CatexError::malformed(format!(
                    "duplicate threshold for class {} / {:?} / {:?} {}",
                    entry.class, entry.track_type, entry.exception, entry.tier
                )));
            }
        }

        Ok(Self { entries: indexed })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a tier's bound: zone, then section class, then default,
    /// trying the exact track type before the track-agnostic entry at
    /// each level
    pub fn lookup(&self, kind: ExceptionKind, tier: Level, scope: &Scope<'_>) -> Lookup {
        let classes = scope
            .zone
            .into_iter()
            .chain([scope.section, DEFAULT_CLASS]);

        for class in classes {
            for track_type in [Some(scope.track_type), None] {
                let key = Key {
                    class: class.to_string(),
                    track_type,
                    kind,
                    tier,
                };
                match self.entries.get(&key) {
                    Some(Some(bound)) => return Lookup::Applies(*bound),
                    Some(None) => return Lookup::NotApplied,
                    None => {}
                }
            }
        }

        Lookup::Missing
    }

    /// Like [`lookup`](Self::lookup), but a missing entry is an error
    /// naming the location (km) that needed it
    pub fn require(
        &self,
        kind: ExceptionKind,
        tier: Level,
        scope: &Scope<'_>,
        location: f64,
    ) -> Result<Option<Bound>> {
        match self.lookup(kind, tier, scope) {
            Lookup::Applies(bound) => Ok(Some(bound)),
            Lookup::NotApplied => Ok(None),
            Lookup::Missing => Err(CatexError::missing(format!(
                "no {:?} {} threshold for zone {}, section {}, {} track at {:.5} km",
                kind,
                tier,
                scope.zone.unwrap_or("-"),
                scope.section,
                scope.track_type,
                location
            ))),
        }
    }
}

fn validate_entry(entry: &ThresholdEntry) -> Result<Option<Bound>> {
    if entry.min.is_none() && entry.max.is_none() {
        return Ok(None);
    }

    let needs_min = matches!(entry.exception, ExceptionKind::HighHeight | ExceptionKind::Stagger);
    let needs_max = matches!(entry.exception, ExceptionKind::WireWear | ExceptionKind::LowHeight);
    let shape_ok = (!needs_min || entry.min.is_some()) && (!needs_max || entry.max.is_some());
    if !shape_ok {
        return Err(CatexError::malformed(format!(
            "{:?} {} threshold for class {} needs a {} bound",
            entry.exception,
            entry.tier,
            entry.class,
            if needs_min { "min" } else { "max" }
        )));
    }

    if let (Some(min), Some(max)) = (entry.min, entry.max) {
        if min > max {
            return Err(CatexError::malformed(format!(
                "{:?} {} threshold for class {} has min {} above max {}",
                entry.exception, entry.tier, entry.class, min, max
            )));
        }
    }

    Ok(Some(Bound {
        min: entry.min,
        max: entry.max,
    }))
}
