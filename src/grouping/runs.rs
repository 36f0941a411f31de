//! Flag-run encoding
//!
//! Scans samples in location order and opens a new run whenever the run key
//! differs from the previous sample's key:
//!
//! ```text
//! breach:  F F T T T F T T F
//! run id:  0 0 1 1 1 2 3 3 4
//! ```
//!
//! Only runs whose key is a breach become exception candidates. Stagger
//! keys also carry the track type, so a breaching stretch that crosses a
//! tangent/curve boundary is split there.

use crate::prepare::Sample;
use crate::survey::{Extremum, TrackType};
use serde::{Deserialize, Serialize};

/// Value the run encoder compares between neighbouring samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunKey {
    pub breach: bool,
    /// Extra split point; `None` for categories that ignore track type
    pub partition: Option<TrackType>,
}

/// A maximal stretch of samples sharing one run key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRun {
    pub id: usize,
    pub breach: bool,
    /// Index of the first sample in the run
    pub first: usize,
    /// Number of consecutive samples
    pub len: usize,
}

/// Run-length encode a key sequence
pub fn encode_flag_runs(keys: &[RunKey]) -> Vec<FlagRun> {
    let mut runs: Vec<FlagRun> = Vec::new();

    let mut i = 0;
    while i < keys.len() {
        let key = keys[i];
        let mut len = 1;
        while i + len < keys.len() && keys[i + len] == key {
            len += 1;
        }

        runs.push(FlagRun {
            id: runs.len(),
            breach: key.breach,
            first: i,
            len,
        });
        i += len;
    }

    runs
}

/// A breaching run (or a chain of them) with its representative extremum
///
/// Locations are in km. The representative is the first sample, in
/// location order, attaining the category's worst value.
///
/// `start` and `end` keep the sample chainages at `location_decimals`
/// precision; they are not rounded to whole metres before chaining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub start: f64,
    pub end: f64,
    pub rep_value: f64,
    pub rep_location: f64,
    pub zone: Option<String>,
    pub track_type: TrackType,
    /// Number of base runs folded into this one
    pub members: usize,
    /// Number of breaching samples covered
    pub samples: usize,
}

impl Run {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Collapse breaching flag runs into [`Run`]s
///
/// `samples` and `keys` are parallel and ordered by location.
pub fn breach_runs(samples: &[Sample], keys: &[RunKey], extremum: Extremum) -> Vec<Run> {
    debug_assert_eq!(samples.len(), keys.len());

    encode_flag_runs(keys)
        .into_iter()
        .filter(|run| run.breach)
        .filter_map(|run| {
            let members = samples.get(run.first..run.first + run.len)?;
            let first = members.first()?;
            let last = members.last()?;

            let rep = members.iter().skip(1).fold(first, |best, s| {
                if extremum.is_worse(s.value, best.value) {
                    s
                } else {
                    best
                }
            });

            Some(Run {
                start: first.location,
                end: last.location,
                rep_value: rep.value,
                rep_location: rep.location,
                zone: rep.zone.clone(),
                track_type: rep.track_type,
                members: 1,
                samples: run.len,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(breach: bool) -> RunKey {
        RunKey {
            breach,
            partition: None,
        }
    }

    fn sample(location: f64, value: f64) -> Sample {
        Sample {
            location,
            value,
            zone: None,
            track_type: TrackType::Tangent,
        }
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode_flag_runs(&[]).is_empty());
    }

    #[test]
    fn test_run_ids_increment_on_change() {
        let keys: Vec<RunKey> = [false, false, true, true, true, false, true, true, false]
            .into_iter()
            .map(key)
            .collect();
        let runs = encode_flag_runs(&keys);

        let shape: Vec<(usize, bool, usize, usize)> =
            runs.iter().map(|r| (r.id, r.breach, r.first, r.len)).collect();
        assert_eq!(
            shape,
            vec![
                (0, false, 0, 2),
                (1, true, 2, 3),
                (2, false, 5, 1),
                (3, true, 6, 2),
                (4, false, 8, 1),
            ]
        );
    }

    #[test]
    fn test_partition_change_splits_breach() {
        let keys = [
            RunKey {
                breach: true,
                partition: Some(TrackType::Tangent),
            },
            RunKey {
                breach: true,
                partition: Some(TrackType::Curve),
            },
        ];
        assert_eq!(encode_flag_runs(&keys).len(), 2);
    }

    #[test]
    fn test_breach_runs_pick_first_extreme() {
        let samples = vec![
            sample(1.000, 11.0),
            sample(1.001, 9.0),
            sample(1.002, 8.5),
            sample(1.003, 8.5),
            sample(1.004, 11.0),
        ];
        let keys: Vec<RunKey> = [false, true, true, true, false].into_iter().map(key).collect();
        let runs = breach_runs(&samples, &keys, Extremum::Min);

        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.start, 1.001);
        assert_eq!(run.end, 1.003);
        assert_eq!(run.rep_value, 8.5);
        assert_eq!(run.rep_location, 1.002);
        assert_eq!(run.samples, 3);
    }

    #[test]
    fn test_no_breach_no_runs() {
        let samples = vec![sample(1.0, 1.0), sample(1.001, 2.0)];
        let keys = vec![key(false), key(false)];
        assert!(breach_runs(&samples, &keys, Extremum::Max).is_empty());
    }
}
