//! Chain-length merging
//!
//! After flag runs are formed, runs separated by a gap no larger than the
//! chain length are merged, whether or not they touch. The merged run spans
//! `[min start, max end]` and takes its representative from the member run
//! holding the worst value (the earliest such member on ties).

use super::runs::Run;
use crate::survey::Extremum;

/// Gaps within this distance of the chain length count as equal to it
const GAP_EPSILON: f64 = 1e-9;

/// Merge runs whose gap to the preceding group is at most `chain_length`
pub fn chain_runs(mut runs: Vec<Run>, chain_length: f64, extremum: Extremum) -> Vec<Run> {
    runs.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(group) if run.start - group.end - chain_length <= GAP_EPSILON => {
                absorb(group, run, extremum);
            }
            _ => merged.push(run),
        }
    }

    merged
}

fn absorb(group: &mut Run, run: Run, extremum: Extremum) {
    group.start = group.start.min(run.start);
    group.end = group.end.max(run.end);
    group.members += run.members;
    group.samples += run.samples;

    if extremum.is_worse(run.rep_value, group.rep_value) {
        group.rep_value = run.rep_value;
        group.rep_location = run.rep_location;
        group.zone = run.zone;
        group.track_type = run.track_type;
    }
}
