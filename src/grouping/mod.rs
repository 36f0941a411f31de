// Two-phase grouping of breaching samples
//
// Phase 1 collapses strictly consecutive breaching samples into flag runs.
// Phase 2 merges the resulting intervals when the gap between them is at
// most the chain length. The phases are independent: chaining never looks
// at samples, only at the intervals phase 1 produced.

mod chain;
mod runs;

pub use chain::chain_runs;
pub use runs::{breach_runs, encode_flag_runs, FlagRun, Run, RunKey};

use crate::prepare::Sample;
use crate::survey::Extremum;

/// Run both phases over one location-ordered category series
pub fn group_samples(
    samples: &[Sample],
    keys: &[RunKey],
    extremum: Extremum,
    chain_length: f64,
) -> Vec<Run> {
    chain_runs(breach_runs(samples, keys, extremum), chain_length, extremum)
}
