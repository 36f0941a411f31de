// Multi-tier threshold classification
//
// Threshold tables map (class, track type, exception kind, tier) to a bound.
// A class is a zone code (e.g. SCL, KSL), a section class (e.g. LMC), or
// the catch-all "both". Lookups walk a fixed precedence, zone first, so the
// per-zone special cases of a line are data in its table instead of
// branches in code.
//
// The classifier turns a sample into one breach flag per tier; the
// detection tier decides whether a location belongs to an exception and the
// remaining tiers grade the representative value of each merged exception.

mod classifier;
mod table;

pub use classifier::{breaches, Classifier, TierFlags};
pub use table::{Bound, Lookup, Scope, ThresholdEntry, ThresholdSet, DEFAULT_CLASS};

#[cfg(test)]
mod tests;
