// Cross-report matching of exceptions
//
// Pairs every row of an earlier table with every row of a later one and
// keeps the pairs whose intervals satisfy one of four relations. The later
// row survives and inherits the earlier row's chain of identifiers, so a
// series of surveys is matched by folding this pairwise step from the
// oldest report to the newest.

mod relation;
mod repeated;

pub use relation::{Extent, Relation, Shift};
pub use repeated::{
    previous_columns, summarize, PreviousRow, RepeatSummary, SummaryRecord, MAX_REPORTS, MIN_REPORTS,
    SUMMARY_COLUMNS,
};

use crate::report::ExceptionRecord;
use serde::Serialize;
use tracing::debug;

/// An exception carrying the identifiers it was matched against, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedException {
    pub record: ExceptionRecord,
    pub previous: Vec<String>,
}

impl TrackedException {
    pub fn new(record: ExceptionRecord) -> Self {
        Self {
            record,
            previous: Vec::new(),
        }
    }

    fn extent(&self) -> Extent {
        extent_of(&self.record)
    }

    /// Previous ids as one comma-joined string
    pub fn previous_chain(&self) -> String {
        self.previous.join(",")
    }
}

fn extent_of(record: &ExceptionRecord) -> Extent {
    Extent::new(record.start_m, record.end_m, record.max_location)
}

/// Match one table of tracked exceptions against the next survey's table
///
/// Output keeps the second table's row with the first row's chain extended
/// by the first row's id. Rows are emitted relation by relation, then by
/// first-table row, then by second-table row; exact duplicate rows are
/// dropped keeping the first. An empty side yields an empty result.
pub fn find_repeated(
    first: &[TrackedException],
    second: &[ExceptionRecord],
    shift: Shift,
) -> Vec<TrackedException> {
    let mut matched: Vec<TrackedException> = Vec::new();
    if first.is_empty() || second.is_empty() {
        return matched;
    }

    for relation in Relation::ALL {
        for earlier in first {
            for later in second {
                let (a, b) = shift.apply(earlier.extent(), extent_of(later));
                if !relation.holds(a, b) {
                    continue;
                }

                let mut previous = earlier.previous.clone();
                previous.push(earlier.record.id.clone());
                let row = TrackedException {
                    record: later.clone(),
                    previous,
                };
                if !matched.contains(&row) {
                    matched.push(row);
                }
            }
        }
    }

    debug!(
        first = first.len(),
        second = second.len(),
        matched = matched.len(),
        "matched exception tables"
    );
    matched
}

/// Fold the pairwise matcher over tables ordered oldest to newest
///
/// Every surviving row carries one previous id per hop.
pub fn match_series(tables: &[Vec<ExceptionRecord>]) -> Vec<TrackedException> {
    let Some((oldest, rest)) = tables.split_first() else {
        return Vec::new();
    };

    let mut tracked: Vec<TrackedException> =
        oldest.iter().cloned().map(TrackedException::new).collect();
    for table in rest {
        tracked = find_repeated(&tracked, table, Shift::default());
    }
    tracked
}
