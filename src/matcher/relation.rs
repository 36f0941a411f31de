// Interval relations that identify the same physical exception in two surveys

/// Interval and representative location of one exception, in a shared frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub start: f64,
    pub end: f64,
    pub rep: f64,
}

impl Extent {
    pub fn new(start: f64, end: f64, rep: f64) -> Self {
        Self { start, end, rep }
    }

    fn shifted(self, by: f64) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
            rep: self.rep + by,
        }
    }
}

/// How the first survey's interval sits against the second's
///
/// The relations are not mutually exclusive; a pair is a repeat when any
/// of them holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// First starts inside second and ends after it
    OverlapsEnd,
    /// Second starts inside first and ends after it
    OverlapsStart,
    /// Second contains first
    WithinSecond,
    /// First contains second
    CoversSecond,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::OverlapsEnd,
        Relation::OverlapsStart,
        Relation::WithinSecond,
        Relation::CoversSecond,
    ];

    /// Whether the relation holds, with both representatives inside the
    /// common part of the two intervals
    pub fn holds(self, first: Extent, second: Extent) -> bool {
        let (a, b) = (first, second);
        let window = match self {
            Relation::OverlapsEnd => {
                (b.start <= a.start && a.start <= b.end && a.end > b.end).then_some((a.start, b.end))
            }
            Relation::OverlapsStart => {
                (a.start <= b.start && b.start <= a.end && a.end < b.end).then_some((b.start, a.end))
            }
            Relation::WithinSecond => {
                (a.start >= b.start && a.end <= b.end).then_some((a.start, a.end))
            }
            Relation::CoversSecond => {
                (a.start <= b.start && a.end >= b.end).then_some((b.start, b.end))
            }
        };

        window.is_some_and(|(lo, hi)| (lo..=hi).contains(&a.rep) && (lo..=hi).contains(&b.rep))
    }
}

/// Location offsets applied to each side before comparing
///
/// Compensates for reference-frame drift between surveys. The offsets only
/// affect the comparison; matched rows keep their reported locations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shift {
    pub first: f64,
    pub second: f64,
}

impl Shift {
    pub(crate) fn apply(self, first: Extent, second: Extent) -> (Extent, Extent) {
        (first.shifted(self.first), second.shifted(self.second))
    }
}
