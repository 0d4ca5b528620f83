//! Counter accumulation. Sourcefile-level counters must accumulate rather
//! than overwrite because several classes may legitimately share one
//! sourcefile (e.g. nested types declared in the same header).

/// Counter granularity, matching the `type` attribute of the emitted
/// `counter` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Class,
    Method,
    Line,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Class => "CLASS",
            CounterKind::Method => "METHOD",
            CounterKind::Line => "LINE",
        }
    }
}

/// A covered/missed pair at some scope level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub covered: u32,
    pub missed: u32,
}

impl Counter {
    /// The counter for a single observation: (1, 0) when covered,
    /// (0, 1) when missed.
    #[must_use]
    pub fn unit(covered: bool) -> Self {
        if covered {
            Counter { covered: 1, missed: 0 }
        } else {
            Counter { covered: 0, missed: 1 }
        }
    }

    pub fn add(&mut self, other: Counter) {
        self.covered += other.covered;
        self.missed += other.missed;
    }

    /// Tally one observation into this counter.
    pub fn record(&mut self, covered: bool) {
        self.add(Counter::unit(covered));
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.covered + self.missed
    }

    /// Roll up a set of counters into one total.
    #[must_use]
    pub fn sum<'a>(counters: impl IntoIterator<Item = &'a Counter>) -> Counter {
        let mut total = Counter::default();
        for c in counters {
            total.add(*c);
        }
        total
    }
}

/// Kind-tagged counter records in insertion order. Lookup by kind is an
/// explicit optional; `get_or_insert` creates a zero record when absent.
#[derive(Debug, Clone, Default)]
pub struct CounterSet {
    entries: Vec<(CounterKind, Counter)>,
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: CounterKind) -> Option<Counter> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
    }

    /// Locate the record of the given kind, creating a zero-valued one when
    /// it does not exist yet.
    pub fn get_or_insert(&mut self, kind: CounterKind) -> &mut Counter {
        let idx = match self.entries.iter().position(|(k, _)| *k == kind) {
            Some(i) => i,
            None => {
                self.entries.push((kind, Counter::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, &Counter)> {
        self.entries.iter().map(|(k, c)| (*k, c))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge one class's totals into a sourcefile's counter set.
///
/// `CLASS.covered` counts classes attributed to the sourcefile, not classes
/// whose methods are all covered; `CLASS.missed` is never incremented. The
/// METHOD and LINE records both accumulate the class's method totals — each
/// method declaration contributes exactly one synthetic line.
pub fn apply_class(sourcefile: &mut CounterSet, class_totals: Counter) {
    sourcefile.get_or_insert(CounterKind::Class).covered += 1;
    sourcefile.get_or_insert(CounterKind::Method).add(class_totals);
    sourcefile.get_or_insert(CounterKind::Line).add(class_totals);
}
