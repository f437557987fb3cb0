//! Column-range partitioning of counters.

use crate::resolver::CounterDescriptor;

/// Inclusive column range owned by a control program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: u32,
    pub end: u32,
}

impl ColumnRange {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(&self, column: u8) -> bool {
        let column = column as u32;
        self.start <= column && column <= self.end
    }
}

/// Counters whose column lies in `range`, in input order.
#[must_use]
pub fn filter_by_columns(counters: &[CounterDescriptor], range: ColumnRange) -> Vec<CounterDescriptor> {
    counters
        .iter()
        .filter(|c| range.contains(c.column))
        .cloned()
        .collect()
}
