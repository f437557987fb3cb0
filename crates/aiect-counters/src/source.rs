//! Live counter configuration interface.

use rustc_hash::FxHashMap;

/// Counter record as exposed by the configuration store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCounter {
    pub column: u8,
    pub row: u8,
    pub counter_number: u8,
    /// Module name, e.g. `aie` or `interface_tile`.
    pub module: String,
    /// Event payload; bit 8 marks a master port for bandwidth metrics.
    pub payload: u64,
}

impl RawCounter {
    #[must_use]
    pub fn new(column: u8, row: u8, counter_number: u8, module: impl Into<String>) -> Self {
        Self {
            column,
            row,
            counter_number,
            module: module.into(),
            payload: 0,
        }
    }

    #[must_use]
    pub const fn with_payload(mut self, payload: u64) -> Self {
        self.payload = payload;
        self
    }
}

/// Read-only view of the configured counters per device.
pub trait CounterSource {
    /// Number of counters configured for a device.
    fn num_counters(&self, device_id: u64) -> u64;

    /// Counter at `index`, or `None` if the store has no entry there.
    fn counter(&self, device_id: u64, index: u64) -> Option<&RawCounter>;
}

/// In-memory counter store.
#[derive(Clone, Debug, Default)]
pub struct CounterTable {
    devices: FxHashMap<u64, Vec<RawCounter>>,
}

impl CounterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a counter for a device.
    pub fn push(&mut self, device_id: u64, counter: RawCounter) {
        self.devices.entry(device_id).or_default().push(counter);
    }

    /// Builder form of [`CounterTable::push`].
    #[must_use]
    pub fn with_counter(mut self, device_id: u64, counter: RawCounter) -> Self {
        self.push(device_id, counter);
        self
    }
}

impl CounterSource for CounterTable {
    fn num_counters(&self, device_id: u64) -> u64 {
        self.devices.get(&device_id).map_or(0, |c| c.len() as u64)
    }

    fn counter(&self, device_id: u64, index: u64) -> Option<&RawCounter> {
        let index = usize::try_from(index).ok()?;
        self.devices.get(&device_id)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_table() {
        let table = CounterTable::new()
            .with_counter(0, RawCounter::new(0, 2, 0, "aie"))
            .with_counter(0, RawCounter::new(0, 2, 1, "aie"))
            .with_counter(1, RawCounter::new(4, 0, 0, "interface_tile").with_payload(0x100));

        assert_eq!(table.num_counters(0), 2);
        assert_eq!(table.num_counters(1), 1);
        assert_eq!(table.num_counters(2), 0);
        assert_eq!(table.counter(0, 1).unwrap().counter_number, 1);
        assert_eq!(table.counter(1, 0).unwrap().payload, 0x100);
        assert!(table.counter(0, 2).is_none());
        assert!(table.counter(2, 0).is_none());
    }
}
