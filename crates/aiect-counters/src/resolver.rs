//! Counter resolution.

use tracing::debug;

use crate::address::ChipShifts;
use crate::metric::{MetricSetTable, PortDirection, Tile};
use crate::module::ModuleKind;
use crate::source::{CounterSource, RawCounter};

/// A configured counter with everything needed to sample it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterDescriptor {
    pub column: u8,
    pub row: u8,
    pub counter_number: u8,
    /// Module name as reported by the store.
    pub module: String,
    /// Module used for address computation.
    pub module_kind: ModuleKind,
    /// Absolute register address.
    pub address: u64,
    /// Configured metric set, empty if the tile has none.
    pub metric_set: String,
    pub port_direction: PortDirection,
}

impl CounterDescriptor {
    #[must_use]
    pub const fn tile(&self) -> Tile {
        Tile::new(self.column, self.row)
    }
}

/// Resolves raw store counters into [`CounterDescriptor`]s.
#[derive(Clone, Debug)]
pub struct CounterResolver {
    shifts: ChipShifts,
    metric_sets: MetricSetTable,
}

impl CounterResolver {
    #[must_use]
    pub const fn new(shifts: ChipShifts, metric_sets: MetricSetTable) -> Self {
        Self { shifts, metric_sets }
    }

    #[must_use]
    pub const fn shifts(&self) -> ChipShifts {
        self.shifts
    }

    #[must_use]
    pub const fn metric_sets(&self) -> &MetricSetTable {
        &self.metric_sets
    }

    /// Resolve every counter configured for `device_id`, in store order.
    #[must_use]
    pub fn resolve<S: CounterSource + ?Sized>(
        &self,
        source: &S,
        device_id: u64,
    ) -> Vec<CounterDescriptor> {
        let num_counters = source.num_counters(device_id);
        let counters: Vec<CounterDescriptor> = (0..num_counters)
            .filter_map(|index| {
                let raw = source.counter(device_id, index);
                if raw.is_none() {
                    debug!(device = device_id, index, "counter missing from store");
                }
                raw
            })
            .map(|raw| self.describe(raw))
            .collect();

        debug!(
            device = device_id,
            counters = counters.len(),
            "retrieved configured AIE counters"
        );
        counters
    }

    /// Annotate a single raw counter.
    #[must_use]
    pub fn describe(&self, raw: &RawCounter) -> CounterDescriptor {
        let module_kind = ModuleKind::resolve(&raw.module);
        let tile = Tile::new(raw.column, raw.row);
        let metric_set = self.metric_sets.lookup(tile).unwrap_or_default().to_string();
        let port_direction = PortDirection::for_metric(&metric_set, raw.payload);

        CounterDescriptor {
            column: raw.column,
            row: raw.row,
            counter_number: raw.counter_number,
            module: raw.module.clone(),
            module_kind,
            address: self
                .shifts
                .counter_address(raw.column, raw.row, raw.counter_number, module_kind),
            metric_set,
            port_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CounterTable;

    fn resolver() -> CounterResolver {
        let metric_sets = MetricSetTable::from_module_metrics([vec![
            (Tile::new(0, 2), "heat_map"),
            (Tile::new(1, 0), "read_bandwidth"),
            (Tile::new(2, 0), "mm2s_throughput"),
        ]]);
        CounterResolver::new(ChipShifts::new(25, 20).unwrap(), metric_sets)
    }

    #[test]
    fn test_describe_core_counter() {
        let desc = resolver().describe(&RawCounter::new(0, 2, 1, "aie"));
        assert_eq!(desc.module_kind, ModuleKind::Core);
        assert_eq!(desc.address, (2 << 20) + 0x37520 + 4);
        assert_eq!(desc.metric_set, "heat_map");
        assert_eq!(desc.port_direction, PortDirection::None);
    }

    #[test]
    fn test_describe_directions() {
        let r = resolver();
        let master = r.describe(&RawCounter::new(1, 0, 0, "interface_tile").with_payload(1 << 8));
        let slave = r.describe(&RawCounter::new(1, 0, 1, "interface_tile"));
        let mm2s = r.describe(&RawCounter::new(2, 0, 0, "interface_tile").with_payload(0));
        assert_eq!(master.port_direction, PortDirection::Output);
        assert_eq!(slave.port_direction, PortDirection::Input);
        assert_eq!(mm2s.port_direction, PortDirection::Output);
    }

    #[test]
    fn test_describe_unknown_tile_and_module() {
        let r = resolver();
        let desc = r.describe(&RawCounter::new(7, 3, 0, "mystery"));
        let core = r.describe(&RawCounter::new(7, 3, 0, "aie"));
        assert!(desc.metric_set.is_empty());
        assert_eq!(desc.module, "mystery");
        assert_eq!(desc.address, core.address);
    }

    #[test]
    fn test_resolve_preserves_store_order() {
        let table = CounterTable::new()
            .with_counter(5, RawCounter::new(1, 0, 0, "interface_tile"))
            .with_counter(5, RawCounter::new(0, 2, 0, "aie"))
            .with_counter(6, RawCounter::new(0, 2, 1, "aie"));

        let counters = resolver().resolve(&table, 5);
        assert_eq!(counters.len(), 2);
        assert_eq!(counters[0].tile(), Tile::new(1, 0));
        assert_eq!(counters[1].tile(), Tile::new(0, 2));
        assert!(resolver().resolve(&table, 9).is_empty());
    }
}
