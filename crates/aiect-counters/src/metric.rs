//! Metric sets and port direction.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::warn;

/// Tile coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub column: u8,
    pub row: u8,
}

impl Tile {
    #[must_use]
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }
}

/// Metric sets whose direction is encoded per counter in the payload.
pub const PAYLOAD_DIRECTION_METRICS: [&str; 3] =
    ["ddr_bandwidth", "read_bandwidth", "write_bandwidth"];

/// Payload bit set when the counted port is a master (output) port.
pub const PAYLOAD_IS_MASTER_SHIFT: u32 = 8;

/// Direction of the stream port a throughput counter observes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    #[default]
    None,
}

impl PortDirection {
    /// Name used in emitted metadata, `None` for no direction.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Input => Some("input"),
            Self::Output => Some("output"),
            Self::None => None,
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Derive the direction for a metric set and counter payload.
    ///
    /// Only throughput-like metric sets carry a direction.
    #[must_use]
    pub fn for_metric(metric_set: &str, payload: u64) -> Self {
        if !is_throughput_metric(metric_set) {
            return Self::None;
        }
        if PAYLOAD_DIRECTION_METRICS.contains(&metric_set) {
            // Interface tiles may mix master and slave ports in one set.
            return if (payload >> PAYLOAD_IS_MASTER_SHIFT) & 1 == 1 {
                Self::Output
            } else {
                Self::Input
            };
        }
        if metric_set.contains("input") || metric_set.contains("s2mm") {
            Self::Input
        } else if metric_set.contains("output") || metric_set.contains("mm2s") {
            Self::Output
        } else {
            Self::None
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

/// Whether a metric set measures throughput or bandwidth.
#[must_use]
pub fn is_throughput_metric(metric_set: &str) -> bool {
    metric_set.contains("throughput") || metric_set.contains("bandwidth")
}

/// Configured metric set per tile.
///
/// Built from the active profiling configuration. When several entries name
/// the same tile, the first non-empty one wins.
#[derive(Clone, Debug, Default)]
pub struct MetricSetTable {
    by_tile: FxHashMap<Tile, String>,
}

impl MetricSetTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-module `(tile, metric set)` lists, searched in order.
    #[must_use]
    pub fn from_module_metrics<M, I, S>(modules: M) -> Self
    where
        M: IntoIterator<Item = I>,
        I: IntoIterator<Item = (Tile, S)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for module in modules {
            for (tile, metric_set) in module {
                table.insert(tile, metric_set);
            }
        }
        table
    }

    /// Record a metric set for a tile unless one is already present.
    ///
    /// Empty names count as no entry, so a later non-empty name still
    /// applies. Returns `false` if nothing was stored.
    pub fn insert(&mut self, tile: Tile, metric_set: impl Into<String>) -> bool {
        let metric_set = metric_set.into();
        if metric_set.is_empty() {
            return false;
        }
        if let Some(existing) = self.by_tile.get(&tile) {
            if *existing != metric_set {
                warn!(
                    column = tile.column,
                    row = tile.row,
                    kept = %existing,
                    ignored = %metric_set,
                    "conflicting metric sets for tile, keeping first"
                );
            }
            return false;
        }
        self.by_tile.insert(tile, metric_set);
        true
    }

    /// Metric set configured for a tile, if any.
    #[must_use]
    pub fn lookup(&self, tile: Tile) -> Option<&str> {
        self.by_tile.get(&tile).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tile.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tile.is_empty()
    }
}
