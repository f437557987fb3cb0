//! Metric collections from the active profiling configuration.
//!
//! Collections are keyed by `(module, setting)`. A missing key yields `None`
//! rather than a shared empty collection.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::metric::{MetricSetTable, Tile};
use crate::module::ModuleKind;

/// Metric set assigned to one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMetric {
    pub tile: Tile,
    pub metric_set: String,
}

impl TileMetric {
    #[must_use]
    pub fn new(tile: Tile, metric_set: impl Into<String>) -> Self {
        Self {
            tile,
            metric_set: metric_set.into(),
        }
    }
}

/// Tile metrics produced by one configuration setting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricCollection {
    pub metrics: Vec<TileMetric>,
}

impl MetricCollection {
    #[must_use]
    pub const fn new(metrics: Vec<TileMetric>) -> Self {
        Self { metrics }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl FromIterator<TileMetric> for MetricCollection {
    fn from_iter<T: IntoIterator<Item = TileMetric>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Metric collections keyed by module and setting name.
#[derive(Clone, Debug, Default)]
pub struct MetricCollections {
    collections: FxHashMap<(ModuleKind, String), MetricCollection>,
}

impl MetricCollections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the collection for `(module, setting)`.
    pub fn insert(&mut self, module: ModuleKind, setting: impl Into<String>, collection: MetricCollection) {
        self.collections.insert((module, setting.into()), collection);
    }

    /// Collection for `(module, setting)`, if configured.
    #[must_use]
    pub fn get(&self, module: ModuleKind, setting: &str) -> Option<&MetricCollection> {
        self.collections.get(&(module, setting.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Flatten into a per-tile metric-set table.
    ///
    /// Modules are visited in [`ModuleKind::ALL`] order and settings by name,
    /// so the first-match result does not depend on hash order.
    #[must_use]
    pub fn metric_set_table(&self) -> MetricSetTable {
        let mut ordered: BTreeMap<(usize, &str), &MetricCollection> = BTreeMap::new();
        for ((module, setting), collection) in &self.collections {
            let rank = ModuleKind::ALL
                .iter()
                .position(|m| m == module)
                .unwrap_or(ModuleKind::ALL.len());
            ordered.insert((rank, setting.as_str()), collection);
        }

        let mut table = MetricSetTable::new();
        for collection in ordered.values() {
            for metric in &collection.metrics {
                table.insert(metric.tile, metric.metric_set.as_str());
            }
        }
        table
    }
}
