#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;

use aiect::{ChipShifts, CounterTable, CtWriter, GeneratorConfig, MetricSetTable, RawCounter, Tile};

pub const DEVICE_ID: u64 = 0;
pub const MANIFEST_HEADER: &str = "filepath,filename,line_numbers\n";

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Write a manifest with the standard header followed by `rows`.
pub fn write_manifest(dir: &Path, rows: &[&str]) {
    let mut text = MANIFEST_HEADER.to_string();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(dir.join("aie_profile_timestamps.csv"), text).expect("writing manifest");
}

/// Two core counters in column 0 plus a shim bandwidth counter in column 4.
pub fn sample_counters() -> CounterTable {
    CounterTable::new()
        .with_counter(DEVICE_ID, RawCounter::new(0, 2, 0, "aie"))
        .with_counter(DEVICE_ID, RawCounter::new(0, 2, 1, "aie"))
        .with_counter(
            DEVICE_ID,
            RawCounter::new(4, 0, 0, "interface_tile").with_payload(1 << 8),
        )
}

pub fn sample_metric_sets() -> MetricSetTable {
    MetricSetTable::from_module_metrics([
        vec![(Tile::new(0, 2), "heat_map")],
        vec![(Tile::new(4, 0), "read_bandwidth")],
    ])
}

pub fn writer<'a>(dir: &Path, counters: &'a CounterTable, metric_sets: MetricSetTable) -> CtWriter<'a, CounterTable> {
    CtWriter::new(
        GeneratorConfig::in_dir(dir),
        counters,
        ChipShifts::new(25, 20).expect("valid shifts"),
        metric_sets,
        DEVICE_ID,
    )
}
