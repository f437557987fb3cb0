//! AIE profile counter-trace (CT) script generator.
//!
//! Joins the control-program instrumentation manifest with the live counter
//! configuration and writes a CT script that samples every configured
//! counter at each probe point.
//!
//! # Example
//!
//! ```ignore
//! use aiect::{ChipShifts, CounterTable, CtWriter, GeneratorConfig, MetricSetTable};
//!
//! let writer = CtWriter::new(
//!     GeneratorConfig::default(),
//!     &counters,
//!     ChipShifts::AIE2PS,
//!     MetricSetTable::new(),
//!     device_id,
//! );
//! let report = writer.generate()?;
//! ```

// Re-export from sub-crates
pub use aiect_counters::{
    ChipShifts, ColumnRange, CounterDescriptor, CounterError, CounterResolver, CounterSource,
    CounterTable, MetricCollection, MetricCollections, MetricSetTable, ModuleKind, PortDirection,
    RawCounter, Tile, TileMetric, filter_by_columns, format_address,
};
pub use aiect_emit::{EmitError, ProbeBlock, ScriptConfig, ScriptEmitter};
pub use aiect_manifest::{InstrumentationRecord, LoadStats, Manifest, ManifestError, ProbePoint};

mod config;
mod error;
mod generator;

pub use config::*;
pub use error::{Error, Result};
pub use generator::*;
