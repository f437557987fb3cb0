//! CT generation pipeline: manifest → counters → partition → script.

use std::path::PathBuf;

use aiect_counters::{
    ChipShifts, ColumnRange, CounterResolver, CounterSource, MetricSetTable, filter_by_columns,
};
use aiect_emit::{ProbeBlock, ScriptEmitter};
use aiect_manifest::Manifest;
use tracing::{debug, info, info_span, warn};

use crate::config::GeneratorConfig;
use crate::{Error, Result};

/// Summary of a successful generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
    /// Script that was written.
    pub output_path: PathBuf,
    /// Records loaded from the manifest.
    pub records: usize,
    /// Counters listed in the script metadata.
    pub counters: usize,
    /// `jprobe` blocks emitted.
    pub probe_blocks: usize,
}

/// Generates the CT script for one device.
pub struct CtWriter<'a, S: CounterSource + ?Sized> {
    config: GeneratorConfig,
    source: &'a S,
    resolver: CounterResolver,
    emitter: ScriptEmitter,
    device_id: u64,
}

impl<'a, S: CounterSource + ?Sized> CtWriter<'a, S> {
    /// Create a writer for `device_id`.
    #[must_use]
    pub fn new(
        config: GeneratorConfig,
        source: &'a S,
        shifts: ChipShifts,
        metric_sets: MetricSetTable,
        device_id: u64,
    ) -> Self {
        let emitter = ScriptEmitter::new(config.script.clone());
        Self {
            config,
            source,
            resolver: CounterResolver::new(shifts, metric_sets),
            emitter,
            device_id,
        }
    }

    /// Create a writer from raw chip shift values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Counter`] if a shift is out of range.
    pub fn from_chip(
        config: GeneratorConfig,
        source: &'a S,
        column_shift: u8,
        row_shift: u8,
        metric_sets: MetricSetTable,
        device_id: u64,
    ) -> Result<Self> {
        let shifts = ChipShifts::new(column_shift, row_shift)?;
        Ok(Self::new(config, source, shifts, metric_sets, device_id))
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the pipeline and write the script.
    ///
    /// # Errors
    ///
    /// Input-absent conditions ([`Error::NoManifestRecords`],
    /// [`Error::NoCounters`], [`Error::NoProbePoints`]) leave the output
    /// untouched. [`Error::Emit`] means the script could not be written.
    pub fn generate(&self) -> Result<GenerateReport> {
        let _span = info_span!("generate_ct", device = self.device_id).entered();

        let manifest_path = self.config.manifest_path();
        let manifest = {
            let _span = info_span!("load_manifest").entered();
            Manifest::load(&manifest_path)
        };
        if manifest.is_empty() {
            debug!(path = %manifest_path.display(), "no control program records in manifest, CT file will not be generated");
            return Err(Error::NoManifestRecords(manifest_path));
        }

        let counters = {
            let _span = info_span!("resolve_counters").entered();
            self.resolver.resolve(self.source, self.device_id)
        };
        if counters.is_empty() {
            debug!(device = self.device_id, "no AIE counters configured, CT file will not be generated");
            return Err(Error::NoCounters(self.device_id));
        }

        let blocks: Vec<ProbeBlock<'_>> = manifest
            .records
            .iter()
            .map(|record| {
                let range = ColumnRange::new(record.column_start, record.column_end);
                ProbeBlock::new(record, filter_by_columns(&counters, range))
            })
            .collect();

        if !manifest.records.iter().any(|r| r.has_probe_points()) {
            debug!(path = %manifest_path.display(), "no probe points in manifest, CT file will not be generated");
            return Err(Error::NoProbePoints(manifest_path));
        }

        let output_path = self.config.output_path();
        {
            let _span = info_span!("emit_script").entered();
            self.emitter.write(&output_path, &blocks, &counters)?;
        }

        let report = GenerateReport {
            output_path,
            records: manifest.records.len(),
            counters: counters.len(),
            probe_blocks: blocks.iter().filter(|b| b.is_emittable()).count(),
        };
        info!(
            path = %report.output_path.display(),
            records = report.records,
            counters = report.counters,
            probe_blocks = report.probe_blocks,
            "CT generation complete"
        );
        Ok(report)
    }

    /// Run [`CtWriter::generate`], reducing any failure to `false`.
    ///
    /// A tracing session continues without counter tracing rather than
    /// aborting.
    #[must_use]
    pub fn generate_or_skip(&self) -> bool {
        match self.generate() {
            Ok(_) => true,
            Err(e) if e.is_input_absent() => false,
            Err(e) => {
                warn!(error = %e, "CT file not generated");
                false
            }
        }
    }
}
