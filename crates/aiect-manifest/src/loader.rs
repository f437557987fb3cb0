//! Manifest loading.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::csv::{parse_line_numbers, split_fields};
use crate::record::{InstrumentationRecord, ProbePoint};
use crate::{ManifestError, Result};

/// Default manifest file name, relative to the working directory.
pub const DEFAULT_MANIFEST_FILE: &str = "aie_profile_timestamps.csv";

/// Number of fields in a manifest data row.
pub const MANIFEST_FIELDS: usize = 3;

/// Counts collected while loading a manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Non-empty data rows seen (header excluded).
    pub rows: usize,
    /// Rows with a field count other than [`MANIFEST_FIELDS`].
    pub malformed_rows: usize,
    /// Rows whose file name did not yield a control program id.
    pub unmatched_file_names: usize,
    /// Line-number tokens that failed to parse.
    pub rejected_line_numbers: usize,
}

impl LoadStats {
    /// Rows dropped for any reason.
    #[must_use]
    pub const fn skipped_rows(&self) -> usize {
        self.malformed_rows + self.unmatched_file_names
    }
}

/// Loaded manifest, sorted by ascending program id.
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    pub records: Vec<InstrumentationRecord>,
    pub stats: LoadStats,
}

impl Manifest {
    /// Load a manifest file.
    ///
    /// A missing or unreadable file yields an empty manifest.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unable to read manifest");
                Self::default()
            }
        }
    }

    /// Load a manifest file, reporting I/O failures.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read. Row-level
    /// problems never produce an error.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&text);
        info!(
            path = %path.display(),
            records = manifest.records.len(),
            probe_points = manifest.num_probe_points(),
            skipped = manifest.stats.skipped_rows(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parse manifest text. The first line is the header.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut records = Vec::new();
        let mut stats = LoadStats::default();

        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            stats.rows += 1;
            let line_num = idx + 1;

            match parse_row(line, line_num, &mut stats) {
                Ok(record) => {
                    debug!(
                        file = %record.file_name,
                        id = record.program_id,
                        uc = record.core_index,
                        column_start = record.column_start,
                        column_end = record.column_end,
                        probe_points = record.probe_points.len(),
                        "loaded manifest row"
                    );
                    records.push(record);
                }
                Err(ManifestError::FieldCount(n)) => {
                    stats.malformed_rows += 1;
                    warn!(line = line_num, fields = n, "invalid manifest row: expected 3 fields");
                }
                Err(e) => {
                    stats.unmatched_file_names += 1;
                    warn!(line = line_num, error = %e, "skipping manifest row");
                }
            }
        }

        // Stable: rows with equal ids keep their file order.
        records.sort_by_key(|r| r.program_id);
        Self { records, stats }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total probe points across all records.
    #[must_use]
    pub fn num_probe_points(&self) -> usize {
        self.records.iter().map(|r| r.probe_points.len()).sum()
    }
}

fn parse_row(line: &str, line_num: usize, stats: &mut LoadStats) -> Result<InstrumentationRecord> {
    let mut fields = split_fields(line);
    if fields.len() != MANIFEST_FIELDS {
        return Err(ManifestError::FieldCount(fields.len()));
    }
    let lines = fields.pop().unwrap_or_default();
    let file_name = fields.pop().unwrap_or_default();
    let directory = fields.pop().unwrap_or_default();

    let (numbers, rejected) = parse_line_numbers(&lines);
    for token in &rejected {
        warn!(line = line_num, token = %token, file = %file_name, "invalid line number");
    }
    stats.rejected_line_numbers += rejected.len();

    let probe_points = numbers.into_iter().map(ProbePoint::at_line).collect();
    InstrumentationRecord::new(directory, file_name, probe_points)
}
