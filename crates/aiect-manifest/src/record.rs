//! Manifest records.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::{ManifestError, Result};

/// Columns owned by a single control program.
pub const COLUMNS_PER_PROGRAM: u32 = 4;

/// Value of [`ProbePoint::optional_index`] when the manifest gives no index.
pub const NO_INDEX: i32 = -1;

/// A source line in a control program where counters are sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbePoint {
    pub line_number: u32,
    pub optional_index: i32,
}

impl ProbePoint {
    /// Probe point without an explicit index.
    #[must_use]
    pub const fn at_line(line_number: u32) -> Self {
        Self {
            line_number,
            optional_index: NO_INDEX,
        }
    }
}

/// One control program and the probe points inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstrumentationRecord {
    /// Directory column of the manifest row.
    pub directory: String,
    /// File name as it appears in the manifest.
    pub file_name: String,
    /// Id captured from `aie_runtime_control<id>.asm`.
    pub program_id: u32,
    /// Microcontroller the probes are attached to (`4 * program_id`).
    pub core_index: u32,
    /// First owned column (inclusive).
    pub column_start: u32,
    /// Last owned column (inclusive), always `column_start + 3`.
    pub column_end: u32,
    /// Probe points in manifest order.
    pub probe_points: Vec<ProbePoint>,
}

impl InstrumentationRecord {
    /// Build a record for a control program file name.
    ///
    /// # Errors
    ///
    /// Returns an error when the file name does not contain
    /// `aie_runtime_control<digits>.asm` or the id overflows the column math.
    pub fn new(
        directory: impl Into<String>,
        file_name: impl Into<String>,
        probe_points: Vec<ProbePoint>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let program_id = program_id_from_file_name(&file_name)?;
        let column_start = program_id
            .checked_mul(COLUMNS_PER_PROGRAM)
            .filter(|start| start.checked_add(COLUMNS_PER_PROGRAM - 1).is_some())
            .ok_or_else(|| ManifestError::ProgramIdOutOfRange(program_id.to_string()))?;

        Ok(Self {
            directory: directory.into(),
            file_name,
            program_id,
            core_index: column_start,
            column_start,
            column_end: column_start + COLUMNS_PER_PROGRAM - 1,
            probe_points,
        })
    }

    /// File name without any leading directories.
    #[must_use]
    pub fn base_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file_name)
    }

    /// Source line numbers of all probe points, in manifest order.
    pub fn line_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.probe_points.iter().map(|p| p.line_number)
    }

    #[must_use]
    pub fn has_probe_points(&self) -> bool {
        !self.probe_points.is_empty()
    }
}

/// Extract the control program id from a manifest file name.
///
/// The pattern is searched, not anchored, so directory prefixes are accepted.
///
/// # Errors
///
/// [`ManifestError::UnmatchedFileName`] when the pattern is absent and
/// [`ManifestError::ProgramIdOutOfRange`] when the digits overflow `u32`.
///
/// # Panics
///
/// Panics only if the built-in file-name pattern fails to compile, which
/// cannot happen for the fixed pattern.
pub fn program_id_from_file_name(file_name: &str) -> Result<u32> {
    let pattern = FILE_NAME_PATTERN
        .get_or_init(|| Regex::new(r"aie_runtime_control(\d+)\.asm").unwrap());
    let digits = pattern
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ManifestError::UnmatchedFileName(file_name.to_string()))?
        .as_str();
    digits
        .parse::<u32>()
        .map_err(|_| ManifestError::ProgramIdOutOfRange(digits.to_string()))
}

static FILE_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
