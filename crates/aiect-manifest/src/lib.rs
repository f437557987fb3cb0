//! Instrumentation manifest for AIE control programs.
//!
//! The manifest is a CSV file with one row per control program:
//!
//! ```text
//! filepath,filename,line_numbers
//! /work/build,aie_runtime_control0.asm,"6,8,293"
//! ```
//!
//! Each usable row becomes an [`InstrumentationRecord`] that owns the four
//! AIE columns `4 * id ..= 4 * id + 3`. Bad rows are logged and skipped; the
//! loader never fails a whole file because of one row.

mod csv;
mod loader;
mod record;

pub use csv::{parse_line_numbers, split_fields};
pub use loader::*;
pub use record::*;

use thiserror::Error;

/// Manifest errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected 3 fields, got {0}")]
    FieldCount(usize),
    #[error("Unable to extract control program id from file name: {0}")]
    UnmatchedFileName(String),
    #[error("Control program id {0} is out of range")]
    ProgramIdOutOfRange(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
