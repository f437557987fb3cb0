//! CT script emission.
//!
//! Renders the tracing script consumed by the instrumentation injector:
//! a `begin` block that sets up the `profile_data` accumulator, one `jprobe`
//! block per control program with counters to sample, and an `end` block
//! that dumps the accumulator as JSON.

mod config;
mod script;

pub use config::*;
pub use script::*;

use std::path::PathBuf;

use thiserror::Error;

/// Script emission errors.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Unable to create CT file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to write CT file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EmitError>;
