use std::path::PathBuf;

use thiserror::Error;

/// Generator errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No control program records in manifest {0}")]
    NoManifestRecords(PathBuf),
    #[error("No AIE counters configured for device {0}")]
    NoCounters(u64),
    #[error("No probe points found in manifest {0}")]
    NoProbePoints(PathBuf),
    #[error("Counter error: {0}")]
    Counter(#[from] aiect_counters::CounterError),
    #[error("Emit error: {0}")]
    Emit(#[from] aiect_emit::EmitError),
}

impl Error {
    /// Whether the error only means there was nothing to instrument.
    #[must_use]
    pub const fn is_input_absent(&self) -> bool {
        matches!(
            self,
            Self::NoManifestRecords(_) | Self::NoCounters(_) | Self::NoProbePoints(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
