//! AIE performance counter resolution.
//!
//! Turns the live counter configuration into [`CounterDescriptor`]s carrying
//! a register address, a metric set and a port direction, and partitions
//! them by the column range each control program owns.

mod address;
mod collections;
mod metric;
mod module;
pub mod partition;
mod resolver;
mod source;

pub use address::*;
pub use collections::*;
pub use metric::*;
pub use module::*;
pub use partition::{ColumnRange, filter_by_columns};
pub use resolver::*;
pub use source::*;

use thiserror::Error;

/// Counter resolution errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CounterError {
    #[error("{axis} shift {shift} pushes an 8-bit coordinate past bit 63")]
    ShiftOutOfRange { axis: &'static str, shift: u8 },
}

pub type Result<T> = std::result::Result<T, CounterError>;
