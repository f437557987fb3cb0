//! Counter register address arithmetic.

use crate::module::ModuleKind;
use crate::{CounterError, Result};

/// Counters within a module are this many bytes apart.
pub const COUNTER_STRIDE: u64 = 4;

/// Hex digits in a formatted address (excluding the `0x` prefix).
pub const ADDRESS_HEX_DIGITS: usize = 10;

/// Largest shift that keeps an 8-bit coordinate inside a `u64`.
const MAX_SHIFT: u8 = 56;

/// Chip-specific tile address shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipShifts {
    column_shift: u8,
    row_shift: u8,
}

impl ChipShifts {
    /// Shifts used by AIE2PS devices.
    pub const AIE2PS: Self = Self {
        column_shift: 25,
        row_shift: 20,
    };

    /// Validate and build a shift pair.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::ShiftOutOfRange`] if either shift would move
    /// an 8-bit coordinate past bit 63.
    pub const fn new(column_shift: u8, row_shift: u8) -> Result<Self> {
        if column_shift > MAX_SHIFT {
            return Err(CounterError::ShiftOutOfRange {
                axis: "column",
                shift: column_shift,
            });
        }
        if row_shift > MAX_SHIFT {
            return Err(CounterError::ShiftOutOfRange {
                axis: "row",
                shift: row_shift,
            });
        }
        Ok(Self {
            column_shift,
            row_shift,
        })
    }

    #[must_use]
    pub const fn column_shift(&self) -> u8 {
        self.column_shift
    }

    #[must_use]
    pub const fn row_shift(&self) -> u8 {
        self.row_shift
    }

    /// Address of a tile's register space.
    #[must_use]
    pub const fn tile_address(&self, column: u8, row: u8) -> u64 {
        ((column as u64) << self.column_shift) | ((row as u64) << self.row_shift)
    }

    /// Address of a performance counter register.
    #[must_use]
    pub const fn counter_address(&self, column: u8, row: u8, counter: u8, module: ModuleKind) -> u64 {
        self.tile_address(column, row) + module.base_offset() + counter as u64 * COUNTER_STRIDE
    }
}

impl Default for ChipShifts {
    fn default() -> Self {
        Self::AIE2PS
    }
}

/// Format an address as `0x` followed by 10 zero-padded lowercase hex digits.
#[must_use]
pub fn format_address(address: u64) -> String {
    format!("{address:#0width$x}", width = ADDRESS_HEX_DIGITS + 2)
}
