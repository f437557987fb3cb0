//! Counter module kinds and their register base offsets.

use std::fmt;

use tracing::warn;

/// Hardware module a counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// AIE core module (`aie`).
    Core,
    /// AIE memory module (`aie_memory`).
    Memory,
    /// Memory tile (`memory_tile`).
    MemoryTile,
    /// Interface (shim) tile (`interface_tile`).
    InterfaceTile,
}

impl ModuleKind {
    pub const ALL: [Self; 4] = [Self::Core, Self::Memory, Self::MemoryTile, Self::InterfaceTile];

    /// Name used by the counter configuration store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "aie",
            Self::Memory => "aie_memory",
            Self::MemoryTile => "memory_tile",
            Self::InterfaceTile => "interface_tile",
        }
    }

    /// Offset of performance counter 0 within the tile's address space.
    #[must_use]
    pub const fn base_offset(self) -> u64 {
        match self {
            Self::Core => 0x0003_7520,
            Self::Memory => 0x0001_1020,
            Self::MemoryTile => 0x0009_1020,
            Self::InterfaceTile => 0x0003_1020,
        }
    }

    /// Exact lookup by store name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Lookup by store name, falling back to [`ModuleKind::Core`].
    ///
    /// The fallback keeps addresses stable for unknown modules but may hide a
    /// configuration error, so it is logged.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!(module = %name, "unrecognized counter module, using core base offset");
            Self::Core
        })
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
