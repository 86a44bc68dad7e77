mod cell;
mod operation;
mod region;
mod store;

use thiserror::Error;

pub use cell::MemoryCell;
pub use operation::MemoryOperation;
pub use region::{MemoryRegion, RegionId, RegionRegistry};
pub use store::{MemoryStore, DEFAULT_MEMORY_SIZE};

/// Provides error conditions for memory store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory access violation at 0x{0:08x}")]
    OutOfRange(usize),
    #[error("invalid number of data values: expected {expected}, got {actual}")]
    InvalidValue { expected: usize, actual: usize },
    #[error("invalid length of the array of initial values: expected {expected}, got {actual}")]
    InvalidInitialData { expected: usize, actual: usize },
    #[error("invalid addresses: ({start}, {end})")]
    InvalidRange { start: usize, end: usize },
    #[error("new region ({start}, {end}) overlaps with an existing one")]
    RegionOverlap { start: usize, end: usize },
    #[error("invalid storage into read-only cell 0x{0:08x} in supervisor mode")]
    PermissionDenied(usize),
}

/// Access permission shared by a cell and its owning region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryPermission {
    #[default]
    ReadWrite,
    ReadOnly,
}
