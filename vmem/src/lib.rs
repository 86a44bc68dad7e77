pub mod memory;

pub use memory::{
    MemoryCell, MemoryError, MemoryOperation, MemoryPermission, MemoryRegion, MemoryStore,
    RegionId, RegionRegistry,
};
