use super::{MemoryPermission, RegionId};

/// An immutable record of one completed memory operation.
///
/// The store publishes one of these on its global channel for every
/// operation, and additionally on a region's private sink for the
/// byte/word accesses that land inside a region which registered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOperation {
    Reset,
    SizeChange {
        size: usize,
    },
    LoadByte {
        address: usize,
        value: u8,
    },
    StoreByte {
        address: usize,
        value: u8,
    },
    StoreBytes {
        initial_address: usize,
        count: usize,
        values: Option<Vec<u8>>,
    },
    LoadWord {
        address: usize,
        value: u16,
    },
    StoreWord {
        address: usize,
        value: u16,
    },
    AddRegion {
        region_id: RegionId,
        name: String,
        start_address: usize,
        end_address: usize,
        permission: MemoryPermission,
        initial_values: Option<Vec<u8>>,
    },
    RemoveRegion {
        region_id: RegionId,
    },
}
