use super::{MemoryPermission, RegionId};

/// Provides a single addressable byte of simulated memory
#[derive(Debug, Clone)]
pub struct MemoryCell {
    address: usize,
    permission: MemoryPermission,
    value: u8,
    region: Option<RegionId>,
}

impl MemoryCell {
    /// Defines a new cell at the given address with zero data and read-write access
    pub fn new(address: usize) -> Self {
        Self {
            address,
            permission: MemoryPermission::default(),
            value: 0,
            region: None,
        }
    }

    /// Provides the fixed address of the cell
    pub fn address(&self) -> usize {
        self.address
    }

    /// Provides the current access permission of the cell
    pub fn permission(&self) -> MemoryPermission {
        self.permission
    }

    /// Provides the stored byte value
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Provides the identifier of the owning region, if any
    pub fn region(&self) -> Option<&RegionId> {
        self.region.as_ref()
    }

    pub(super) fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Places the cell under a region, inheriting the region permission and initial value
    pub(super) fn assign_region(
        &mut self,
        region: RegionId,
        permission: MemoryPermission,
        value: u8,
    ) {
        self.region = Some(region);
        self.permission = permission;
        self.value = value;
    }

    /// Returns the cell to its default state with no owning region
    pub(super) fn release_region(&mut self) {
        self.region = None;
        self.permission = MemoryPermission::default();
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test the default state of a newly created cell
    #[test]
    fn test_init() {
        let cell = MemoryCell::new(42);

        assert_eq!(cell.address(), 42);
        assert_eq!(cell.permission(), MemoryPermission::ReadWrite);
        assert_eq!(cell.value(), 0);
        assert!(cell.region().is_none());
    }

    /// Test that releasing a region restores the default state
    #[test]
    fn test_release() {
        let mut cell = MemoryCell::new(0);
        cell.assign_region(RegionId::from_raw("abc123"), MemoryPermission::ReadOnly, 0xFF);

        assert_eq!(cell.permission(), MemoryPermission::ReadOnly);
        assert_eq!(cell.value(), 0xFF);
        assert!(cell.region().is_some());

        cell.release_region();

        assert_eq!(cell.permission(), MemoryPermission::ReadWrite);
        assert_eq!(cell.value(), 0);
        assert!(cell.region().is_none());
    }
}
