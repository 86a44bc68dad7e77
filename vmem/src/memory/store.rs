use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;

use super::{
    MemoryCell, MemoryError, MemoryOperation, MemoryPermission, MemoryRegion, RegionId,
    RegionRegistry,
};

/// Default number of cells in a newly constructed store
pub const DEFAULT_MEMORY_SIZE: usize = 1024;

/// Owns the cell array and the region registry, and acts as the sole
/// mutator of cell state. Every operation runs validate, mutate, then
/// publish, in that order, so a failed call never leaves the store
/// partially updated and subscribers only ever observe settled state.
pub struct MemoryStore {
    cells: Vec<MemoryCell>,
    regions: RegionRegistry,
    last_access: Option<usize>,
    subscribers: Vec<Sender<MemoryOperation>>,
}

impl MemoryStore {
    /// Defines a new store with the given number of zeroed cells
    pub fn new(size: usize) -> Self {
        Self {
            cells: (0..size).map(MemoryCell::new).collect(),
            regions: RegionRegistry::new(),
            last_access: None,
            subscribers: Vec::new(),
        }
    }

    /// Provides the number of addressable cells
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Provides the last address touched by a load or store, if any
    pub fn last_access(&self) -> Option<usize> {
        self.last_access
    }

    /// Provides the cell at the given address without touching access state
    pub fn cell(&self, address: usize) -> Option<&MemoryCell> {
        self.cells.get(address)
    }

    /// Provides the region registered under the given identifier
    pub fn region(&self, id: &RegionId) -> Option<&MemoryRegion> {
        self.regions.get(id)
    }

    /// Provides the identifiers of all live regions
    pub fn region_ids(&self) -> Vec<RegionId> {
        self.regions.ids()
    }

    /// Registers a new subscriber on the global operation channel and
    /// provides the receiving end. Subscribers whose receiver has been
    /// dropped are pruned on the next publish.
    pub fn subscribe(&mut self) -> Receiver<MemoryOperation> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Provides the byte at the requested memory location without
    /// recording the access or publishing any event
    pub fn inspect(&self, address: usize) -> Result<u8, MemoryError> {
        match self.cells.get(address) {
            Some(cell) => Ok(cell.value()),
            None => Err(MemoryError::OutOfRange(address)),
        }
    }

    /// Provides the byte at the requested memory location.
    ///
    /// The upper bound check is `>` rather than `>=`: an access at
    /// exactly `size` passes validation and panics on the cell index.
    pub fn load_byte(&mut self, address: usize, publish: bool) -> Result<u8, MemoryError> {
        if address > self.size() {
            return Err(MemoryError::OutOfRange(address));
        }

        let value = self.cells[address].value();
        let op = MemoryOperation::LoadByte { address, value };

        self.record_access(address, &op, publish);
        self.publish_global(op);

        Ok(value)
    }

    /// Sets the byte at the requested memory location.
    ///
    /// Read-only permission is enforced only for instruction-classified
    /// writes; a data write patches a read-only cell without complaint.
    /// The bound check shares the `>` quirk of [`Self::load_byte`].
    pub fn store_byte(
        &mut self,
        address: usize,
        value: u8,
        is_instruction: bool,
        publish: bool,
    ) -> Result<(), MemoryError> {
        if address > self.size() {
            return Err(MemoryError::OutOfRange(address));
        }

        if is_instruction && self.cells[address].permission() == MemoryPermission::ReadOnly {
            return Err(MemoryError::PermissionDenied(address));
        }

        self.cells[address].set_value(value);
        let op = MemoryOperation::StoreByte { address, value };

        self.record_access(address, &op, publish);
        self.publish_global(op);

        Ok(())
    }

    /// Provides the big-endian word starting at the requested location.
    ///
    /// The second byte is not bound-checked separately: a load at
    /// `size - 1` runs off the end of the cell array and panics.
    pub fn load_word(&mut self, address: usize, publish: bool) -> Result<u16, MemoryError> {
        if address >= self.size() {
            return Err(MemoryError::OutOfRange(address));
        }

        let value =
            u16::from_be_bytes([self.cells[address].value(), self.cells[address + 1].value()]);
        let op = MemoryOperation::LoadWord { address, value };

        self.record_access(address, &op, publish);
        self.publish_global(op);

        Ok(value)
    }

    /// Sets the big-endian word starting at the requested location.
    /// An instruction write fails if either of the two target cells is
    /// read-only.
    pub fn store_word(
        &mut self,
        address: usize,
        value: u16,
        is_instruction: bool,
        publish: bool,
    ) -> Result<(), MemoryError> {
        if address >= self.size() {
            return Err(MemoryError::OutOfRange(address));
        }

        if is_instruction
            && (self.cells[address].permission() == MemoryPermission::ReadOnly
                || self.cells[address + 1].permission() == MemoryPermission::ReadOnly)
        {
            return Err(MemoryError::PermissionDenied(address));
        }

        let [msb, lsb] = value.to_be_bytes();
        self.cells[address].set_value(msb);
        self.cells[address + 1].set_value(lsb);

        let op = MemoryOperation::StoreWord { address, value };

        self.record_access(address, &op, publish);
        self.publish_global(op);

        Ok(())
    }

    /// Sets `count` consecutive cells starting at `initial_address`,
    /// zero-filling when no values are supplied.
    ///
    /// Bulk writes are a privileged bypass used for initial loading:
    /// no permission check runs, and the single StoreBytes event goes
    /// to the global channel only, never to a region sink.
    pub fn store_bytes(
        &mut self,
        initial_address: usize,
        count: usize,
        values: Option<&[u8]>,
    ) -> Result<(), MemoryError> {
        match initial_address.checked_add(count) {
            Some(top) if top <= self.size() => {}
            _ => return Err(MemoryError::OutOfRange(initial_address)),
        }

        if let Some(vals) = values {
            if vals.len() != count {
                return Err(MemoryError::InvalidValue {
                    expected: count,
                    actual: vals.len(),
                });
            }
        }

        for i in 0..count {
            self.cells[initial_address + i].set_value(values.map_or(0, |v| v[i]));
        }

        self.last_access = Some(initial_address + count);

        self.publish_global(MemoryOperation::StoreBytes {
            initial_address,
            count,
            values: values.map(|v| v.to_vec()),
        });

        Ok(())
    }

    /// Registers a new region over `[start_address, end_address]`,
    /// applying its permission and initial values to every covered
    /// cell, and provides the issued identifier.
    ///
    /// `start_address >= end_address` is rejected, so a region spans
    /// at least two cells.
    pub fn add_region(
        &mut self,
        name: &str,
        start_address: usize,
        end_address: usize,
        permission: MemoryPermission,
        initial_values: Option<&[u8]>,
        sink: Option<Sender<MemoryOperation>>,
    ) -> Result<RegionId, MemoryError> {
        if end_address >= self.size() || start_address >= end_address {
            return Err(MemoryError::InvalidRange {
                start: start_address,
                end: end_address,
            });
        }

        let span = end_address - start_address + 1;
        if let Some(vals) = initial_values {
            if vals.len() != span {
                return Err(MemoryError::InvalidInitialData {
                    expected: span,
                    actual: vals.len(),
                });
            }
        }

        self.regions.check_overlap(start_address, end_address)?;

        let id = self.regions.issue_id();
        self.regions.insert(MemoryRegion::new(
            id.clone(),
            name,
            start_address,
            end_address,
            permission,
            sink,
        ));

        for i in 0..span {
            self.cells[start_address + i].assign_region(
                id.clone(),
                permission,
                initial_values.map_or(0, |v| v[i]),
            );
        }

        debug!("added region {id} ({name}) over [{start_address}, {end_address}]");

        self.publish_global(MemoryOperation::AddRegion {
            region_id: id.clone(),
            name: name.to_string(),
            start_address,
            end_address,
            permission,
            initial_values: initial_values.map(|v| v.to_vec()),
        });

        Ok(id)
    }

    /// Removes the region registered under the given identifier,
    /// returning every covered cell to its default state. An unknown
    /// identifier is ignored without error.
    pub fn remove_region(&mut self, region_id: &RegionId) {
        let Some(region) = self.regions.remove(region_id) else {
            return;
        };

        for i in region.start_address()..=region.end_address() {
            self.cells[i].release_region();
        }

        debug!("removed region {region_id}");

        self.publish_global(MemoryOperation::RemoveRegion {
            region_id: region_id.clone(),
        });
    }

    /// Replaces the entire cell array with fresh default cells and
    /// clears every region without publishing per-region removals
    pub fn set_size(&mut self, new_size: usize) {
        self.last_access = None;
        self.cells = (0..new_size).map(MemoryCell::new).collect();
        self.regions.clear();

        debug!("memory resized to {new_size} cells");

        self.publish_global(MemoryOperation::SizeChange { size: new_size });
    }

    /// Zeroes every cell not owned by a region. Region-owned cells
    /// keep their configured content; regions model held-constant
    /// hardware, not resettable RAM.
    pub fn reset(&mut self) {
        self.last_access = None;

        for cell in self.cells.iter_mut() {
            if cell.region().is_none() {
                cell.set_value(0);
            }
        }

        self.publish_global(MemoryOperation::Reset);
    }

    /// Records the access on the store and on the owning region, and
    /// forwards the operation to the region sink when `publish` is set.
    /// Region-sink delivery always precedes global delivery.
    fn record_access(&mut self, address: usize, op: &MemoryOperation, publish: bool) {
        self.last_access = Some(address);

        if let Some(id) = self.cells[address].region().cloned() {
            if let Some(region) = self.regions.get_mut(&id) {
                region.touch(address);
                if publish {
                    region.publish(op);
                }
            }
        }
    }

    fn publish_global(&mut self, op: MemoryOperation) {
        self.subscribers.retain(|tx| tx.send(op.clone()).is_ok());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_SIZE)
    }
}
