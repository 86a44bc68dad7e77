use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Sender;

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::{MemoryError, MemoryOperation, MemoryPermission};

/// Number of characters in a generated region identifier
const REGION_ID_LEN: usize = 8;

/// Opaque identifier issued by the region registry.
///
/// Callers must treat the identifier as a token; its contents carry no
/// meaning beyond uniqueness within the issuing registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionId(String);

impl RegionId {
    pub(crate) fn from_raw(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, permissioned, contiguous span of memory cells
pub struct MemoryRegion {
    id: RegionId,
    name: String,
    start_address: usize,
    end_address: usize,
    permission: MemoryPermission,
    sink: Option<Sender<MemoryOperation>>,
    last_access: Option<usize>,
}

impl MemoryRegion {
    pub(super) fn new(
        id: RegionId,
        name: &str,
        start_address: usize,
        end_address: usize,
        permission: MemoryPermission,
        sink: Option<Sender<MemoryOperation>>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            start_address,
            end_address,
            permission,
            sink,
            last_access: None,
        }
    }

    /// Provides the identifier issued for the region
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// Provides the display name of the region
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provides the first address covered by the region
    pub fn start_address(&self) -> usize {
        self.start_address
    }

    /// Provides the last address covered by the region, inclusive
    pub fn end_address(&self) -> usize {
        self.end_address
    }

    /// Provides the shared access permission of the region
    pub fn permission(&self) -> MemoryPermission {
        self.permission
    }

    /// Provides the number of cells covered by the region
    pub fn size(&self) -> usize {
        self.end_address - self.start_address + 1
    }

    /// Provides the last address touched within the region, if any
    pub fn last_access(&self) -> Option<usize> {
        self.last_access
    }

    /// Determines whether the address falls within the region
    pub fn contains(&self, address: usize) -> bool {
        address >= self.start_address && address <= self.end_address
    }

    pub(super) fn touch(&mut self, address: usize) {
        self.last_access = Some(address);
    }

    /// Sends the operation to the region sink, if one was registered.
    /// A disconnected receiver is ignored; the store state is already
    /// settled by the time anything is published.
    pub(super) fn publish(&self, op: &MemoryOperation) {
        if let Some(sink) = &self.sink {
            let _ = sink.send(op.clone());
        }
    }
}

/// Registry of live memory regions, owned exclusively by the store
#[derive(Default)]
pub struct RegionRegistry {
    regions: HashMap<RegionId, MemoryRegion>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self {
            regions: HashMap::new(),
        }
    }

    /// Provides the region registered under the given identifier
    pub fn get(&self, id: &RegionId) -> Option<&MemoryRegion> {
        self.regions.get(id)
    }

    pub(super) fn get_mut(&mut self, id: &RegionId) -> Option<&mut MemoryRegion> {
        self.regions.get_mut(id)
    }

    /// Provides the identifiers of all live regions, in no particular order
    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.keys().cloned().collect()
    }

    /// Provides the number of live regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Determines whether the registry holds no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Checks the candidate span against every live region. Four
    /// clauses: shared start, shared end, left overhang, and right
    /// overhang. A candidate that contains or sits inside an existing
    /// region trips an overhang clause; there is no dedicated
    /// containment clause.
    pub(super) fn check_overlap(&self, start: usize, end: usize) -> Result<(), MemoryError> {
        for r in self.regions.values() {
            if start == r.start_address()
                || end == r.end_address()
                || (start < r.start_address() && end >= r.start_address())
                || (start > r.start_address() && start <= r.end_address())
            {
                return Err(MemoryError::RegionOverlap { start, end });
            }
        }

        Ok(())
    }

    /// Generates identifiers until one is unused by any live region
    pub(super) fn issue_id(&self) -> RegionId {
        let mut rng = rand::thread_rng();

        loop {
            let id: String = (&mut rng)
                .sample_iter(Alphanumeric)
                .take(REGION_ID_LEN)
                .map(char::from)
                .collect();
            let id = RegionId(id);

            if !self.regions.contains_key(&id) {
                return id;
            }
        }
    }

    pub(super) fn insert(&mut self, region: MemoryRegion) {
        self.regions.insert(region.id().clone(), region);
    }

    pub(super) fn remove(&mut self, id: &RegionId) -> Option<MemoryRegion> {
        self.regions.remove(id)
    }

    pub(super) fn clear(&mut self) {
        self.regions.clear();
    }
}
