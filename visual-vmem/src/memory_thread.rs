use std::sync::mpsc::{Receiver, RecvError, Sender};

use log::info;
use vmem::{MemoryOperation, MemoryPermission, MemoryStore, RegionId};

use crate::messages::{ThreadToUi, UiToThread};

struct ThreadState {
    run_thread: bool,
    store: MemoryStore,
    events: Receiver<MemoryOperation>,
}

impl ThreadState {
    fn new() -> Self {
        let mut store = MemoryStore::default();
        let events = store.subscribe();

        Self {
            run_thread: true,
            store,
            events,
        }
    }

    /// The store leaves the second word byte and the `size` address to
    /// caller discipline, so the monitor checks the full width here
    fn in_bounds(&self, address: usize, width: usize) -> bool {
        address
            .checked_add(width)
            .map(|top| top <= self.store.size())
            .unwrap_or(false)
    }

    fn lookup_region(&self, id: &str) -> Option<RegionId> {
        self.store
            .region_ids()
            .into_iter()
            .find(|r| r.as_str() == id)
    }

    fn handle_msg(&mut self, msg: UiToThread) -> Option<ThreadToUi> {
        match msg {
            UiToThread::LoadByte(address) => {
                if !self.in_bounds(address, 1) {
                    return Some(ThreadToUi::LogMessage(format!(
                        "address 0x{address:04x} is out of bounds"
                    )));
                }

                match self.store.load_byte(address, true) {
                    Ok(v) => Some(ThreadToUi::LogMessage(format!(
                        "[0x{address:04x}] = 0x{v:02x}"
                    ))),
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::StoreByte(address, value, is_instruction) => {
                if !self.in_bounds(address, 1) {
                    return Some(ThreadToUi::LogMessage(format!(
                        "address 0x{address:04x} is out of bounds"
                    )));
                }

                match self.store.store_byte(address, value, is_instruction, true) {
                    Ok(()) => None,
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::LoadWord(address) => {
                if !self.in_bounds(address, 2) {
                    return Some(ThreadToUi::LogMessage(format!(
                        "address 0x{address:04x} is out of bounds for a word"
                    )));
                }

                match self.store.load_word(address, true) {
                    Ok(v) => Some(ThreadToUi::LogMessage(format!(
                        "[0x{address:04x}] = 0x{v:04x}"
                    ))),
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::StoreWord(address, value, is_instruction) => {
                if !self.in_bounds(address, 2) {
                    return Some(ThreadToUi::LogMessage(format!(
                        "address 0x{address:04x} is out of bounds for a word"
                    )));
                }

                match self.store.store_word(address, value, is_instruction, true) {
                    Ok(()) => None,
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::FillBytes(address, values) => {
                match self.store.store_bytes(address, values.len(), Some(&values)) {
                    Ok(()) => None,
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::AddRegion {
                name,
                start,
                end,
                read_only,
            } => {
                let permission = if read_only {
                    MemoryPermission::ReadOnly
                } else {
                    MemoryPermission::ReadWrite
                };

                match self.store.add_region(&name, start, end, permission, None, None) {
                    Ok(id) => Some(ThreadToUi::LogMessage(format!("region '{name}' = {id}"))),
                    Err(e) => Some(ThreadToUi::LogMessage(format!("error: {e}"))),
                }
            }
            UiToThread::RemoveRegion(id) => {
                match self.lookup_region(&id) {
                    Some(region_id) => {
                        self.store.remove_region(&region_id);
                        None
                    }
                    // Matches the store's silent no-op for unknown ids
                    None => Some(ThreadToUi::LogMessage(format!(
                        "no region '{id}' (ignored)"
                    ))),
                }
            }
            UiToThread::RequestMemory(start, count) => {
                let mut data = Vec::new();
                for i in start..start + count {
                    match self.store.inspect(i) {
                        Ok(v) => data.push(v),
                        Err(_) => break,
                    }
                }

                Some(ThreadToUi::ResponseMemory(start, data))
            }
            UiToThread::Reset => {
                self.store.reset();
                None
            }
            UiToThread::SetSize(size) => {
                self.store.set_size(size);
                None
            }
            UiToThread::Exit => {
                self.run_thread = false;
                None
            }
        }
    }
}

/// Runs the store on its own thread, replying to each command with the
/// operation events it raised, an optional response, and a Ready marker
pub fn memory_thread(rx: Receiver<UiToThread>, tx: Sender<ThreadToUi>) {
    let mut state = ThreadState::new();

    info!("memory thread started with {} cells", state.store.size());

    while state.run_thread {
        let resp = match rx.recv() {
            Ok(msg) => state.handle_msg(msg),
            Err(RecvError) => break,
        };

        while let Ok(op) = state.events.try_recv() {
            if tx.send(ThreadToUi::Operation(op)).is_err() {
                return;
            }
        }

        if let Some(r) = resp {
            if tx.send(r).is_err() {
                return;
            }
        }

        if tx.send(ThreadToUi::Ready).is_err() {
            return;
        }
    }

    let _ = tx.send(ThreadToUi::ThreadExit);
}
