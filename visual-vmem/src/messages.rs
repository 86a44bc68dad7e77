use vmem::MemoryOperation;

#[derive(Clone)]
pub enum UiToThread {
    LoadByte(usize),
    StoreByte(usize, u8, bool),
    LoadWord(usize),
    StoreWord(usize, u16, bool),
    FillBytes(usize, Vec<u8>),
    AddRegion {
        name: String,
        start: usize,
        end: usize,
        read_only: bool,
    },
    RemoveRegion(String),
    RequestMemory(usize, usize),
    Reset,
    SetSize(usize),
    Exit,
}

#[derive(Clone)]
pub enum ThreadToUi {
    ResponseMemory(usize, Vec<u8>),
    Operation(MemoryOperation),
    LogMessage(String),
    Ready,
    ThreadExit,
}
