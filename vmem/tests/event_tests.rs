use std::sync::mpsc;

use vmem::{MemoryOperation, MemoryPermission, MemoryStore};

/// Every global subscriber observes every operation, in order.
#[test]
fn global_channel_sees_all_operations() {
    let mut store = MemoryStore::new(64);
    let rx_a = store.subscribe();
    let rx_b = store.subscribe();

    store.store_byte(1, 2, true, true).unwrap();
    store.load_byte(1, true).unwrap();
    store.store_word(10, 0x1234, true, true).unwrap();
    store.load_word(10, true).unwrap();
    store.store_bytes(20, 2, Some(&[7, 8])).unwrap();
    store.reset();
    store.set_size(32);

    let expected = [
        MemoryOperation::StoreByte { address: 1, value: 2 },
        MemoryOperation::LoadByte { address: 1, value: 2 },
        MemoryOperation::StoreWord {
            address: 10,
            value: 0x1234,
        },
        MemoryOperation::LoadWord {
            address: 10,
            value: 0x1234,
        },
        MemoryOperation::StoreBytes {
            initial_address: 20,
            count: 2,
            values: Some(vec![7, 8]),
        },
        MemoryOperation::Reset,
        MemoryOperation::SizeChange { size: 32 },
    ];

    for want in &expected {
        assert_eq!(&rx_a.recv().unwrap(), want);
        assert_eq!(&rx_b.recv().unwrap(), want);
    }
    assert!(rx_a.try_recv().is_err());
    assert!(rx_b.try_recv().is_err());
}

/// Region management operations carry their full payload.
#[test]
fn region_lifecycle_events() {
    let mut store = MemoryStore::new(64);
    let rx = store.subscribe();

    let id = store
        .add_region(
            "Rom",
            4,
            7,
            MemoryPermission::ReadOnly,
            Some(&[1, 2, 3, 4]),
            None,
        )
        .unwrap();
    store.remove_region(&id);

    assert_eq!(
        rx.recv().unwrap(),
        MemoryOperation::AddRegion {
            region_id: id.clone(),
            name: "Rom".to_string(),
            start_address: 4,
            end_address: 7,
            permission: MemoryPermission::ReadOnly,
            initial_values: Some(vec![1, 2, 3, 4]),
        }
    );
    assert_eq!(
        rx.recv().unwrap(),
        MemoryOperation::RemoveRegion { region_id: id }
    );
}

/// A region sink receives only the byte/word accesses landing in its
/// span; the global channel still receives everything.
#[test]
fn region_sink_scoping() {
    let mut store = MemoryStore::new(64);

    let (sink_tx, sink_rx) = mpsc::channel();
    store
        .add_region("io", 10, 20, MemoryPermission::ReadWrite, None, Some(sink_tx))
        .unwrap();
    let global_rx = store.subscribe();

    store.store_byte(12, 5, true, true).unwrap();
    store.store_byte(30, 6, true, true).unwrap();
    store.load_word(14, true).unwrap();

    // The sink sees the in-region store and load only
    assert_eq!(
        sink_rx.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 12, value: 5 }
    );
    assert_eq!(
        sink_rx.try_recv().unwrap(),
        MemoryOperation::LoadWord { address: 14, value: 0 }
    );
    assert!(sink_rx.try_recv().is_err());

    // The global channel sees all three
    assert_eq!(
        global_rx.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 12, value: 5 }
    );
    assert_eq!(
        global_rx.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 30, value: 6 }
    );
    assert_eq!(
        global_rx.try_recv().unwrap(),
        MemoryOperation::LoadWord { address: 14, value: 0 }
    );
}

/// The publish flag gates the region sink, never the global channel.
#[test]
fn publish_flag_gates_region_sink_only() {
    let mut store = MemoryStore::new(64);

    let (sink_tx, sink_rx) = mpsc::channel();
    store
        .add_region("io", 10, 20, MemoryPermission::ReadWrite, None, Some(sink_tx))
        .unwrap();
    let global_rx = store.subscribe();

    store.store_byte(15, 9, true, false).unwrap();

    assert!(sink_rx.try_recv().is_err());
    assert_eq!(
        global_rx.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 15, value: 9 }
    );
}

/// Bulk stores never route to a region sink, even when the span lands
/// entirely inside the region.
#[test]
fn store_bytes_bypasses_region_sink() {
    let mut store = MemoryStore::new(64);

    let (sink_tx, sink_rx) = mpsc::channel();
    store
        .add_region("io", 10, 20, MemoryPermission::ReadOnly, None, Some(sink_tx))
        .unwrap();
    let global_rx = store.subscribe();

    // No permission check runs either; this is the privileged loading path
    store.store_bytes(12, 3, Some(&[1, 2, 3])).unwrap();

    assert!(sink_rx.try_recv().is_err());
    assert_eq!(
        global_rx.try_recv().unwrap(),
        MemoryOperation::StoreBytes {
            initial_address: 12,
            count: 3,
            values: Some(vec![1, 2, 3]),
        }
    );
    assert_eq!(store.inspect(12).unwrap(), 1);
}

/// Dropping a receiver never wedges later publishes; the dead
/// subscriber is pruned and the rest keep receiving.
#[test]
fn dropped_subscriber_is_pruned() {
    let mut store = MemoryStore::new(64);

    let rx_dead = store.subscribe();
    let rx_live = store.subscribe();
    drop(rx_dead);

    store.store_byte(0, 1, true, true).unwrap();
    store.store_byte(1, 2, true, true).unwrap();

    assert_eq!(
        rx_live.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 0, value: 1 }
    );
    assert_eq!(
        rx_live.try_recv().unwrap(),
        MemoryOperation::StoreByte { address: 1, value: 2 }
    );
}

/// A dropped region sink is tolerated the same way.
#[test]
fn dropped_region_sink_is_tolerated() {
    let mut store = MemoryStore::new(64);

    let (sink_tx, sink_rx) = mpsc::channel();
    store
        .add_region("io", 10, 20, MemoryPermission::ReadWrite, None, Some(sink_tx))
        .unwrap();
    drop(sink_rx);

    store.store_byte(15, 9, true, true).unwrap();
    assert_eq!(store.inspect(15).unwrap(), 9);
}

/// Failed operations publish nothing.
#[test]
fn failures_are_silent() {
    let mut store = MemoryStore::new(64);

    store
        .add_region("Rom", 10, 20, MemoryPermission::ReadOnly, None, None)
        .unwrap();
    let rx = store.subscribe();

    assert!(store.store_byte(15, 1, true, true).is_err());
    assert!(store.store_byte(100, 1, true, true).is_err());
    assert!(store.store_bytes(60, 10, None).is_err());
    assert!(store
        .add_region("bad", 15, 25, MemoryPermission::ReadWrite, None, None)
        .is_err());

    assert!(rx.try_recv().is_err());
}
