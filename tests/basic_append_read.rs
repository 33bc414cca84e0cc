mod common;

use test_log::test;

/// Scenario A from the store's append/read contract: a single entry, round
/// tripped through a fresh, single-directory store.
#[test]
fn single_append_round_trips() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open_with_limit(dir.path(), 1024 * 1024)?;

    let payload = b"hello";
    let location = store.add_entry(7, 0, payload)?;

    store.flush(true)?;

    let segment_path = dir.path().join("0.log");
    assert_eq!(1024 + 4 + 16 + payload.len() as u64, segment_path.metadata()?.len());

    let read_back = store.read_entry(7, 0, location)?;
    assert_eq!(payload, &*read_back);

    Ok(())
}

#[test]
fn many_ledgers_multiplex_into_the_same_segment() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open(dir.path())?;

    let mut locations = Vec::new();
    for ledger_id in 0..10u64 {
        for entry_id in 0..10u64 {
            let payload = format!("ledger {ledger_id} entry {entry_id}");
            let location = store.add_entry(ledger_id, entry_id, payload.as_bytes())?;
            locations.push((ledger_id, entry_id, location));
        }
    }

    store.flush(true)?;

    for (ledger_id, entry_id, location) in locations {
        let payload = store.read_entry(ledger_id, entry_id, location)?;
        assert_eq!(format!("ledger {ledger_id} entry {entry_id}").as_bytes(), &*payload);
    }

    Ok(())
}

#[test]
fn empty_payload_round_trips() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open(dir.path())?;

    let location = store.add_entry(1, 0, b"")?;
    store.flush(true)?;

    let read_back = store.read_entry(1, 0, location)?;
    assert!(read_back.is_empty());

    Ok(())
}

#[test]
fn test_and_clear_something_written_tracks_dirty_state() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open(dir.path())?;

    assert!(!store.test_and_clear_something_written());

    store.add_entry(1, 0, b"x")?;
    assert!(store.test_and_clear_something_written());
    assert!(!store.test_and_clear_something_written());

    Ok(())
}
