mod common;

use test_log::test;

/// Scenario B: a small size limit forces rollover partway through a run of
/// same-sized appends, and every configured directory's `lastId` marker
/// tracks the newly active segment.
#[test]
fn rollover_opens_a_fresh_segment_with_its_own_header() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open_with_limit(dir.path(), 2048)?;

    let payload = vec![0u8; 1000];
    let mut last_segment = 0;

    for entry_id in 0..10u64 {
        let location = store.add_entry(1, entry_id, &payload)?;
        last_segment = location.segment_id();
    }

    assert!(last_segment > 0, "expected at least one rollover to have happened");

    let marker = dir.path().join("lastId");
    let contents = std::fs::read_to_string(marker)?;
    assert_eq!(format!("{last_segment:x}\n"), contents);

    let new_segment_path = dir.path().join(format!("{last_segment:x}.log"));
    assert!(new_segment_path.metadata()?.len() >= 1024);

    Ok(())
}

#[test]
fn no_segment_exceeds_the_limit_plus_header_and_one_frame() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let limit = 4096u64;
    let store = common::open_with_limit(dir.path(), limit)?;

    let payload = vec![0u8; 500];
    for entry_id in 0..50u64 {
        store.add_entry(1, entry_id, &payload)?;
    }
    store.flush(true)?;

    for entry in std::fs::read_dir(dir.path())? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".log") {
            continue;
        }

        let size = entry.metadata()?.len();
        let frame_overhead = 4 + 16 + payload.len() as u64;
        assert!(
            size <= 1024 + limit + frame_overhead,
            "segment {name} is {size} bytes, over budget"
        );
    }

    Ok(())
}

#[test]
fn every_directory_marker_agrees_after_rollover() -> entry_log_store::Result<()> {
    let dir_a = tempfile::tempdir()?;
    let dir_b = tempfile::tempdir()?;

    let store = entry_log_store::EntryLogStore::open(
        entry_log_store::Config::new(vec![dir_a.path().to_path_buf(), dir_b.path().to_path_buf()])
            .entry_log_size_limit(2048),
    )?;

    let payload = vec![0u8; 1000];
    for entry_id in 0..20u64 {
        store.add_entry(1, entry_id, &payload)?;
    }
    store.flush(true)?;

    // Both directories' `lastId` markers must agree with each other, since
    // rollover rewrites all of them to the same value every time.
    let marker_a = std::fs::read_to_string(dir_a.path().join("lastId"))?;
    let marker_b = std::fs::read_to_string(dir_b.path().join("lastId"))?;
    assert_eq!(marker_a, marker_b);

    Ok(())
}
