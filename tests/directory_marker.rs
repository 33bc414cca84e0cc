mod common;

use test_log::test;

/// Property 8: after creating segment `K`, every configured directory's
/// `lastId` file contains `hex(K)\n` - including right after opening a fresh
/// store, since opening always creates segment 0 up front.
#[test]
fn fresh_store_leaves_hex_encoded_marker_in_every_directory() -> entry_log_store::Result<()> {
    let dir_a = tempfile::tempdir()?;
    let dir_b = tempfile::tempdir()?;
    let dir_c = tempfile::tempdir()?;

    let _store = entry_log_store::EntryLogStore::open(entry_log_store::Config::new(vec![
        dir_a.path().to_path_buf(),
        dir_b.path().to_path_buf(),
        dir_c.path().to_path_buf(),
    ]))?;

    for dir in [&dir_a, &dir_b, &dir_c] {
        let contents = std::fs::read_to_string(dir.path().join("lastId"))?;
        assert_eq!("0\n", contents);
    }

    Ok(())
}

#[test]
fn marker_tracks_hex_of_highest_segment_created() -> entry_log_store::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = common::open_with_limit(dir.path(), 64)?;

    // Each of these appends overruns the tiny limit and forces a rollover.
    for entry_id in 0..5u64 {
        store.add_entry(1, entry_id, &[0u8; 64])?;
    }

    let highest = {
        let contents = std::fs::read_to_string(dir.path().join("lastId"))?;
        let hex = contents.trim();
        u64::from_str_radix(hex, 16).expect("hex segment id")
    };

    assert!(highest >= 5, "expected at least 5 rollovers, marker says {highest:x}");

    Ok(())
}
