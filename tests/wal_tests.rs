//! Tests for the WAL
//!
//! These tests verify:
//! - Appends are durable and replay in file order
//! - Replay of an empty or missing log
//! - Torn trailing records end replay quietly and are cut off
//! - Clear truncates to empty and appends continue afterwards

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use lsmkv::memtable::MemTableEntry;
use lsmkv::wal::{WalReader, WalRecovery, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("wal.log");
    (temp_dir, wal_path)
}

fn write_entries_via_writer(path: &PathBuf, count: usize) {
    let mut writer = WalWriter::open(path).unwrap();
    for i in 0..count {
        let key = format!("key{}", i);
        let value = MemTableEntry::Value(format!("value{}", i).into_bytes());
        writer.append(key.as_bytes(), &value).unwrap();
    }
}

fn collect(path: &PathBuf) -> Vec<(Vec<u8>, MemTableEntry)> {
    let mut out = Vec::new();
    WalRecovery::recover(path, |k, e| out.push((k, e))).unwrap();
    out
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path).unwrap();

    assert!(wal_path.exists());
    assert_eq!(writer.path(), wal_path.as_path());
    assert!(writer.is_empty().unwrap());
}

#[test]
fn test_append_is_visible_on_disk_immediately() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path).unwrap();

    writer
        .append(b"key", &MemTableEntry::Value(b"value".to_vec()))
        .unwrap();

    // 4 + 3 + 4 + 5
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 16);
    assert_eq!(writer.appended(), 1);
}

#[test]
fn test_reopen_appends_after_existing_records() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 3);

    {
        let mut writer = WalWriter::open(&wal_path).unwrap();
        writer.append(b"extra", &MemTableEntry::Tombstone).unwrap();
    }

    let entries = collect(&wal_path);
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3], (b"extra".to_vec(), MemTableEntry::Tombstone));
}

#[test]
fn test_clear_truncates_and_allows_more_appends() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path).unwrap();

    writer
        .append(b"old", &MemTableEntry::Value(b"1".to_vec()))
        .unwrap();
    writer.clear().unwrap();
    assert_eq!(writer.len().unwrap(), 0);
    assert_eq!(writer.appended(), 0);

    writer
        .append(b"new", &MemTableEntry::Value(b"2".to_vec()))
        .unwrap();
    writer.sync().unwrap();

    let entries = collect(&wal_path);
    assert_eq!(entries, vec![(b"new".to_vec(), MemTableEntry::Value(b"2".to_vec()))]);
}

// =============================================================================
// Replay Tests
// =============================================================================

#[test]
fn test_recover_missing_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let result = WalRecovery::recover(&wal_path, |_, _| panic!("nothing to replay")).unwrap();

    assert_eq!(result.records_recovered, 0);
    assert!(!result.was_truncated);
    assert!(!wal_path.exists());
}

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    fs::File::create(&wal_path).unwrap();

    let result = WalRecovery::recover(&wal_path, |_, _| {}).unwrap();

    assert_eq!(result.records_recovered, 0);
    assert_eq!(result.valid_bytes, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_replay_preserves_order() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 100);

    let entries = collect(&wal_path);

    assert_eq!(entries.len(), 100);
    for (i, (key, entry)) in entries.iter().enumerate() {
        assert_eq!(key, format!("key{}", i).as_bytes());
        assert_eq!(entry, &MemTableEntry::Value(format!("value{}", i).into_bytes()));
    }
}

#[test]
fn test_replay_keeps_duplicate_keys_in_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"k", &MemTableEntry::Value(b"1".to_vec())).unwrap();
    writer.append(b"k", &MemTableEntry::Tombstone).unwrap();
    writer.append(b"k", &MemTableEntry::Value(b"3".to_vec())).unwrap();

    let entries: Vec<MemTableEntry> = collect(&wal_path).into_iter().map(|(_, e)| e).collect();

    assert_eq!(
        entries,
        vec![
            MemTableEntry::Value(b"1".to_vec()),
            MemTableEntry::Tombstone,
            MemTableEntry::Value(b"3".to_vec()),
        ]
    );
}

#[test]
fn test_reader_is_lazy_iterator() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 5);

    let mut reader = WalReader::open(&wal_path).unwrap();
    let first = reader.next().unwrap().unwrap();

    assert_eq!(first.0, b"key0".to_vec());
    assert_eq!(reader.count(), 4);
}

// =============================================================================
// Torn Tail Tests
// =============================================================================

#[test]
fn test_recover_stops_at_torn_record_and_truncates() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 3);
    let good_len = fs::metadata(&wal_path).unwrap().len();

    // Half a record: a key length prefix and part of the key
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&10u32.to_ne_bytes()).unwrap();
        file.write_all(b"part").unwrap();
    }

    let verified = WalRecovery::verify(&wal_path).unwrap();
    assert!(verified.was_truncated);
    assert_eq!(verified.records_recovered, 3);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), good_len + 8);

    let mut count = 0;
    let result = WalRecovery::recover(&wal_path, |_, _| count += 1).unwrap();

    assert_eq!(count, 3);
    assert!(result.was_truncated);
    assert_eq!(result.valid_bytes, good_len);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), good_len);
}

#[test]
fn test_appends_after_torn_tail_are_replayed() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_via_writer(&wal_path, 2);
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[1, 2]).unwrap();
    }

    WalRecovery::recover(&wal_path, |_, _| {}).unwrap();
    {
        let mut writer = WalWriter::open(&wal_path).unwrap();
        writer
            .append(b"after", &MemTableEntry::Value(b"crash".to_vec()))
            .unwrap();
    }

    let entries = collect(&wal_path);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].0, b"after".to_vec());
}

#[test]
fn test_torn_value_is_not_replayed() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut file = fs::File::create(&wal_path).unwrap();
        file.write_all(&3u32.to_ne_bytes()).unwrap();
        file.write_all(b"key").unwrap();
        file.write_all(&100u32.to_ne_bytes()).unwrap();
        file.write_all(b"only a few bytes").unwrap();
    }

    let entries = collect(&wal_path);

    assert!(entries.is_empty());
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
}
