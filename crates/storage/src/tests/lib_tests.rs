use super::*;

fn temp_store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("nested").join("cards.json")
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(temp_store_path(&dir)).expect("open");
    assert_eq!(store.get("coffeePunchesV1").expect("get"), None);
    assert!(store.keys().expect("keys").is_empty());
}

#[test]
fn creates_parent_directory_on_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = temp_store_path(&dir);
    FileStore::open(&path).expect("open");
    assert!(dir.path().join("nested").is_dir());
}

#[test]
fn set_then_get_round_trips_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::open(temp_store_path(&dir)).expect("open");
    store.set("coffeePunchesV1", "[true,false]").expect("set");
    assert_eq!(
        store.get("coffeePunchesV1").expect("get").as_deref(),
        Some("[true,false]")
    );
}

#[test]
fn values_survive_reopen_and_keys_stay_independent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = temp_store_path(&dir);
    {
        let mut store = FileStore::open(&path).expect("open");
        store.set("espresso", "[true]").expect("set espresso");
        store.set("tea", "[false]").expect("set tea");
        store.set("espresso", "[false]").expect("overwrite espresso");
    }

    let store = FileStore::open(&path).expect("reopen");
    assert_eq!(store.get("espresso").expect("get").as_deref(), Some("[false]"));
    assert_eq!(store.get("tea").expect("get").as_deref(), Some("[false]"));
    assert_eq!(store.keys().expect("keys"), vec!["espresso", "tea"]);
}

#[test]
fn remove_reports_presence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::open(temp_store_path(&dir)).expect("open");
    store.set("k", "v").expect("set");
    assert!(store.remove("k").expect("remove"));
    assert!(!store.remove("k").expect("remove again"));
    assert_eq!(store.get("k").expect("get"), None);
}

#[test]
fn corrupt_document_opens_empty_and_next_set_replaces_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cards.json");
    fs::write(&path, "{ truncated").expect("write");

    let mut store = FileStore::open(&path).expect("corrupt file still opens");
    assert_eq!(store.path(), path.as_path());
    assert_eq!(store.get("coffeePunchesV1").expect("get"), None);
    assert!(store.keys().expect("keys").is_empty());

    store.set("coffeePunchesV1", "[true]").expect("set over corrupt file");
    let reopened = FileStore::open(&path).expect("reopen");
    assert_eq!(
        reopened.get("coffeePunchesV1").expect("get").as_deref(),
        Some("[true]")
    );
}

#[test]
fn document_corrupted_after_open_does_not_block_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cards.json");
    let mut store = FileStore::open(&path).expect("open");
    store.set("tea", "[false]").expect("set");

    fs::write(&path, "garbage").expect("clobber");
    store.set("tea", "[true]").expect("set after corruption");
    assert_eq!(store.get("tea").expect("get").as_deref(), Some("[true]"));
}

#[test]
fn unreadable_store_path_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = FileStore::open(dir.path()).expect_err("directory is not a store file");
    assert!(err.to_string().contains("failed to read store file"));
}

#[test]
fn blank_document_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cards.json");
    fs::write(&path, "  \n").expect("write");
    let store = FileStore::open(&path).expect("open");
    assert!(store.keys().expect("keys").is_empty());
}

#[test]
fn memory_store_counts_writes_and_can_refuse_them() {
    let mut store = MemoryStore::new();
    store.set("k", "1").expect("set");
    store.set("k", "2").expect("set");
    assert_eq!(store.writes(), 2);

    store.set_fail_writes(true);
    assert!(store.set("k", "3").is_err());
    assert_eq!(store.writes(), 2);
    assert_eq!(store.get("k").expect("get").as_deref(), Some("2"));
}

#[test]
fn memory_store_seeded_value_is_not_a_write() {
    let store = MemoryStore::with_value("k", "[]");
    assert_eq!(store.writes(), 0);
    assert_eq!(store.keys().expect("keys"), vec!["k"]);
}

#[test]
fn boxed_store_delegates() {
    let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
    store.set("k", "v").expect("set");
    assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
}
