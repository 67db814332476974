use std::collections::BTreeMap;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::error::Error;
use crate::store::{CatalogStore, MetaTable};

fn seed_catalog(path: &PathBuf, rows: &[(i64, i64)]) {
    let store = CatalogStore::create(path).unwrap();
    store
        .execute("create table headers (indexnumber integer, cdp integer, primary key (indexnumber))")
        .unwrap();
    for (index, cdp) in rows {
        store
            .execute(&format!("insert into headers values ({index}, {cdp})"))
            .unwrap();
    }
}

#[test]
fn create_writes_a_file_that_open_single_can_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    seed_catalog(&path, &[(0, 100), (1, 200)]);

    let store = CatalogStore::open_single(&path).unwrap();
    let mut stmt = store.prepare("select count(*) from headers").unwrap();
    let count: i64 = stmt.query_row([], |r| r.get(0)).unwrap();
    assert_eq!(count, 2);
}

#[test]
fn open_refuses_missing_files() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.db");
    let err = CatalogStore::open_single(&missing).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    // a failed open must not conjure the file into existence
    assert!(!missing.exists());
}

#[test]
fn open_refuses_an_empty_path_list() {
    assert!(matches!(
        CatalogStore::open(&[]),
        Err(Error::MalformedSelection { .. })
    ));
}

#[test]
fn union_view_over_one_file_is_unqualified() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one.db");
    seed_catalog(&path, &[(0, 7)]);
    let store = CatalogStore::open_single(&path).unwrap();

    let sql = store.union_view("headers", &["cdp".to_string()], Some("cdp > 5"), "fileid");
    assert_eq!(
        sql,
        "select cdp, indexnumber, 0 as fileid from headers where cdp > 5"
    );

    let no_columns = store.union_view("headers", &[], None, "fileid");
    assert_eq!(no_columns, "select indexnumber, 0 as fileid from headers");
}

#[test]
fn union_view_spans_attached_files_and_tags_rows() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.db");
    let b = dir.path().join("b.db");
    seed_catalog(&a, &[(0, 10), (1, 11)]);
    seed_catalog(&b, &[(0, 20)]);

    let store = CatalogStore::open(&[a, b]).unwrap();
    assert_eq!(store.file_count(), 2);

    let union = store.union_view("headers", &["cdp".to_string()], None, "fileid");
    assert!(union.contains("from db0.headers"));
    assert!(union.contains("from db1.headers"));
    assert!(union.contains("1 as fileid"));

    let sql = format!("select * from ({union}) order by cdp");
    let mut stmt = store.prepare(&sql).unwrap();
    let rows: Vec<(i64, i64, i64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rows, vec![(10, 0, 0), (11, 1, 0), (20, 0, 1)]);
}

#[test]
fn failed_statements_carry_their_sql() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.db");
    seed_catalog(&path, &[]);
    let store = CatalogStore::open_single(&path).unwrap();

    match store.execute("select definitely from nowhere") {
        Err(Error::QueryFailed { sql, .. }) => assert!(sql.contains("nowhere")),
        other => panic!("expected QueryFailed, got {other:?}"),
    }
}

#[test]
fn meta_round_trips_through_a_catalog_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta.db");
    let store = CatalogStore::create(&path).unwrap();

    let mut entries = BTreeMap::new();
    entries.insert("datapath".to_string(), "data.su".to_string());
    entries.insert("ns".to_string(), "750".to_string());
    entries.insert("segytape".to_string(), "false".to_string());
    entries.insert("comment".to_string(), String::new());

    let meta = MetaTable::default();
    meta.create(&store, "meta", &entries).unwrap();
    assert_eq!(meta.read(&store, "meta").unwrap(), entries);

    // recreate replaces, not appends
    entries.insert("ns".to_string(), "1000".to_string());
    meta.create(&store, "meta", &entries).unwrap();
    assert_eq!(meta.read(&store, "meta").unwrap(), entries);
}

#[test]
fn meta_read_tolerates_numeric_storage_classes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    let store = CatalogStore::create(&path).unwrap();
    // hand-edited catalogs end up with integer affinity values
    store
        .execute("create table meta (key text, value, primary key (key))")
        .unwrap();
    store.execute("insert into meta values ('ns', 512)").unwrap();

    let entries = MetaTable::default().read(&store, "meta").unwrap();
    assert_eq!(entries.get("ns").map(String::as_str), Some("512"));
}

#[test]
fn meta_read_without_the_table_is_a_query_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.db");
    let store = CatalogStore::create(&path).unwrap();
    assert!(matches!(
        MetaTable::default().read(&store, "meta"),
        Err(Error::QueryFailed { .. })
    ));
}
