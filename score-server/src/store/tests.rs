use super::*;
use tempfile::TempDir;

fn test_store() -> (ScoreStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scores.db");
    let store = ScoreStore::open(path.to_str().unwrap()).unwrap();
    (store, dir)
}

fn names(entries: &[LeaderboardEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.name.as_str()).collect()
}

#[test]
fn empty_table_reads_empty() {
    let (store, _dir) = test_store();
    assert!(store.top(10).unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn insert_then_read_ranks_by_score() {
    let (store, _dir) = test_store();
    store.insert("Low", 5).unwrap();
    store.insert("Ann", 42).unwrap();
    store.insert("Mid", 20).unwrap();

    let top = store.top(10).unwrap();
    assert_eq!(names(&top), vec!["Ann", "Mid", "Low"]);
    assert_eq!(top[0].score, 42);
}

#[test]
fn top_respects_limit() {
    let (store, _dir) = test_store();
    for score in 0..15 {
        store.insert("P", score).unwrap();
    }

    let top = store.top(10).unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].score, 14);
    assert_eq!(top[9].score, 5);
    assert_eq!(store.count().unwrap(), 15);
}

#[test]
fn ties_keep_insertion_order() {
    let (store, _dir) = test_store();
    store.insert("First", 10).unwrap();
    store.insert("Second", 10).unwrap();
    store.insert("Third", 10).unwrap();

    assert_eq!(names(&store.top(10).unwrap()), vec!["First", "Second", "Third"]);
}

#[test]
fn submit_alone_stores_and_ranks() {
    let (store, _dir) = test_store();
    store.submit("First", 10, 10).unwrap();
    store.submit("Low", 3, 10).unwrap();
    let top = store.submit("Second", 10, 2).unwrap();

    assert_eq!(names(&top), vec!["First", "Second"]);
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn insert_ids_increase() {
    let (store, _dir) = test_store();
    let first = store.insert("A", 1).unwrap();
    let second = store.insert("B", 1).unwrap();
    assert!(second > first);
}

#[test]
fn repeated_reads_are_identical() {
    let (store, _dir) = test_store();
    for (name, score) in [("A", 3), ("B", 3), ("C", 9), ("D", 1)] {
        store.insert(name, score).unwrap();
    }

    let first = store.top(10).unwrap();
    for _ in 0..5 {
        assert_eq!(store.top(10).unwrap(), first);
    }
}

#[test]
fn dates_use_day_month_year() {
    let (store, _dir) = test_store();
    store.insert("Ann", 1).unwrap();

    let date = store.top(1).unwrap().remove(0).date;
    assert_eq!(date.len(), 10, "unexpected date: {date}");
    assert_eq!(&date[2..3], "/");
    assert_eq!(&date[5..6], "/");
    assert!(date[6..].parse::<u32>().unwrap() >= 2020);
}

#[test]
fn submit_returns_refreshed_list() {
    let (store, _dir) = test_store();
    store.insert("Old", 7).unwrap();

    let top = store.submit("New", 8, 10).unwrap();
    assert_eq!(names(&top), vec!["New", "Old"]);
}

#[test]
fn reopening_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("scores.db").display());

    {
        let store = ScoreStore::open(&url).unwrap();
        store.insert("Ann", 42).unwrap();
    }

    let store = ScoreStore::open(&url).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.top(10).unwrap()[0].name, "Ann");
}

#[test]
fn in_memory_url_is_supported() {
    let store = ScoreStore::open("sqlite::memory:").unwrap();
    store.insert("Ann", 1).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn index_is_created() {
    let (store, _dir) = test_store();
    let conn = store.conn.lock().unwrap();
    let found: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_score'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(found, 1);
}
