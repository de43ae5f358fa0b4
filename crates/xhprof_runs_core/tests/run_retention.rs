use rusqlite::Connection;
use serde_json::json;
use std::collections::HashSet;
use std::thread;
use xhprof_runs_core::db::{open_db, open_db_in_memory};
use xhprof_runs_core::{RepoError, RunId, RunRepository, SqliteRunRepository};

fn backdate(conn: &Connection, id: RunId, created_at: i64) {
    conn.execute(
        "UPDATE xhprof_runs SET created_at = ?1 WHERE run_id = ?2;",
        [created_at, id],
    )
    .unwrap();
}

#[test]
fn garbage_collect_removes_strictly_older_runs() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRunRepository::try_new(&conn).unwrap();

    let old = repo.save_run(&json!({"a": 1}), "old", None).unwrap();
    let boundary = repo.save_run(&json!({"b": 2}), "boundary", None).unwrap();
    let fresh = repo.save_run(&json!({"c": 3}), "fresh", None).unwrap();
    backdate(&conn, old, 100);
    backdate(&conn, boundary, 200);
    backdate(&conn, fresh, 300);

    repo.garbage_collect(200).unwrap();

    assert!(matches!(repo.get_run(old).unwrap_err(), RepoError::NotFound(id) if id == old));
    assert_eq!(repo.get_run(boundary).unwrap().label, "boundary");
    assert_eq!(repo.get_run(fresh).unwrap().label, "fresh");

    let page = repo.list_runs(1, 100).unwrap();
    assert_eq!(page.total_runs, 2);
    assert!(page.runs.iter().all(|run| run.created_at >= 200));
}

#[test]
fn garbage_collect_on_nothing_old_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRunRepository::try_new(&conn).unwrap();

    repo.save_run(&json!({}), "recent", None).unwrap();
    repo.garbage_collect(0).unwrap();
    assert_eq!(repo.list_runs(1, 10).unwrap().total_runs, 1);
}

#[test]
fn ids_are_not_reused_after_garbage_collect() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRunRepository::try_new(&conn).unwrap();

    let first = repo.save_run(&json!({}), "a", None).unwrap();
    let second = repo.save_run(&json!({}), "b", None).unwrap();
    repo.garbage_collect(i64::MAX).unwrap();

    let third = repo.save_run(&json!({}), "c", None).unwrap();
    assert!(third > second);
    assert!(matches!(repo.get_run(first).unwrap_err(), RepoError::NotFound(_)));
}

#[test]
fn concurrent_writers_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.db");
    drop(open_db(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = SqliteRunRepository::try_new(&conn).unwrap();
                (0..25)
                    .map(|index| {
                        repo.save_run(
                            &json!({"writer": writer, "index": index}),
                            &format!("writer-{writer}"),
                            None,
                        )
                        .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {id} assigned twice");
        }
    }
    assert_eq!(ids.len(), 100);

    let conn = open_db(&path).unwrap();
    let repo = SqliteRunRepository::try_new(&conn).unwrap();
    assert_eq!(repo.list_runs(1, 10).unwrap().total_runs, 100);
}
