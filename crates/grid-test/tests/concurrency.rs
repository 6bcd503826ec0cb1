//! Concurrent callers sharing one data directory.
//!
//! Every thread works through its own backend clone, so each call opens its
//! own store handle.

use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;

use grid_server::{Backend, Session};
use grid_store::Instruction;
use grid_test::utils::object;
use grid_test::TestBackend;

const THREADS: usize = 8;

/// Runs `work` on `THREADS` threads released together, returning each result.
fn race<T, F>(backend: &Backend, work: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(Backend, usize) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let work = Arc::new(work);
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let backend = backend.clone();
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            thread::spawn(move || {
                barrier.wait();
                work(backend, i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_concurrent_open_or_create() {
    let fixture = TestBackend::new();

    for round in 0..10 {
        let name = format!("ws{round}");
        let target = name.clone();
        let results = race(&fixture, move |backend, _| {
            backend.open_or_create_workspace(&target)?;
            backend.get_view(&target, "main")
        });

        for result in results {
            let main = result.unwrap();
            assert!(main.item("title").is_some());
        }
        assert_eq!(fixture.get_views(&name).unwrap().count(), 1);
    }

    let listed = fixture.list_workspaces().unwrap().workspace_names;
    assert_eq!(listed.len(), 10);
    assert_eq!(std::fs::read_dir(fixture.path()).unwrap().count(), 10);
}

#[test]
fn test_concurrent_sessions_share_workspace() {
    let fixture = TestBackend::new();
    let results = race(&fixture, |backend, _| {
        Session::new(backend, "shared").and_then(|session| session.describe())
    });
    for result in results {
        assert_eq!(result.unwrap().name, "shared");
    }
    assert_eq!(fixture.list_workspaces().unwrap().workspace_names, vec!["shared"]);
}

#[test]
fn test_concurrent_create_has_one_winner() {
    let fixture = TestBackend::new();
    let results = race(&fixture, |backend, _| backend.create_workspace("solo"));

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, grid_common::GridError::AlreadyExists { .. })));
    assert!(fixture.get_workspace("solo").unwrap().document_names.is_empty());
}

#[test]
fn test_concurrent_row_writers() {
    const PER_THREAD: usize = 25;
    let fixture = TestBackend::with_people();

    let results = race(&fixture, |backend, thread| {
        (0..PER_THREAD).try_for_each(|n| {
            let id = (thread * PER_THREAD + n) as i64;
            let mut insert = Instruction::insert(object(json!({"id": id, "label": format!("t{thread}")})));
            backend.edit_row("ws", "people", &mut insert)?;
            assert_eq!(insert.status, Some(true));
            Ok::<_, grid_common::GridError>(())
        })
    });
    for result in results {
        result.unwrap();
    }

    let total = THREADS * PER_THREAD;
    let feed = fixture.get_rows("ws", "people", 0, total as i64 + 10).unwrap();
    assert_eq!(feed.count(), total);
}
