//! Tests for tokio spawner utilities

use render_gate::runtime::{Spawn, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawner_executes_future() {
    let spawner = TokioSpawner::current();

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(42).unwrap();
    });

    assert_eq!(rx.await.expect("oneshot result"), 42);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawner_from_explicit_handle() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    for i in 0..4 {
        let tx = tx.clone();
        spawner.spawn(async move {
            tx.send(i).await.unwrap();
        });
    }
    drop(tx);

    let mut received = Vec::new();
    while let Some(value) = rx.recv().await {
        received.push(value);
    }
    received.sort_unstable();
    assert_eq!(received, vec![0, 1, 2, 3]);
}
