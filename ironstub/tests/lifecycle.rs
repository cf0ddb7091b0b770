//! End-to-end message lifecycle through the client API

use ironstub::prelude::*;
use ironstub::ErrorCode;
use ironstub_test::{fixtures, init_tracing, sleep_past, unique_queue_name};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT_MS: u64 = 20;

fn client() -> Client {
    init_tracing();
    create_client(ClientOptions {
        release_timeout_ms: TIMEOUT_MS,
        ..ClientOptions::default()
    })
}

fn timeout() -> Duration {
    Duration::from_millis(TIMEOUT_MS)
}

#[tokio::test(start_paused = true)]
async fn test_work_loop() {
    let client = client();
    let queue = client.queue(&unique_queue_name("work")).unwrap();
    queue
        .post(vec![fixtures::text(), fixtures::body(), fixtures::nested()])
        .unwrap();

    let mut processed = Vec::new();
    while let Some(message) = queue.get(GetOptions::default()).into_one() {
        processed.push(message.body.clone());
        queue.delete(&message.id).unwrap();
    }

    assert_eq!(
        processed,
        vec!["someMessage", "someMessage", r#"{"some":"message"}"#]
    );

    sleep_past(timeout()).await;
    assert!(queue.dump().available.is_empty());
    assert!(queue.dump().outstanding.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_crashed_worker_message_is_redelivered() {
    let client = client();
    let name = unique_queue_name("jobs");
    client.queue(&name).unwrap().post("job").unwrap();

    // A worker leases the message and never acknowledges it
    let abandoned = client
        .queue(&name)
        .unwrap()
        .get(GetOptions::default())
        .into_one()
        .unwrap();

    sleep_past(timeout()).await;

    // Another holder of the same queue name picks it up
    let retried = client
        .queue(&name)
        .unwrap()
        .get(GetOptions::default())
        .into_one()
        .unwrap();
    assert_eq!(retried.id, abandoned.id);

    // The first worker's lease is gone, but deleting still succeeds
    client.queue(&name).unwrap().delete(&abandoned.id).unwrap();
    assert_eq!(
        client.queue(&name).unwrap().delete(&retried.id).unwrap_err().code(),
        ErrorCode::MessageNotFound
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_lease_and_partial_ack() {
    let client = client();
    let queue = client.queue("batch").unwrap();
    queue.set_messages(json!(["a", "b", "c", "d"])).unwrap();

    let leased = queue.get(GetOptions::n(3)).into_vec();
    assert_eq!(leased.len(), 3);

    queue.delete(&leased[0].id).unwrap();
    queue.release(&leased[1].id, &ReleaseOptions::default()).unwrap();

    sleep_past(timeout()).await;

    let bodies: Vec<String> = queue.peek(10).into_iter().map(|m| m.body).collect();
    assert_eq!(bodies, vec!["d", "b", "c"]);

    let info = queue.info();
    assert_eq!(info.size, 3);
    assert_eq!(info.reserved, 0);
    assert_eq!(info.total_messages, 4);
}

#[tokio::test(start_paused = true)]
async fn test_clear_between_cases() {
    let client = client();
    let queue = client.queue("shared").unwrap();
    queue.post(vec!["one", "two"]).unwrap();
    let _held = queue.get(GetOptions::default());

    queue.clear();
    sleep_past(timeout()).await;

    assert!(queue.get(GetOptions::n(10)).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers_never_share_a_lease() {
    let client = create_client(ClientOptions {
        release_timeout_ms: 60_000,
        ..ClientOptions::default()
    });
    let queue = client.queue("contended").unwrap();
    let bodies: Vec<String> = (0..200).map(|i| format!("job-{i}")).collect();
    queue.post(bodies).unwrap();

    let consumers: Vec<_> = (0..8)
        .map(|_| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                loop {
                    let batch = queue.get(GetOptions::n(3)).into_vec();
                    if batch.is_empty() {
                        break;
                    }
                    seen.extend(batch.into_iter().map(|m| m.id));
                    tokio::task::yield_now().await;
                }
                seen
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for consumer in consumers {
        for id in consumer.await.unwrap() {
            assert!(ids.insert(id), "message leased twice");
        }
    }

    assert_eq!(ids.len(), 200);
    assert_eq!(queue.outstanding_len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_auto_release_with_real_time() {
    let client = client();
    let queue = client.queue("realtime").unwrap();
    queue.post("someMessage1").unwrap();

    let first = queue.get(GetOptions::n(1)).into_one().unwrap();
    assert_eq!(queue.get(GetOptions::n(1)), Leased::One(None));

    // Timers fire no earlier than the timeout; allow generous slack
    let mut again = None;
    for _ in 0..50 {
        tokio::time::sleep(timeout()).await;
        again = queue.get(GetOptions::n(1)).into_one();
        if again.is_some() {
            break;
        }
    }
    assert_eq!(again.map(|m| m.id), Some(first.id));
}
